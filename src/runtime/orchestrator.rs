//! The always-on control loop
//!
//! One iteration per wake-phrase attempt: listen, plan, execute, report.
//! Every stage returns a typed `Result`; the loop boundary matches on the
//! error kind, tells the user, and carries on. Only the stop signal ends
//! the loop.

use tokio::sync::watch;
use tracing::Instrument;

use crate::command::executor::{ActionExecutor, ExecutionOutcome};
use crate::core::config::PilotConfig;
use crate::core::error::{PilotError, Result};
use crate::core::types::{CycleId, UNKNOWN_SCREEN_CONTEXT};
use crate::planner::client::Planner;
use crate::runtime::context::RuntimeContext;
use crate::sensors::contains_wake_phrase;

pub const FAREWELL: &str = "Shutting down Agent Desktop Pilot. Goodbye!";
pub const WAKE_ACK: &str = "Yes, how can I help you?";
pub const NO_COMMAND: &str = "I didn't hear a command. Please try again.";
pub const NOT_UNDERSTOOD: &str = "Sorry, I could not understand your audio.";
pub const PLANNER_UNREACHABLE: &str = "I'm having trouble connecting to my brain. Please check your internet connection or try again later.";
pub const PLAN_INVALID: &str = "I couldn't get a valid plan from my brain. Please try again.";
pub const UNEXPECTED: &str = "An unexpected error occurred in the main loop. Restarting...";

/// How one iteration ended
#[derive(Debug)]
pub enum CycleReport {
    /// Nothing heard, or no wake phrase
    Idle,
    /// Woken, but no command followed
    NoCommand,
    /// The recognizer failed
    NotUnderstood(PilotError),
    /// The planner could not produce a plan; nothing was executed
    PlanFailed(PilotError),
    Executed(ExecutionOutcome),
    /// Unexpected failure caught at the loop boundary
    Recovered(PilotError),
}

pub struct Orchestrator<'a, P> {
    ctx: &'a RuntimeContext,
    planner: P,
    user_id: String,
    wake_phrase: String,
}

impl<'a, P: Planner> Orchestrator<'a, P> {
    pub fn new(ctx: &'a RuntimeContext, planner: P, config: &PilotConfig) -> Self {
        Self {
            ctx,
            planner,
            user_id: config.user_id.clone(),
            wake_phrase: config.wake_phrase.clone(),
        }
    }

    /// Run until the stop signal flips to `true`
    ///
    /// The signal is checked between iterations only; a plan in flight always
    /// runs to its end.
    pub async fn run(&self, stop: watch::Receiver<bool>) {
        self.ctx.announce(&format!(
            "Agent Desktop Pilot is ready. Say '{}' to begin.",
            self.wake_phrase
        ));

        while !*stop.borrow() {
            let report = self.tick().await;

            let pause = match report {
                CycleReport::Recovered(_) => self.ctx.pacing.backoff(),
                _ => self.ctx.pacing.idle(),
            };
            if pause.is_zero() {
                // Let the stop watcher run even when pacing is disabled
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(pause).await;
            }
        }

        tracing::info!("Stop signal received");
        self.ctx.announce(FAREWELL);
    }

    /// One supervised iteration; never fails
    pub async fn tick(&self) -> CycleReport {
        let cycle = CycleId::new();
        let span = tracing::info_span!("cycle", id = %cycle);

        match self.run_cycle().instrument(span.clone()).await {
            Ok(report) => report,
            Err(error) => span.in_scope(|| self.supervise(error)),
        }
    }

    async fn run_cycle(&self) -> Result<CycleReport> {
        let Some(transcript) = self.listen()? else {
            return Ok(CycleReport::Idle);
        };
        if !contains_wake_phrase(&transcript, &self.wake_phrase) {
            tracing::debug!("No wake phrase in {:?}", transcript);
            return Ok(CycleReport::Idle);
        }

        self.ctx.announce(WAKE_ACK);
        let Some(command) = self.listen()? else {
            self.ctx.announce(NO_COMMAND);
            return Ok(CycleReport::NoCommand);
        };

        let screen_context = self.screen_context();
        tracing::info!(command = %command, context = %screen_context, "Requesting plan");

        let plan = self
            .planner
            .request_plan(&self.user_id, &command, &screen_context)
            .await?;

        let outcome = ActionExecutor::new(self.ctx).execute(plan).await;
        tracing::info!(
            performed = outcome.performed(),
            reported = outcome.reported(),
            skipped = outcome.skipped(),
            halted = outcome.halted_at.is_some(),
            "Plan finished"
        );

        Ok(CycleReport::Executed(outcome))
    }

    fn listen(&self) -> Result<Option<String>> {
        Ok(self
            .ctx
            .voice
            .listen()?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    /// Never fails the cycle; falls back to the unknown-window sentinel
    fn screen_context(&self) -> String {
        match self.ctx.screen.current_context() {
            Ok(context) if !context.trim().is_empty() => context,
            Ok(_) => UNKNOWN_SCREEN_CONTEXT.to_string(),
            Err(e) => {
                tracing::warn!("Error getting screen context: {}", e);
                UNKNOWN_SCREEN_CONTEXT.to_string()
            }
        }
    }

    fn supervise(&self, error: PilotError) -> CycleReport {
        match error {
            PilotError::Recognition(_) => {
                tracing::warn!("{}", error);
                self.ctx.announce(NOT_UNDERSTOOD);
                CycleReport::NotUnderstood(error)
            }
            ref e if e.is_transport() => {
                tracing::error!("Error communicating with planner: {}", error);
                self.ctx.announce(PLANNER_UNREACHABLE);
                CycleReport::PlanFailed(error)
            }
            PilotError::Protocol(_) => {
                tracing::error!("{}", error);
                self.ctx.announce(PLAN_INVALID);
                CycleReport::PlanFailed(error)
            }
            _ => {
                tracing::error!("Main loop error: {}", error);
                self.ctx.announce(UNEXPECTED);
                CycleReport::Recovered(error)
            }
        }
    }
}
