//! Plan execution - turns an action plan into sequenced desktop effects
//!
//! A cursor walks the plan from the first action. Each action runs to
//! completion (including its settle delay) before the next begins. A failing
//! action is reported and skipped over; only DONE stops the plan early.

use std::time::Duration;

use crate::core::error::PilotError;
use crate::core::types::ScrollDirection;
use crate::planner::action::{Action, ActionPlan};
use crate::runtime::context::RuntimeContext;

/// Executes plans against the collaborators in a runtime context
pub struct ActionExecutor<'a> {
    ctx: &'a RuntimeContext,
}

/// What happened to one visited action
#[derive(Debug)]
pub enum ActionStatus {
    Performed,
    Reported(PilotError),
    Skipped,
}

#[derive(Debug)]
pub struct ActionRecord {
    pub index: usize,
    pub kind: String,
    pub status: ActionStatus,
}

/// Result of executing a plan
///
/// Only visited actions are recorded; anything after a DONE is absent.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub records: Vec<ActionRecord>,
    /// Index of the DONE that ended the plan
    pub halted_at: Option<usize>,
}

impl ExecutionOutcome {
    pub fn performed(&self) -> usize {
        self.count(|s| matches!(s, ActionStatus::Performed))
    }

    pub fn reported(&self) -> usize {
        self.count(|s| matches!(s, ActionStatus::Reported(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ActionStatus::Skipped))
    }

    fn count(&self, pred: impl Fn(&ActionStatus) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.status)).count()
    }

    fn record(&mut self, index: usize, kind: &str, status: ActionStatus) {
        self.records.push(ActionRecord {
            index,
            kind: kind.to_string(),
            status,
        });
    }
}

/// How the cursor moves after a successful action
enum Step {
    /// Wait this long, then continue
    Settle(Duration),
    Halt,
}

/// Why an action did not complete
enum Failure {
    /// Required data missing or invalid; the prompt tells the user what was needed
    Invalid { prompt: String, error: PilotError },
    /// The side effect itself failed
    Effect(PilotError),
    Unsupported(PilotError),
}

impl From<PilotError> for Failure {
    fn from(e: PilotError) -> Self {
        Failure::Effect(e)
    }
}

impl<'a> ActionExecutor<'a> {
    pub fn new(ctx: &'a RuntimeContext) -> Self {
        Self { ctx }
    }

    /// Execute a plan, consuming it
    pub async fn execute(&self, plan: ActionPlan) -> ExecutionOutcome {
        let mut outcome = ExecutionOutcome::default();

        for (index, action) in plan.into_iter().enumerate() {
            let kind = action.kind().to_string();
            tracing::info!(index, kind = %kind, "Executing action");

            match self.perform(&action) {
                Ok(Step::Halt) => {
                    outcome.record(index, &kind, ActionStatus::Performed);
                    outcome.halted_at = Some(index);
                    break;
                }
                Ok(Step::Settle(delay)) => {
                    outcome.record(index, &kind, ActionStatus::Performed);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(Failure::Invalid { prompt, error }) => {
                    tracing::warn!(index, "Invalid action: {}", error);
                    self.ctx.announce(&prompt);
                    outcome.record(index, &kind, ActionStatus::Reported(error));
                }
                Err(Failure::Effect(error)) => {
                    tracing::error!(index, "Execution error: {}", error);
                    self.ctx.announce(&format!(
                        "An error occurred during action execution: {}. I might need to re-plan.",
                        error
                    ));
                    outcome.record(
                        index,
                        &kind,
                        ActionStatus::Reported(as_execution_error(&kind, error)),
                    );
                }
                Err(Failure::Unsupported(error)) => {
                    tracing::warn!(index, "{}", error);
                    if kind.is_empty() {
                        self.ctx.announce("I don't know how to perform that action.");
                    } else {
                        self.ctx.announce(&format!(
                            "I don't know how to perform the action: {}.",
                            kind
                        ));
                    }
                    outcome.record(index, &kind, ActionStatus::Skipped);
                }
            }
        }

        outcome
    }

    fn perform(&self, action: &Action) -> Result<Step, Failure> {
        let ctx = self.ctx;
        let pacing = &ctx.pacing;

        match action {
            Action::OpenApp { app_name } => {
                let name = require(app_name, "OPEN_APP", "app_name", "I need an app name to open.")?;
                let resolution = ctx.apps.resolve(name);
                ctx.announce(&format!("Opening {}...", name));
                tracing::debug!(spec = %resolution.spec, reason = ?resolution.match_reason, "Resolved app");
                ctx.launcher.launch(&resolution.spec)?;
                Ok(settle(pacing.open_app_ms))
            }

            Action::TypeText {
                text,
                target_element_selector,
            } => {
                // Typed verbatim, so only an empty string counts as missing
                let text = match text.as_deref() {
                    Some(text) if !text.is_empty() => text,
                    _ => return Err(missing("TYPE_TEXT", "text", "I need text to type.")),
                };
                if let Some(selector) = target_element_selector {
                    // Focus is wherever the previous actions left it
                    tracing::debug!(selector = %selector, "Ignoring typing target selector");
                }
                ctx.announce(&format!("Typing '{}'...", text));
                ctx.input.type_text(text)?;
                Ok(settle(pacing.type_text_ms))
            }

            Action::ClickElement {
                target_element_selector,
            } => {
                let selector = require(
                    target_element_selector,
                    "CLICK_ELEMENT",
                    "target_element_selector",
                    "I need a target to click.",
                )?;
                // Selectors are not resolved to coordinates; this clicks at the pointer
                ctx.announce(&format!("Attempting to click '{}'...", selector));
                ctx.input.click()?;
                ctx.announce(&format!("Clicked on {}.", selector));
                Ok(settle(pacing.click_ms))
            }

            Action::GoToUrl { url } => {
                let url = require(url, "GO_TO_URL", "url", "I need a URL to go to.")?;
                ctx.announce(&format!("Going to {}...", url));
                ctx.urls.open(url)?;
                Ok(settle(pacing.go_to_url_ms))
            }

            Action::Scroll { direction } => {
                let direction = direction
                    .as_deref()
                    .and_then(ScrollDirection::parse)
                    .ok_or_else(|| Failure::Invalid {
                        prompt: "I need a scroll direction (up or down).".into(),
                        error: PilotError::execution(
                            "SCROLL",
                            format!("invalid direction {:?}", direction),
                        ),
                    })?;
                ctx.announce(&format!("Scrolling {}...", direction.as_str()));
                ctx.input.scroll(direction)?;
                Ok(settle(pacing.scroll_ms))
            }

            Action::FindFile {
                filename,
                folder_path,
            } => {
                const PROMPT: &str = "I need a file name and folder to search.";
                let filename = require(filename, "FIND_FILE", "filename", PROMPT)?;
                let folder = require(folder_path, "FIND_FILE", "folder_path", PROMPT)?;
                // No filesystem search happens here; the planner owns real lookup
                ctx.announce(&format!("Searching for {} in {}...", filename, folder));
                ctx.announce(&format!("I have located {} in {}.", filename, folder));
                Ok(Step::Settle(Duration::ZERO))
            }

            Action::Speak { text } => {
                let text = require(text, "SPEAK", "text", "I need something to say.")?;
                ctx.announce(text);
                Ok(Step::Settle(Duration::ZERO))
            }

            Action::Confirm { question } => {
                let question = require(question, "CONFIRM", "question", "I need a question to ask.")?;
                // The answer arrives as the next top-level command
                ctx.announce(question);
                tracing::info!("Confirmation requested: {}", question);
                ctx.announce("Please confirm by saying 'yes' or 'no' in your next command.");
                Ok(Step::Settle(Duration::ZERO))
            }

            Action::Done => {
                ctx.announce("Task completed.");
                Ok(Step::Halt)
            }

            Action::Malformed { kind, reason } => Err(Failure::Invalid {
                prompt: format!("I couldn't understand the {} step.", kind),
                error: PilotError::execution(kind.clone(), reason.clone()),
            }),

            Action::Unrecognized { kind } => Err(Failure::Unsupported(PilotError::UnknownAction {
                kind: kind.clone(),
            })),
        }
    }
}

/// A required field must be present and not blank
fn require<'v>(
    field: &'v Option<String>,
    kind: &str,
    name: &str,
    prompt: &str,
) -> Result<&'v str, Failure> {
    match field.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(missing(kind, name, prompt)),
    }
}

fn missing(kind: &str, name: &str, prompt: &str) -> Failure {
    Failure::Invalid {
        prompt: prompt.to_string(),
        error: PilotError::execution(kind, format!("missing `{}`", name)),
    }
}

fn settle(ms: u64) -> Step {
    Step::Settle(Duration::from_millis(ms))
}

fn as_execution_error(kind: &str, error: PilotError) -> PilotError {
    match error {
        PilotError::Execution { .. } => error,
        other => PilotError::execution(kind, other.to_string()),
    }
}
