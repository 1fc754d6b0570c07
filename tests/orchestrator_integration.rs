//! Orchestrator integration tests
//!
//! Drive whole wake-phrase cycles with scripted voice input and planners.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    desktop, runtime_context, unreachable_url, BrokenScreen, FailingEffects, Recorder,
    ScriptedPlanner, ScriptedVoice, StubPlanner, DESKTOP,
};
use desktop_pilot::core::config::PilotConfig;
use desktop_pilot::core::error::PilotError;
use desktop_pilot::core::types::UNKNOWN_SCREEN_CONTEXT;
use desktop_pilot::effectors::DryRunEffects;
use desktop_pilot::planner::{Action, PlannerClient};
use desktop_pilot::runtime::orchestrator::{
    FAREWELL, NOT_UNDERSTOOD, NO_COMMAND, PLANNER_UNREACHABLE, PLAN_INVALID, UNEXPECTED, WAKE_ACK,
};
use desktop_pilot::runtime::{CycleReport, Orchestrator};
use tokio::sync::watch;

fn config() -> PilotConfig {
    let mut config = PilotConfig::default();
    config.user_id = "tester".into();
    config
}

#[tokio::test]
async fn test_full_cycle_sends_command_and_executes_plan() {
    let speech = Recorder::default();
    let effects = DryRunEffects::default();
    let voice = ScriptedVoice::saying(&["Hey Agent", "say hello"]);
    let ctx = runtime_context(voice, desktop(), speech.clone(), effects);
    let planner = Arc::new(ScriptedPlanner::new(vec![Ok(vec![
        Action::speak("hello"),
        Action::Done,
    ])]));
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    let report = orchestrator.tick().await;

    assert!(matches!(report, CycleReport::Executed(ref o) if o.performed() == 2));
    let seen = planner.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].user_id, "tester");
    assert_eq!(seen[0].command, "say hello");
    assert_eq!(seen[0].screen_context, DESKTOP);
    assert_eq!(
        speech.lines(),
        vec![WAKE_ACK.to_string(), "hello".to_string(), "Task completed.".to_string()]
    );
}

#[tokio::test]
async fn test_without_wake_phrase_nothing_happens() {
    let speech = Recorder::default();
    let voice = ScriptedVoice::saying(&["open notepad"]);
    let ctx = runtime_context(voice, desktop(), speech.clone(), DryRunEffects::default());
    let planner = Arc::new(ScriptedPlanner::default());
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    assert!(matches!(orchestrator.tick().await, CycleReport::Idle));
    assert!(matches!(orchestrator.tick().await, CycleReport::Idle));
    assert_eq!(planner.calls(), 0);
    assert!(speech.lines().is_empty());
}

#[tokio::test]
async fn test_wake_without_command_is_announced() {
    let speech = Recorder::default();
    let voice = ScriptedVoice::new(vec![Ok(Some("hey agent".into())), Ok(Some("   ".into()))]);
    let ctx = runtime_context(voice, desktop(), speech.clone(), DryRunEffects::default());
    let planner = Arc::new(ScriptedPlanner::default());
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    assert!(matches!(orchestrator.tick().await, CycleReport::NoCommand));
    assert_eq!(speech.lines(), vec![WAKE_ACK.to_string(), NO_COMMAND.to_string()]);
    assert_eq!(planner.calls(), 0);
}

#[tokio::test]
async fn test_broken_screen_sensor_falls_back_to_sentinel() {
    let voice = ScriptedVoice::saying(&["hey agent", "open notepad"]);
    let ctx = runtime_context(voice, BrokenScreen, Recorder::default(), DryRunEffects::default());
    let planner = Arc::new(ScriptedPlanner::default());
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    assert!(matches!(orchestrator.tick().await, CycleReport::Executed(_)));
    assert_eq!(planner.seen()[0].screen_context, UNKNOWN_SCREEN_CONTEXT);
}

#[tokio::test]
async fn test_unreachable_planner_executes_nothing() {
    let speech = Recorder::default();
    let effects = DryRunEffects::default();
    let voice = ScriptedVoice::saying(&["hey agent", "open notepad"]);
    let ctx = runtime_context(voice, desktop(), speech.clone(), effects.clone());
    let planner = PlannerClient::new(&unreachable_url().await, Duration::from_secs(5)).unwrap();
    let orchestrator = Orchestrator::new(&ctx, planner, &config());

    let report = orchestrator.tick().await;

    assert!(matches!(report, CycleReport::PlanFailed(PilotError::Connectivity(_))));
    assert_eq!(speech.count(PLANNER_UNREACHABLE), 1);
    assert!(effects.log().snapshot().is_empty());
}

#[tokio::test]
async fn test_server_error_is_announced_like_connectivity() {
    let speech = Recorder::default();
    let effects = DryRunEffects::default();
    let stub = StubPlanner::start(503, r#"{"error": "overloaded"}"#).await;
    let voice = ScriptedVoice::saying(&["hey agent", "open notepad"]);
    let ctx = runtime_context(voice, desktop(), speech.clone(), effects.clone());
    let planner = PlannerClient::new(&stub.base_url, Duration::from_secs(5)).unwrap();
    let orchestrator = Orchestrator::new(&ctx, planner, &config());

    let report = orchestrator.tick().await;

    assert!(matches!(report, CycleReport::PlanFailed(PilotError::Server { code: 503 })));
    assert_eq!(speech.count(PLANNER_UNREACHABLE), 1);
    assert!(effects.log().snapshot().is_empty());
}

#[tokio::test]
async fn test_malformed_planner_response_is_announced() {
    let speech = Recorder::default();
    let stub = StubPlanner::start(200, "{}").await;
    let voice = ScriptedVoice::saying(&["hey agent", "open notepad"]);
    let ctx = runtime_context(voice, desktop(), speech.clone(), DryRunEffects::default());
    let planner = PlannerClient::new(&stub.base_url, Duration::from_secs(5)).unwrap();
    let orchestrator = Orchestrator::new(&ctx, planner, &config());

    let report = orchestrator.tick().await;

    assert!(matches!(report, CycleReport::PlanFailed(PilotError::Protocol(_))));
    assert_eq!(speech.count(PLAN_INVALID), 1);
}

#[tokio::test]
async fn test_survives_failures_at_every_stage_for_100_iterations() {
    let speech = Recorder::default();

    // Five cycle shapes, repeated: recognizer failure, unexpected adapter
    // failure, planner connectivity failure, planner protocol failure, and a
    // plan whose every effect fails.
    let mut script = Vec::new();
    let mut responses = Vec::new();
    for _ in 0..20 {
        script.push(Err(PilotError::Recognition("microphone glitch".into())));
        script.push(Err(PilotError::Collaborator("audio device vanished".into())));
        script.push(Ok(Some("hey agent".into())));
        script.push(Ok(Some("check the weather".into())));
        responses.push(Err(PilotError::Connectivity("timed out".into())));
        script.push(Ok(Some("hey agent".into())));
        script.push(Ok(Some("check the weather".into())));
        responses.push(Err(PilotError::Protocol("missing `response` key".into())));
        script.push(Ok(Some("hey agent".into())));
        script.push(Ok(Some("open notepad and type".into())));
        responses.push(Ok(vec![
            Action::OpenApp {
                app_name: Some("notepad".into()),
            },
            Action::TypeText {
                text: Some("hi".into()),
                target_element_selector: None,
            },
            Action::Done,
        ]));
    }

    let ctx = runtime_context(ScriptedVoice::new(script), BrokenScreen, speech.clone(), FailingEffects);
    let planner = Arc::new(ScriptedPlanner::new(responses));
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    let mut executed = 0;
    let mut recovered = 0;
    for _ in 0..100 {
        match orchestrator.tick().await {
            CycleReport::Executed(outcome) => {
                assert_eq!(outcome.reported(), 2);
                executed += 1;
            }
            CycleReport::Recovered(_) => recovered += 1,
            _ => {}
        }
    }

    assert_eq!(planner.calls(), 60);
    assert_eq!(executed, 20);
    assert_eq!(recovered, 20);
    assert_eq!(speech.count(NOT_UNDERSTOOD), 20);
    assert_eq!(speech.count(UNEXPECTED), 20);
    assert_eq!(speech.count(PLANNER_UNREACHABLE), 20);
    assert_eq!(speech.count(PLAN_INVALID), 20);
}

#[tokio::test]
async fn test_stop_signal_ends_loop_with_farewell() {
    let speech = Recorder::default();
    let (stop_tx, stop_rx) = watch::channel(false);
    let voice = ScriptedVoice::saying(&["hey agent", "say hi"]).stop_when_empty(stop_tx);
    let ctx = runtime_context(voice, desktop(), speech.clone(), DryRunEffects::default());
    let planner = Arc::new(ScriptedPlanner::new(vec![Ok(vec![Action::speak("hi")])]));
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    orchestrator.run(stop_rx).await;

    let lines = speech.lines();
    assert!(lines[0].starts_with("Agent Desktop Pilot is ready."));
    assert!(lines[0].contains("hey agent"));
    assert_eq!(speech.count("hi"), 1);
    assert_eq!(lines.last().map(String::as_str), Some(FAREWELL));
    assert_eq!(planner.calls(), 1);
}

#[tokio::test]
async fn test_stop_before_first_iteration() {
    let speech = Recorder::default();
    let (_stop_tx, stop_rx) = watch::channel(true);
    let ctx = runtime_context(ScriptedVoice::saying(&["hey agent"]), desktop(), speech.clone(), DryRunEffects::default());
    let planner = Arc::new(ScriptedPlanner::default());
    let orchestrator = Orchestrator::new(&ctx, planner.clone(), &config());

    orchestrator.run(stop_rx).await;

    assert_eq!(speech.lines().len(), 2);
    assert_eq!(speech.count(FAREWELL), 1);
    assert_eq!(planner.calls(), 0);
}

#[tokio::test]
async fn test_stop_is_observed_with_zero_idle_delay() {
    let speech = Recorder::default();
    let (stop_tx, stop_rx) = watch::channel(false);
    let ctx = runtime_context(ScriptedVoice::saying(&[]), desktop(), speech.clone(), DryRunEffects::default());
    assert!(ctx.pacing.idle().is_zero());
    let planner = Arc::new(ScriptedPlanner::default());
    let orchestrator = Orchestrator::new(&ctx, planner, &config());

    // Same shape as main: the stop comes from another task on this runtime
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = stop_tx.send(true);
    });

    let stopped = tokio::time::timeout(Duration::from_secs(3), orchestrator.run(stop_rx)).await;

    assert!(stopped.is_ok(), "loop never observed the stop signal");
    assert_eq!(speech.count(FAREWELL), 1);
}
