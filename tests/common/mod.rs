//! Shared test doubles for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;

use desktop_pilot::command::AppResolver;
use desktop_pilot::core::config::PacingConfig;
use desktop_pilot::core::error::{PilotError, Result};
use desktop_pilot::core::types::ScrollDirection;
use desktop_pilot::effectors::{
    InputInjector, LaunchSpec, ProcessLauncher, SpeechOutput, UrlOpener,
};
use desktop_pilot::planner::{ActionPlan, Planner};
use desktop_pilot::runtime::RuntimeContext;
use desktop_pilot::sensors::{ScreenContextProvider, StaticContext, VoiceInput};

pub const DESKTOP: &str = "Active Window: 'Desktop'";

/// Records everything spoken
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, text: &str) -> usize {
        self.lines().iter().filter(|l| *l == text).count()
    }
}

impl SpeechOutput for Recorder {
    fn speak(&self, text: &str) {
        self.0.lock().unwrap().push(text.to_string());
    }
}

/// Replays a fixed list of listen results, then hears nothing
///
/// When the script runs out it optionally flips a stop signal.
pub struct ScriptedVoice {
    script: Mutex<VecDeque<Result<Option<String>>>>,
    stop_when_empty: Option<watch::Sender<bool>>,
}

impl ScriptedVoice {
    pub fn new(script: Vec<Result<Option<String>>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            stop_when_empty: None,
        }
    }

    /// Convenience for scripts of plain utterances
    pub fn saying(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| Ok(Some(l.to_string()))).collect())
    }

    pub fn stop_when_empty(mut self, stop: watch::Sender<bool>) -> Self {
        self.stop_when_empty = Some(stop);
        self
    }
}

impl VoiceInput for ScriptedVoice {
    fn listen(&self) -> Result<Option<String>> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => {
                if let Some(stop) = &self.stop_when_empty {
                    let _ = stop.send(true);
                }
                Ok(None)
            }
        }
    }
}

/// Screen sensor that always fails
pub struct BrokenScreen;

impl ScreenContextProvider for BrokenScreen {
    fn current_context(&self) -> Result<String> {
        Err(PilotError::Collaborator("no display".into()))
    }
}

/// Every desktop effect fails
#[derive(Clone, Default)]
pub struct FailingEffects;

impl InputInjector for FailingEffects {
    fn type_text(&self, _text: &str) -> Result<()> {
        Err(PilotError::Collaborator("keyboard unavailable".into()))
    }

    fn click(&self) -> Result<()> {
        Err(PilotError::Collaborator("pointer unavailable".into()))
    }

    fn scroll(&self, _direction: ScrollDirection) -> Result<()> {
        Err(PilotError::Collaborator("pointer unavailable".into()))
    }
}

impl ProcessLauncher for FailingEffects {
    fn launch(&self, spec: &LaunchSpec) -> Result<u32> {
        Err(PilotError::Collaborator(format!("{} not found on PATH", spec.program)))
    }
}

impl UrlOpener for FailingEffects {
    fn open(&self, _url: &str) -> Result<()> {
        Err(PilotError::Collaborator("no default browser".into()))
    }
}

/// Build a runtime context with zero pacing
pub fn runtime_context<V, S, E>(voice: V, screen: S, speech: Recorder, effects: E) -> RuntimeContext
where
    V: VoiceInput + 'static,
    S: ScreenContextProvider + 'static,
    E: InputInjector + ProcessLauncher + UrlOpener + Clone + 'static,
{
    RuntimeContext {
        speech: Box::new(speech),
        voice: Box::new(voice),
        screen: Box::new(screen),
        input: Box::new(effects.clone()),
        launcher: Box::new(effects.clone()),
        urls: Box::new(effects),
        apps: AppResolver::default(),
        pacing: PacingConfig::immediate(),
    }
}

pub fn desktop() -> StaticContext {
    StaticContext(DESKTOP.into())
}

/// A planner request as seen by a test planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub user_id: String,
    pub command: String,
    pub screen_context: String,
}

/// Replays scripted planner results and records requests
#[derive(Default)]
pub struct ScriptedPlanner {
    responses: Mutex<VecDeque<Result<ActionPlan>>>,
    seen: Mutex<Vec<SeenRequest>>,
    calls: AtomicUsize,
}

impl ScriptedPlanner {
    pub fn new(responses: Vec<Result<ActionPlan>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn request_plan(
        &self,
        user_id: &str,
        command: &str,
        screen_context: &str,
    ) -> Result<ActionPlan> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(SeenRequest {
            user_id: user_id.into(),
            command: command.into(),
            screen_context: screen_context.into(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Minimal HTTP/1.1 server answering every request with one canned response
pub struct StubPlanner {
    pub base_url: String,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl StubPlanner {
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let response = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let captured = bodies.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request_body = read_request_body(&mut socket).await;
                captured.lock().unwrap().push(request_body);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base_url, bodies }
    }

    /// Request bodies received so far
    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

async fn read_request_body(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf[header_end..]).to_string()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A base URL nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
