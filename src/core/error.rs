use thiserror::Error;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Planner unreachable: {0}")]
    Connectivity(String),

    #[error("Planner returned status {code}")]
    Server { code: u16 },

    #[error("Malformed planner response: {0}")]
    Protocol(String),

    #[error("Action {action} failed: {reason}")]
    Execution { action: String, reason: String },

    #[error("Unsupported action kind: {kind:?}")]
    UnknownAction { kind: String },

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl PilotError {
    pub fn execution(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Execution {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// True for failures of the planner exchange itself (as opposed to its content)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::Server { .. })
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;
