//! Typed actions returned by the remote planner
//!
//! Every field the planner is required to send is still decoded as an
//! `Option`: a missing field is a per-action validation failure at execution
//! time, never a reason to reject the whole plan.

use serde::Deserialize;

/// One executable step of a plan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Launch an application by spoken name
    OpenApp { app_name: Option<String> },
    /// Type literal text at the current input focus
    TypeText {
        text: Option<String>,
        target_element_selector: Option<String>,
    },
    /// Click an element (the selector is not resolved; see executor)
    ClickElement { target_element_selector: Option<String> },
    /// Open a URL with the default handler
    GoToUrl { url: Option<String> },
    /// Scroll `up` or `down`
    Scroll { direction: Option<String> },
    /// Locate a file (acknowledged only)
    FindFile {
        filename: Option<String>,
        folder_path: Option<String>,
    },
    /// Say something to the user
    Speak { text: Option<String> },
    /// Ask the user to confirm in their next command
    Confirm { question: Option<String> },
    /// End of plan
    Done,
    /// A kind this executor does not implement; carries the raw tag
    #[serde(skip)]
    Unrecognized { kind: String },
    /// A known kind whose fields could not be decoded
    #[serde(skip)]
    Malformed { kind: String, reason: String },
}

impl Action {
    /// Wire tags of every kind the executor implements
    pub const KINDS: [&'static str; 9] = [
        "OPEN_APP",
        "TYPE_TEXT",
        "CLICK_ELEMENT",
        "GO_TO_URL",
        "SCROLL",
        "FIND_FILE",
        "SPEAK",
        "CONFIRM",
        "DONE",
    ];

    /// Wire tag for this action (the raw tag for unrecognized/malformed ones)
    pub fn kind(&self) -> &str {
        match self {
            Action::OpenApp { .. } => "OPEN_APP",
            Action::TypeText { .. } => "TYPE_TEXT",
            Action::ClickElement { .. } => "CLICK_ELEMENT",
            Action::GoToUrl { .. } => "GO_TO_URL",
            Action::Scroll { .. } => "SCROLL",
            Action::FindFile { .. } => "FIND_FILE",
            Action::Speak { .. } => "SPEAK",
            Action::Confirm { .. } => "CONFIRM",
            Action::Done => "DONE",
            Action::Unrecognized { kind } | Action::Malformed { kind, .. } => kind,
        }
    }

    pub fn is_known_kind(kind: &str) -> bool {
        Self::KINDS.contains(&kind)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Action::Done)
    }

    /// Convenience constructor used by callers building plans in code
    pub fn speak(text: impl Into<String>) -> Self {
        Action::Speak {
            text: Some(text.into()),
        }
    }
}

/// Ordered actions for one command; order is execution order
pub type ActionPlan = Vec<Action>;
