//! Runtime wiring: collaborator handles and the control loop

pub mod context;
pub mod orchestrator;

pub use context::RuntimeContext;
pub use orchestrator::{CycleReport, Orchestrator};
