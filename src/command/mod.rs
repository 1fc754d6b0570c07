//! Command execution pipeline
//!
//! ActionPlan -> ActionExecutor -> effect handlers (app names via AppResolver)

pub mod executor;
pub mod resolver;

pub use executor::{ActionExecutor, ActionRecord, ActionStatus, ExecutionOutcome};
pub use resolver::{AppResolution, AppResolver, MatchReason};
