//! Remote planner protocol
//!
//! command + screen context -> PlannerClient -> response body -> parser -> ActionPlan

pub mod action;
pub mod client;
pub mod parser;

pub use action::{Action, ActionPlan};
pub use client::{Planner, PlannerClient, PlannerRequest};
pub use parser::parse_plan;
