//! Desktop Pilot - voice-driven desktop automation agent

pub mod command;
pub mod core;
pub mod effectors;
pub mod planner;
pub mod runtime;
pub mod sensors;
