//! Decode planner response bodies into action plans
//!
//! The envelope is strict: the body must be a JSON object with a `response`
//! array, otherwise the whole exchange is a protocol error. Elements are
//! lenient: each one decodes independently, so one bad element becomes an
//! `Unrecognized` or `Malformed` action in its position instead of
//! invalidating the plan.

use serde_json::Value;

use crate::core::error::{PilotError, Result};
use crate::planner::action::{Action, ActionPlan};

/// Key under which the planner returns its plan
pub const RESPONSE_KEY: &str = "response";

/// Decode a raw response body
pub fn parse_plan(body: &str) -> Result<ActionPlan> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PilotError::Protocol(format!("Response is not JSON: {}", e)))?;
    plan_from_value(value)
}

/// Decode an already-parsed response envelope
pub fn plan_from_value(value: Value) -> Result<ActionPlan> {
    let Value::Object(mut envelope) = value else {
        return Err(PilotError::Protocol("Response is not a JSON object".into()));
    };

    match envelope.remove(RESPONSE_KEY) {
        Some(Value::Array(elements)) => Ok(elements.into_iter().map(decode_action).collect()),
        Some(other) => Err(PilotError::Protocol(format!(
            "`{}` is not a list (got {})",
            RESPONSE_KEY,
            json_type_name(&other)
        ))),
        None => Err(PilotError::Protocol(format!(
            "Missing `{}` key",
            RESPONSE_KEY
        ))),
    }
}

/// Decode one plan element; never fails
pub fn decode_action(element: Value) -> Action {
    let kind = element
        .get("action")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();

    if !Action::is_known_kind(&kind) {
        return Action::Unrecognized { kind };
    }

    match serde_json::from_value::<Action>(element) {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!("Malformed {} action from planner: {}", kind, e);
            Action::Malformed {
                kind,
                reason: e.to_string(),
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
