//! HTTP client for the remote planner
//!
//! One request per command: `POST <base_url>/command` with the user's
//! transcript and screen context, answered by a JSON action plan. The client
//! never retries; the user re-triggering the wake phrase is the retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::PilotConfig;
use crate::core::error::{PilotError, Result};
use crate::planner::action::ActionPlan;
use crate::planner::parser::parse_plan;

/// Path appended to the base URL for plan requests
pub const COMMAND_PATH: &str = "/command";

/// Anything that can turn a command into a plan
#[async_trait]
pub trait Planner {
    async fn request_plan(
        &self,
        user_id: &str,
        command: &str,
        screen_context: &str,
    ) -> Result<ActionPlan>;
}

#[async_trait]
impl<T> Planner for Arc<T>
where
    T: Planner + Send + Sync + ?Sized,
{
    async fn request_plan(
        &self,
        user_id: &str,
        command: &str,
        screen_context: &str,
    ) -> Result<ActionPlan> {
        (**self).request_plan(user_id, command, screen_context).await
    }
}

/// Request body sent to the planner
#[derive(Debug, Serialize)]
pub struct PlannerRequest<'a> {
    pub user_id: &'a str,
    pub command: &'a str,
    pub screen_context: &'a str,
}

/// Planner client over HTTP(S)
pub struct PlannerClient {
    client: Client,
    endpoint: String,
}

impl PlannerClient {
    /// Create a client for the given base URL with an explicit request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("desktop-pilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PilotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: command_endpoint(base_url),
        })
    }

    pub fn from_config(config: &PilotConfig) -> Result<Self> {
        Self::new(&config.planner.base_url, config.planner_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Planner for PlannerClient {
    async fn request_plan(
        &self,
        user_id: &str,
        command: &str,
        screen_context: &str,
    ) -> Result<ActionPlan> {
        let request = PlannerRequest {
            user_id,
            command,
            screen_context,
        };

        tracing::debug!(endpoint = %self.endpoint, command, "Requesting plan");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| PilotError::Connectivity(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PilotError::Server {
                code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PilotError::Connectivity(e.to_string()))?;

        let plan = parse_plan(&body)?;
        tracing::debug!("Planner returned {} action(s)", plan.len());
        Ok(plan)
    }
}

fn command_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), COMMAND_PATH)
}
