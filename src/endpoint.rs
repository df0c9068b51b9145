//! Shared plumbing for the OctoAI-style `/predict` endpoints.

use std::time::Duration;

use serde::Serialize;

use crate::error::{truncate_body, PipelineError, Result};

/// One remote inference service reached through `POST {base_url}/predict`.
#[derive(Debug, Clone)]
pub struct PredictEndpoint {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    service: &'static str,
}

impl PredictEndpoint {
    pub fn new(
        service: &'static str,
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            service,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn url(&self) -> String {
        format!("{}/predict", self.base_url)
    }

    /// Posts `body` and returns the parsed JSON reply.
    pub async fn predict<B: Serialize + ?Sized>(&self, body: &B) -> Result<serde_json::Value> {
        let mut request = self
            .client
            .post(self.url())
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(service = self.service, url = %self.url(), "sending predict request");
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(PipelineError::Upstream {
                service: self.service,
                status: status.as_u16(),
                message: truncate_body(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Pulls a string out of `completion.<field>`.
    pub fn completion_str(
        &self,
        reply: &serde_json::Value,
        field: &'static str,
    ) -> Result<String> {
        reply["completion"][field]
            .as_str()
            .map(str::to_string)
            .ok_or(PipelineError::MissingField {
                service: self.service,
                field,
            })
    }
}
