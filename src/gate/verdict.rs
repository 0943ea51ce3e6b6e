//! HTTP client for the external bot-verdict service.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::RequestSignals;

/// Classification returned by the verdict service for one request.
/// Consumed within the handling of that request, never persisted.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// The request looks like automated traffic.
    pub is_automated: bool,
    /// The automation is a recognized benign agent (e.g. a search crawler).
    #[serde(default)]
    pub is_known_good_automated: bool,
}

/// Ambient signals forwarded to the verdict service. No form fields are
/// ever included.
#[derive(Debug, Serialize)]
struct VerdictRequest<'a> {
    ip: &'a str,
    user_agent: &'a str,
    accept_language: &'a str,
}

/// Client for the verdict service endpoint.
#[derive(Clone)]
pub struct VerdictClient {
    http: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl VerdictClient {
    pub fn new(http: Client, url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            http,
            url,
            api_key,
            timeout,
        }
    }

    /// Ask the verdict service to classify a request.
    pub async fn classify(&self, signals: &RequestSignals) -> Result<Verdict> {
        let body = VerdictRequest {
            ip: &signals.ip,
            user_agent: &signals.user_agent,
            accept_language: &signals.accept_language,
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("verdict request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("verdict service returned {}", status);
        }

        let verdict = response
            .json::<Verdict>()
            .await
            .context("verdict response decode failed")?;

        Ok(verdict)
    }
}
