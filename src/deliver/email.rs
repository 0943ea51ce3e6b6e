//! Transactional email delivery via the Resend API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::forms::ValidatedContact;

const RESEND_BASE_URL: &str = "https://api.resend.com";

/// Outbound payload for the Resend `/emails` endpoint.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Client for the transactional email service.
///
/// Constructed once at startup; `from_config` returns `None` when any
/// required piece (API key, sender, recipient) is missing, so the
/// handler's "not configured" branch is an explicit `Option`, not a
/// scattered null check.
#[derive(Clone)]
pub struct EmailSender {
    http: Client,
    base_url: String,
    api_key: String,
    from: String,
    to: String,
    timeout: Duration,
}

impl EmailSender {
    pub fn from_config(http: Client, config: &Config) -> Option<Self> {
        Some(Self {
            http,
            base_url: RESEND_BASE_URL.to_string(),
            api_key: config.resend_api_key.clone()?,
            from: config.resend_from_email.clone()?,
            to: config.contact_email.clone()?,
            timeout: Duration::from_millis(config.request_timeout_ms),
        })
    }

    /// Override the API base URL. Used by tests to point at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a validated contact submission to the operator inbox.
    ///
    /// Reply-to is the submitter's raw address so the operator can answer
    /// directly; the HTML body variant is already entity-escaped by
    /// [`ValidatedContact::html_body`].
    pub async fn send_contact(&self, contact: &ValidatedContact) -> ApiResult<String> {
        let subject = contact.email_subject();
        let text = contact.text_body();
        let html = contact.html_body();

        let request = SendEmailRequest {
            from: &self.from,
            to: [&self.to],
            reply_to: &contact.email,
            subject: &subject,
            text: &text,
            html: &html,
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Delivery {
                service: "resend",
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Delivery {
                service: "resend",
                detail: format!("status {}: {}", status, detail),
            });
        }

        let body: SendEmailResponse =
            response.json().await.map_err(|e| ApiError::Delivery {
                service: "resend",
                detail: format!("response decode failed: {}", e),
            })?;

        info!(delivery_id = %body.id, "contact_email_sent");

        Ok(body.id)
    }
}
