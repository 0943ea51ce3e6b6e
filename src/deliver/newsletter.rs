//! Newsletter subscription via the Brevo contacts API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

const BREVO_BASE_URL: &str = "https://api.brevo.com";

/// Fixed attribution tags recorded on every subscriber.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Attribution {
    pub source: String,
    pub medium: String,
    pub campaign: String,
}

/// Outbound payload for the Brevo `/v3/contacts` endpoint.
///
/// `update_enabled` reactivates an address that was previously removed
/// from the list instead of failing the call; the welcome message is
/// triggered by the list addition on the Brevo side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeRequest<'a> {
    email: &'a str,
    list_ids: [i64; 1],
    update_enabled: bool,
    email_blacklisted: bool,
    attributes: &'a Attribution,
}

/// Result of a subscription call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberStatus {
    /// New contact created on the list.
    Created,
    /// Contact already existed and was updated/reactivated.
    Updated,
}

impl SubscriberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriberStatus::Created => "subscribed",
            SubscriberStatus::Updated => "updated",
        }
    }
}

/// Client for the mailing-list service. Same constructor-time `Option`
/// contract as [`crate::deliver::EmailSender`].
#[derive(Clone)]
pub struct ListClient {
    http: Client,
    base_url: String,
    api_key: String,
    list_id: i64,
    attribution: Attribution,
    timeout: Duration,
}

impl ListClient {
    pub fn from_config(http: Client, config: &Config) -> Option<Self> {
        Some(Self {
            http,
            base_url: BREVO_BASE_URL.to_string(),
            api_key: config.brevo_api_key.clone()?,
            list_id: config.brevo_list_id?,
            attribution: Attribution {
                source: config.newsletter_source.clone(),
                medium: config.newsletter_medium.clone(),
                campaign: config.newsletter_campaign.clone(),
            },
            timeout: Duration::from_millis(config.request_timeout_ms),
        })
    }

    /// Override the API base URL. Used by tests to point at a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Subscribe the address to the configured list.
    ///
    /// A 400 from the service is the service rejecting the address itself
    /// and maps back to a validation error; any other non-success is a
    /// delivery error carrying the status code.
    pub async fn subscribe(&self, email: &str) -> ApiResult<SubscriberStatus> {
        let request = SubscribeRequest {
            email,
            list_ids: [self.list_id],
            update_enabled: true,
            email_blacklisted: false,
            attributes: &self.attribution,
        };

        let response = self
            .http
            .post(format!("{}/v3/contacts", self.base_url))
            .header("api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Delivery {
                service: "brevo",
                detail: e.to_string(),
            })?;

        let status = response.status();

        if status == StatusCode::BAD_REQUEST {
            let detail = response.text().await.unwrap_or_default();
            tracing::info!(detail = %detail, "newsletter_subscription_rejected");
            return Err(ApiError::Validation("Invalid email address".to_string()));
        }

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Delivery {
                service: "brevo",
                detail: format!("status {}: {}", status, detail),
            });
        }

        // 201 = contact created, 204 = existing contact updated.
        let subscriber_status = if status == StatusCode::NO_CONTENT {
            SubscriberStatus::Updated
        } else {
            SubscriberStatus::Created
        };

        info!(
            list_id = self.list_id,
            status = subscriber_status.as_str(),
            "newsletter_subscribed"
        );

        Ok(subscriber_status)
    }
}
