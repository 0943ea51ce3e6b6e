//! Form submission endpoint handlers.
//!
//! Each POST handler is one linear pipeline:
//! gate → validate → escape/construct → deliver → map outcome.
//! No retries, no queueing, no state shared between requests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::deliver::{EmailSender, ListClient};
use crate::error::{ApiError, ApiResult};
use crate::forms::{ContactForm, NewsletterForm};
use crate::gate::{GateDecision, RequestSignals, SubmissionGate};

/// Shared application state. Delivery clients are built once at startup;
/// `None` means the integration is not configured.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: SubmissionGate,
    pub email: Option<EmailSender>,
    pub list: Option<ListClient>,
}

impl AppState {
    pub fn new(
        config: Config,
        gate: SubmissionGate,
        email: Option<EmailSender>,
        list: Option<ListClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gate,
            email,
            list,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Contact Form
// =============================================================================

/// Successful contact submission response.
#[derive(Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
    pub id: String,
}

/// Contact form endpoint.
///
/// Blocks automated traffic (honeypot, then verdict gate), validates the
/// four required fields, and forwards the submission to the operator
/// inbox via the transactional email service.
pub async fn contact(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> ApiResult<Json<ContactResponse>> {
    info!(
        has_name = !form.name.trim().is_empty(),
        has_email = !form.email.trim().is_empty(),
        message_length = form.message.len(),
        "contact_received"
    );

    // A filled honeypot is automated traffic; skip the verdict call.
    if !form.website.trim().is_empty() {
        warn!("contact_honeypot_tripped");
        return Err(ApiError::Blocked);
    }

    let signals = RequestSignals::from_request(&headers, peer.map(|ConnectInfo(addr)| addr));
    if state.gate.evaluate("contact", &signals).await == GateDecision::Block {
        return Err(ApiError::Blocked);
    }

    let validated = form.validate()?;

    let sender = state
        .email
        .as_ref()
        .ok_or(ApiError::Configuration("email delivery"))?;

    let id = sender.send_contact(&validated).await?;

    info!(delivery_id = %id, "contact_forwarded");

    Ok(Json(ContactResponse {
        message: "Message sent successfully",
        id,
    }))
}

// =============================================================================
// Newsletter Subscription
// =============================================================================

/// Successful newsletter subscription response.
#[derive(Serialize)]
pub struct NewsletterResponse {
    pub success: bool,
    pub message: &'static str,
    pub status: &'static str,
}

/// Newsletter subscription endpoint.
///
/// Same gate as the contact path, a deliberately weaker email check
/// (presence plus `@`), then the mailing-list service call.
pub async fn newsletter(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(form): Json<NewsletterForm>,
) -> ApiResult<Json<NewsletterResponse>> {
    info!(has_email = !form.email.trim().is_empty(), "newsletter_received");

    let signals = RequestSignals::from_request(&headers, peer.map(|ConnectInfo(addr)| addr));
    if state.gate.evaluate("newsletter", &signals).await == GateDecision::Block {
        return Err(ApiError::Blocked);
    }

    let email = form.validate()?;

    let list = state
        .list
        .as_ref()
        .ok_or(ApiError::Configuration("newsletter list"))?;

    let status = list.subscribe(&email).await?;

    Ok(Json(NewsletterResponse {
        success: true,
        message: "Subscription successful",
        status: status.as_str(),
    }))
}
