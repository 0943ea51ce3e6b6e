//! Submission gate: bot screening before any side-effecting work.
//!
//! The gate consults an external verdict service using only ambient
//! request signals and blocks when the verdict marks the request as
//! automated without recognizing it as a benign agent. The verdict
//! call's own failure fails open by default (`VERDICT_FAIL_OPEN`):
//! the error is logged and the request proceeds.

pub mod verdict;

use std::net::SocketAddr;

use axum::http::HeaderMap;
use tracing::{debug, info, warn};

pub use verdict::{Verdict, VerdictClient};

/// Ambient fingerprinting signals extracted from an inbound request.
#[derive(Debug, Clone)]
pub struct RequestSignals {
    pub ip: String,
    pub user_agent: String,
    pub accept_language: String,
}

impl RequestSignals {
    /// Extract signals from request headers, preferring proxy-set client
    /// IP headers over the socket peer address. The peer is absent when
    /// the router is driven without a real connection (tests).
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let ip = header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
            .or_else(|| header_str(headers, "x-real-ip").map(|v| v.to_string()))
            .or_else(|| peer.map(|p| p.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            ip,
            user_agent: header_str(headers, "user-agent").unwrap_or("").to_string(),
            accept_language: header_str(headers, "accept-language")
                .unwrap_or("")
                .to_string(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Block,
}

/// Bot gate consulted before validation.
#[derive(Clone)]
pub struct SubmissionGate {
    client: Option<VerdictClient>,
    fail_open: bool,
}

impl SubmissionGate {
    /// Build the gate. `client` is `None` when no verdict service is
    /// configured; the gate then allows everything.
    pub fn new(client: Option<VerdictClient>, fail_open: bool) -> Self {
        Self { client, fail_open }
    }

    /// Screen a request. `route` is only used for diagnostics.
    pub async fn evaluate(&self, route: &'static str, signals: &RequestSignals) -> GateDecision {
        let Some(client) = &self.client else {
            debug!(route = route, "gate_unconfigured_allowing");
            return GateDecision::Allow;
        };

        match client.classify(signals).await {
            Ok(verdict) => {
                let decision = decide(&verdict);
                info!(
                    route = route,
                    ip = %signals.ip,
                    is_automated = verdict.is_automated,
                    is_known_good = verdict.is_known_good_automated,
                    blocked = decision == GateDecision::Block,
                    "gate_verdict"
                );
                decision
            }
            Err(e) => {
                if self.fail_open {
                    warn!(route = route, error = %e, "gate_verdict_error_failing_open");
                    GateDecision::Allow
                } else {
                    warn!(route = route, error = %e, "gate_verdict_error_blocking");
                    GateDecision::Block
                }
            }
        }
    }
}

/// The block rule: automated and not a recognized benign agent.
fn decide(verdict: &Verdict) -> GateDecision {
    if verdict.is_automated && !verdict.is_known_good_automated {
        GateDecision::Block
    } else {
        GateDecision::Allow
    }
}
