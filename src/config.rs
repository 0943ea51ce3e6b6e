//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables. Missing optional
//! credentials are carried as `None` and surface as configuration errors
//! on first use, never as a startup crash.

use std::env;
use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// HTTP request timeout in milliseconds for outbound calls
    pub request_timeout_ms: u64,

    // =========================================================================
    // Transactional Email (contact form delivery)
    // =========================================================================

    /// Resend API key
    pub resend_api_key: Option<String>,

    /// Sender address for outbound contact messages
    pub resend_from_email: Option<String>,

    /// Operator recipient address for contact form submissions
    pub contact_email: Option<String>,

    // =========================================================================
    // Mailing List (newsletter subscription)
    // =========================================================================

    /// Brevo API key
    pub brevo_api_key: Option<String>,

    /// Brevo list id new subscribers are added to
    pub brevo_list_id: Option<i64>,

    /// Attribution source tag sent with each subscription
    pub newsletter_source: String,

    /// Attribution medium tag sent with each subscription
    pub newsletter_medium: String,

    /// Attribution campaign tag sent with each subscription
    pub newsletter_campaign: String,

    // =========================================================================
    // Bot Verdict Service
    // =========================================================================

    /// Verdict service endpoint URL
    pub verdict_api_url: Option<String>,

    /// Verdict service API key
    pub verdict_api_key: Option<String>,

    /// Allow submissions through when the verdict call itself fails.
    ///
    /// Availability-over-strictness policy: a false block on a real user
    /// is worse than an occasional missed bot.
    pub verdict_fail_open: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),

            resend_api_key: non_empty_var("RESEND_API_KEY"),

            resend_from_email: non_empty_var("RESEND_FROM_EMAIL"),

            contact_email: non_empty_var("CONTACT_EMAIL"),

            brevo_api_key: non_empty_var("BREVO_API_KEY"),

            brevo_list_id: env::var("BREVO_LIST_ID").ok().and_then(|v| {
                let parsed = v.trim().parse().ok();
                if parsed.is_none() {
                    warn!(env_var = "BREVO_LIST_ID", value = %v, "Invalid list id, ignoring");
                }
                parsed
            }),

            newsletter_source: env::var("NEWSLETTER_SOURCE")
                .unwrap_or_else(|_| "website".to_string()),

            newsletter_medium: env::var("NEWSLETTER_MEDIUM")
                .unwrap_or_else(|_| "form".to_string()),

            newsletter_campaign: env::var("NEWSLETTER_CAMPAIGN")
                .unwrap_or_else(|_| "newsletter".to_string()),

            verdict_api_url: non_empty_var("VERDICT_API_URL"),

            verdict_api_key: non_empty_var("VERDICT_API_KEY"),

            verdict_fail_open: parse_bool("VERDICT_FAIL_OPEN", true),
        }
    }
}

/// Read an environment variable, treating empty/whitespace values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parse a boolean flag like "true"/"false"/"1"/"0".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}
