//! Formgate - bot-gated form submission gateway.
//!
//! This library backs the `formgate` binary: a small web service exposing
//! the contact and newsletter endpoints of an editorial magazine site.
//!
//! ## Architecture
//!
//! ```text
//! POST → SubmissionGate (bot verdict) → validate/escape → delivery service
//! ```
//!
//! Two outward integrations: transactional email (Resend) for the contact
//! form, mailing-list subscription (Brevo) for the newsletter. Both are
//! gated by an external bot-verdict service that fails open by default.

pub mod config;
pub mod deliver;
pub mod error;
pub mod escape;
pub mod forms;
pub mod gate;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use deliver::{EmailSender, ListClient, SubscriberStatus};
pub use error::{ApiError, ApiResult};
pub use forms::{ContactForm, NewsletterForm, ValidatedContact};
pub use gate::{GateDecision, RequestSignals, SubmissionGate, Verdict, VerdictClient};
pub use web::{router, AppState};
