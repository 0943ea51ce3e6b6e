//! Web server module for the form submission endpoints.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{contact, health, newsletter, AppState, ContactResponse, NewsletterResponse};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(contact))
        .route("/api/newsletter", post(newsletter))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
