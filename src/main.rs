//! Formgate server binary.
//!
//! Boots the web server: loads configuration from the environment,
//! constructs the delivery clients and the bot gate once, and serves the
//! contact and newsletter endpoints until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formgate::gate::{SubmissionGate, VerdictClient};
use formgate::web::{router, AppState};
use formgate::{Config, EmailSender, ListClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        email_configured = config.resend_api_key.is_some()
            && config.resend_from_email.is_some()
            && config.contact_email.is_some(),
        list_configured = config.brevo_api_key.is_some() && config.brevo_list_id.is_some(),
        verdict_configured = config.verdict_api_url.is_some(),
        verdict_fail_open = config.verdict_fail_open,
        "config_loaded"
    );

    // One shared HTTP client for all outbound calls
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()
        .context("Failed to build HTTP client")?;

    // Construct delivery clients and the gate once; handlers receive them
    // via state and treat a missing client as a configuration error.
    let email = EmailSender::from_config(http.clone(), &config);
    let list = ListClient::from_config(http.clone(), &config);

    let verdict = match (&config.verdict_api_url, &config.verdict_api_key) {
        (Some(url), Some(key)) => Some(VerdictClient::new(
            http,
            url.clone(),
            key.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )),
        _ => None,
    };
    let gate = SubmissionGate::new(verdict, config.verdict_fail_open);

    let port = config.port;
    let state = AppState::new(config, gate, email, list);
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "server_listening");

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("server_shutting_down");
}
