//! End-to-end tests over the real router with mocked external services.
//!
//! The verdict, email, and mailing-list services are wiremock servers;
//! requests are driven through the router with `tower::ServiceExt::oneshot`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use formgate::gate::{SubmissionGate, VerdictClient};
use formgate::web::{router, AppState};
use formgate::{Config, EmailSender, ListClient};

fn test_config() -> Config {
    Config {
        port: 0,
        request_timeout_ms: 2000,
        resend_api_key: Some("re_test".to_string()),
        resend_from_email: Some("forms@magazine.test".to_string()),
        contact_email: Some("ops@magazine.test".to_string()),
        brevo_api_key: Some("brevo_test".to_string()),
        brevo_list_id: Some(12),
        newsletter_source: "website".to_string(),
        newsletter_medium: "form".to_string(),
        newsletter_campaign: "newsletter".to_string(),
        verdict_api_url: None,
        verdict_api_key: None,
        verdict_fail_open: true,
    }
}

struct TestApp {
    router: Router,
}

impl TestApp {
    /// Build the app against mock delivery servers. `verdict` is the mock
    /// verdict server, if the gate should be configured.
    fn new(
        config: Config,
        verdict: Option<&MockServer>,
        email_server: Option<&MockServer>,
        list_server: Option<&MockServer>,
    ) -> Self {
        let http = reqwest::Client::new();
        let timeout = Duration::from_millis(config.request_timeout_ms);

        let email = email_server.and_then(|server| {
            EmailSender::from_config(http.clone(), &config)
                .map(|s| s.with_base_url(server.uri()))
        });
        let list = list_server.and_then(|server| {
            ListClient::from_config(http.clone(), &config)
                .map(|c| c.with_base_url(server.uri()))
        });

        let verdict_client = verdict.map(|server| {
            VerdictClient::new(
                http.clone(),
                format!("{}/verdict", server.uri()),
                "verdict_test".to_string(),
                timeout,
            )
        });
        let gate = SubmissionGate::new(verdict_client, config.verdict_fail_open);

        Self {
            router: router(AppState::new(config, gate, email, list)),
        }
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("user-agent", "integration-test")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn valid_contact() -> Value {
    json!({"name": "A", "email": "a@b.com", "subject": "S", "message": "M"})
}

async fn mock_email_ok(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "email_123"})))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mock_verdict(server: &MockServer, is_automated: bool, is_known_good: bool) {
    Mock::given(method("POST"))
        .and(path("/verdict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isAutomated": is_automated,
            "isKnownGoodAutomated": is_known_good,
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Contact path
// =============================================================================

#[tokio::test]
async fn contact_happy_path_returns_delivery_id() {
    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 1).await;

    let app = TestApp::new(test_config(), None, Some(&email_server), None);
    let (status, body) = app.post("/api/contact", valid_contact()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Message sent successfully");
    assert!(!body["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn contact_missing_field_is_400_and_no_delivery_call() {
    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 0).await;

    let app = TestApp::new(test_config(), None, Some(&email_server), None);
    let (status, body) = app
        .post(
            "/api/contact",
            json!({"name": "A", "email": "a@b.com", "subject": "S"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn contact_invalid_email_is_400() {
    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 0).await;

    let app = TestApp::new(test_config(), None, Some(&email_server), None);
    let (status, body) = app
        .post(
            "/api/contact",
            json!({"name": "A", "email": "not-an-email", "subject": "S", "message": "M"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email address");
}

#[tokio::test]
async fn contact_outbound_email_is_escaped_with_reply_to() {
    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 1).await;

    let app = TestApp::new(test_config(), None, Some(&email_server), None);
    let (status, _) = app
        .post(
            "/api/contact",
            json!({
                "name": "<b>Bob</b>",
                "email": "bob@b.com",
                "subject": "Hi & bye",
                "message": "It's \"fine\"",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let requests = email_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(sent["from"], "forms@magazine.test");
    assert_eq!(sent["to"][0], "ops@magazine.test");
    assert_eq!(sent["reply_to"], "bob@b.com");

    let html = sent["html"].as_str().unwrap();
    assert!(html.contains("&lt;b&gt;Bob&lt;/b&gt;"));
    assert!(html.contains("Hi &amp; bye"));
    assert!(html.contains("It&#39;s &quot;fine&quot;"));
    assert!(!html.contains("<b>Bob"));

    // The plain-text variant keeps raw values.
    let text = sent["text"].as_str().unwrap();
    assert!(text.contains("<b>Bob</b>"));
}

#[tokio::test]
async fn contact_without_email_config_is_503() {
    let mut config = test_config();
    config.resend_from_email = None;

    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 0).await;

    let app = TestApp::new(config, None, Some(&email_server), None);
    let (status, body) = app.post("/api/contact", valid_contact()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Service temporarily unavailable");
}

#[tokio::test]
async fn contact_delivery_failure_is_generic_500() {
    let email_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "key invalid: re_secret"})),
        )
        .mount(&email_server)
        .await;

    let app = TestApp::new(test_config(), None, Some(&email_server), None);
    let (status, body) = app.post("/api/contact", valid_contact()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // The service's detail never reaches the caller.
    assert_eq!(body["error"], "Failed to process request");
}

#[tokio::test]
async fn contact_honeypot_is_blocked_without_verdict_call() {
    let verdict_server = MockServer::start().await;
    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 0).await;

    let app = TestApp::new(
        test_config(),
        Some(&verdict_server),
        Some(&email_server),
        None,
    );
    let mut body = valid_contact();
    body["website"] = json!("http://spam.example");
    let (status, _) = app.post("/api/contact", body).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(verdict_server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Submission gate
// =============================================================================

#[tokio::test]
async fn gate_blocks_unrecognized_automation() {
    let verdict_server = MockServer::start().await;
    mock_verdict(&verdict_server, true, false).await;

    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 0).await;

    let app = TestApp::new(
        test_config(),
        Some(&verdict_server),
        Some(&email_server),
        None,
    );
    let (status, body) = app.post("/api/contact", valid_contact()).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Request blocked");
}

#[tokio::test]
async fn gate_allows_known_good_automation() {
    let verdict_server = MockServer::start().await;
    mock_verdict(&verdict_server, true, true).await;

    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 1).await;

    let app = TestApp::new(
        test_config(),
        Some(&verdict_server),
        Some(&email_server),
        None,
    );
    let (status, _) = app.post("/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn gate_allows_humans() {
    let verdict_server = MockServer::start().await;
    mock_verdict(&verdict_server, false, false).await;

    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 1).await;

    let app = TestApp::new(
        test_config(),
        Some(&verdict_server),
        Some(&email_server),
        None,
    );
    let (status, _) = app.post("/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn gate_fails_open_on_verdict_error() {
    let verdict_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verdict"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&verdict_server)
        .await;

    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 1).await;

    let app = TestApp::new(
        test_config(),
        Some(&verdict_server),
        Some(&email_server),
        None,
    );
    let (status, _) = app.post("/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn gate_blocks_on_verdict_error_when_fail_open_disabled() {
    let verdict_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verdict"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&verdict_server)
        .await;

    let email_server = MockServer::start().await;
    mock_email_ok(&email_server, 0).await;

    let mut config = test_config();
    config.verdict_fail_open = false;

    let app = TestApp::new(config, Some(&verdict_server), Some(&email_server), None);
    let (status, _) = app.post("/api/contact", valid_contact()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gate_applies_to_newsletter_path() {
    let verdict_server = MockServer::start().await;
    mock_verdict(&verdict_server, true, false).await;

    let list_server = MockServer::start().await;

    let app = TestApp::new(
        test_config(),
        Some(&verdict_server),
        None,
        Some(&list_server),
    );
    let (status, _) = app
        .post("/api/newsletter", json!({"email": "a@b.com"}))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(list_server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Newsletter path
// =============================================================================

#[tokio::test]
async fn newsletter_happy_path_subscribes() {
    let list_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&list_server)
        .await;

    let app = TestApp::new(test_config(), None, None, Some(&list_server));
    let (status, body) = app
        .post("/api/newsletter", json!({"email": "reader@magazine.test"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "subscribed");

    let requests = list_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["email"], "reader@magazine.test");
    assert_eq!(sent["listIds"][0], 12);
    assert_eq!(sent["updateEnabled"], true);
    assert_eq!(sent["attributes"]["SOURCE"], "website");
}

#[tokio::test]
async fn newsletter_existing_subscriber_is_updated() {
    let list_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&list_server)
        .await;

    let app = TestApp::new(test_config(), None, None, Some(&list_server));
    let (status, body) = app
        .post("/api/newsletter", json!({"email": "reader@magazine.test"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");
}

#[tokio::test]
async fn newsletter_email_without_at_is_400() {
    let list_server = MockServer::start().await;

    let app = TestApp::new(test_config(), None, None, Some(&list_server));
    let (status, body) = app.post("/api/newsletter", json!({"email": "bad"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Valid email is required");
    assert!(list_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn newsletter_service_400_maps_to_validation_error() {
    let list_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "invalid email"})),
        )
        .mount(&list_server)
        .await;

    let app = TestApp::new(test_config(), None, None, Some(&list_server));
    let (status, body) = app
        .post("/api/newsletter", json!({"email": "odd@address"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email address");
}

#[tokio::test]
async fn newsletter_service_failure_is_generic_500() {
    let list_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/contacts"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&list_server)
        .await;

    let app = TestApp::new(test_config(), None, None, Some(&list_server));
    let (status, body) = app
        .post("/api/newsletter", json!({"email": "reader@magazine.test"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to process request");
}

#[tokio::test]
async fn newsletter_without_list_config_is_503() {
    let mut config = test_config();
    config.brevo_list_id = None;

    let list_server = MockServer::start().await;
    let app = TestApp::new(config, None, None, Some(&list_server));
    let (status, _) = app
        .post("/api/newsletter", json!({"email": "reader@magazine.test"}))
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::new(test_config(), None, None, None);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
