use std::time::Duration;

use anyhow::Result;
use dispatch_service::{
    clients::messaging::MessagingClient,
    models::{payload::MessagePayload, recipient::Recipient, status::DispatchStatus},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

use crate::common::{policy_urls, template};

fn payload() -> MessagePayload {
    MessagePayload::build(
        &Recipient::new("A", "Ada", "ada@example.com"),
        Some("ada.l"),
        None,
        &template(),
        &policy_urls(),
        "https://portal.example.com/login",
        None,
    )
}

fn client() -> MessagingClient {
    MessagingClient::with_timeout(Duration::from_secs(5)).expect("client builds")
}

/// Test: The payload is posted as sparse JSON with the provider's field names
#[tokio::test]
async fn test_posts_sparse_json_payload() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "emailId": "ada@example.com",
            "body": {
                "firstname": "Ada",
                "ubi-pspb-unsubscribe": "https://example.com/unsubscribe",
                "ubi-pspb-termsofuse": "https://example.com/terms",
                "ubi-pspb-privacynotice": "https://example.com/privacy",
                "Username": "ada.l",
                "url": "https://portal.example.com/login"
            },
            "subject": "Your questionnaire is due",
            "templateID": "tmpl-42"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "Sent", "messageId": "m-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client()
        .send(&format!("{}/send", server.uri()), &payload())
        .await;

    assert_eq!(receipt.status, DispatchStatus::Sent);
    assert_eq!(receipt.provider_status, "Sent");
    assert_eq!(receipt.provider_message_id.as_deref(), Some("m-1"));
    assert_eq!(receipt.status_code, Some(200));
    assert_eq!(receipt.error, None);

    Ok(())
}

/// Test: Only HTTP 200 counts as success, even for other 2xx codes
#[tokio::test]
async fn test_non_200_success_codes_fail() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({"status": "Sent", "messageId": "m-2"})),
        )
        .mount(&server)
        .await;

    let receipt = client().send(&server.uri(), &payload()).await;

    assert_eq!(receipt.status, DispatchStatus::Failed);
    assert_eq!(receipt.provider_status, "Failed");
    assert_eq!(receipt.provider_message_id, None, "Non-200 bodies are not parsed");
    assert_eq!(receipt.status_code, Some(202));

    Ok(())
}

/// Test: Server errors come back as failed receipts
#[tokio::test]
async fn test_server_error_is_failed_receipt() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let receipt = client().send(&server.uri(), &payload()).await;

    assert_eq!(receipt.status, DispatchStatus::Failed);
    assert_eq!(receipt.status_code, Some(503));
    assert!(receipt.error.is_some());

    Ok(())
}

/// Test: Empty and partial success bodies never panic
#[tokio::test]
async fn test_partial_success_bodies() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/id-only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messageId": "m-3"})))
        .mount(&server)
        .await;

    let empty = client()
        .send(&format!("{}/empty", server.uri()), &payload())
        .await;
    assert_eq!(empty.provider_status, "Failed");
    assert_eq!(empty.provider_message_id, None);
    assert_eq!(empty.status_code, Some(200));

    let id_only = client()
        .send(&format!("{}/id-only", server.uri()), &payload())
        .await;
    assert_eq!(id_only.provider_status, "Failed");
    assert_eq!(id_only.provider_message_id.as_deref(), Some("m-3"));

    Ok(())
}

/// Test: Transport failures produce a receipt without a status code
#[tokio::test]
async fn test_transport_failure_has_no_status_code() -> Result<()> {
    let receipt = client().send("http://127.0.0.1:1/send", &payload()).await;

    assert_eq!(receipt.status, DispatchStatus::Failed);
    assert_eq!(receipt.status_code, None);
    assert!(receipt.error.is_some());

    Ok(())
}
