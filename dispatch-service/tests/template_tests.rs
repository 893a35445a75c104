use anyhow::Result;
use dispatch_service::{
    clients::template::{TemplateCatalog, TemplateServiceClient},
    error::DispatchError,
    models::retry::RetryConfig,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::common::template;

fn retry_config() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_delay_ms: 10,
        max_delay_ms: 50,
        backoff_multiplier: 2,
    }
}

/// Test: Templates are fetched by developer name
#[tokio::test]
async fn test_fetches_template_by_developer_name() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/templates/QuestionnaireDue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(template()))
        .expect(1)
        .mount(&server)
        .await;

    let client = TemplateServiceClient::with_base_url(&server.uri(), retry_config())?;
    let fetched = client.template("QuestionnaireDue").await?;

    assert_eq!(fetched, template());

    Ok(())
}

/// Test: Reserved URL characters in a developer name stay inside one path segment
#[tokio::test]
async fn test_developer_name_is_encoded_as_one_segment() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/templates/Due%2FSoon%3Fx%23y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(template()))
        .expect(1)
        .mount(&server)
        .await;

    let client = TemplateServiceClient::with_base_url(&format!("{}/", server.uri()), retry_config())?;
    let fetched = client.template("Due/Soon?x#y").await?;

    assert_eq!(fetched, template());

    Ok(())
}

/// Test: Unknown templates are reported as not found without retrying
#[tokio::test]
async fn test_missing_template_is_not_retried() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = TemplateServiceClient::with_base_url(&server.uri(), retry_config())?;
    let result = client.template("Missing").await;

    assert!(matches!(result, Err(DispatchError::NotFound { .. })));

    Ok(())
}

/// Test: Server errors are retried up to the attempt budget
#[tokio::test]
async fn test_server_errors_are_retried() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = TemplateServiceClient::with_base_url(&server.uri(), retry_config())?;
    let result = client.template("QuestionnaireDue").await;

    assert!(matches!(result, Err(DispatchError::Configuration(_))));

    Ok(())
}
