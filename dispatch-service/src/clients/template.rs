use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{DispatchError, Result},
    models::{retry::RetryConfig, template::NotificationTemplate},
    utils::retry_with_backoff,
};

/// Template descriptors by developer name.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn template(&self, developer_name: &str) -> Result<NotificationTemplate>;
}

pub struct TemplateServiceClient {
    http_client: Client,
    base_url: Url,
    retry_config: RetryConfig,
}

impl TemplateServiceClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.template_service_url, config.retry_config())
    }

    pub fn with_base_url(base_url: &str, retry_config: RetryConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DispatchError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(base_url).map_err(|e| {
            DispatchError::Configuration(format!("Invalid template service URL {}: {}", base_url, e))
        })?;

        info!(base_url = %base_url, "Template service client initialized");

        Ok(Self {
            http_client,
            base_url,
            retry_config,
        })
    }

    /// `{base}/api/v1/templates/{developer_name}` with the name as one
    /// percent-encoded segment.
    fn template_url(&self, developer_name: &str) -> Result<Url> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| {
                DispatchError::Configuration(format!(
                    "Template service URL cannot take a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v1", "templates", developer_name]);

        Ok(url)
    }
}

#[async_trait]
impl TemplateCatalog for TemplateServiceClient {
    async fn template(&self, developer_name: &str) -> Result<NotificationTemplate> {
        let url = self.template_url(developer_name)?;

        debug!(developer_name, "Fetching template from service");

        // 404 ends the loop without retrying.
        let template = retry_with_backoff(&self.retry_config, "template", || {
            let url = url.clone();
            let client = self.http_client.clone();

            async move {
                let response = client.get(url).send().await.map_err(|e| e.to_string())?;

                match response.status() {
                    StatusCode::NOT_FOUND => Ok(None),
                    status if status.is_success() => response
                        .json::<NotificationTemplate>()
                        .await
                        .map(Some)
                        .map_err(|e| format!("Failed to parse template JSON: {}", e)),
                    status => Err(format!("Template service returned status {}", status)),
                }
            }
        })
        .await
        .map_err(DispatchError::Configuration)?;

        template.ok_or_else(|| DispatchError::not_found("template", developer_name))
    }
}
