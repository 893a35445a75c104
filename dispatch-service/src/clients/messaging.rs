use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use tracing::{debug, info};

use crate::{
    config::Config,
    models::{
        outcome::{ProviderReceipt, ProviderResponse},
        payload::MessagePayload,
    },
};

/// Omnichannel messaging provider client. One POST per payload, no retries.
#[derive(Clone)]
pub struct MessagingClient {
    http_client: Client,
}

impl MessagingClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::with_timeout(Duration::from_secs(config.http_timeout_seconds))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(timeout_secs = timeout.as_secs(), "Messaging client initialized");

        Ok(Self { http_client })
    }

    /// Success is HTTP 200 exactly. Anything else, including a transport
    /// error, comes back as a failed receipt; reporting it is up to the
    /// caller.
    pub async fn send(&self, endpoint_url: &str, payload: &MessagePayload) -> ProviderReceipt {
        debug!(endpoint = endpoint_url, email = %payload.email_id, "Sending notification");

        let response = match self
            .http_client
            .post(endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProviderReceipt::unreachable(e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return ProviderReceipt::rejected(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();

        ProviderReceipt::accepted(ProviderResponse::parse(&body))
    }
}
