use async_trait::async_trait;

use crate::{
    clients::database::DatabaseClient,
    error::{DispatchError, Result},
    models::context::{EndpointSettings, PolicyUrls},
};

/// Read-only messaging configuration, keyed by logical name.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn endpoint(&self, key: &str) -> Result<EndpointSettings>;

    async fn policy_urls(&self, key: &str) -> Result<PolicyUrls>;
}

pub struct PostgresSettingsStore {
    database: DatabaseClient,
}

impl PostgresSettingsStore {
    pub fn new(database: DatabaseClient) -> Self {
        Self { database }
    }
}

#[async_trait]
impl SettingsStore for PostgresSettingsStore {
    async fn endpoint(&self, key: &str) -> Result<EndpointSettings> {
        let row = self
            .database
            .client()
            .query_opt(
                "SELECT base_path, channel_id, country, config_item FROM messaging_endpoints WHERE key = $1",
                &[&key],
            )
            .await?
            .ok_or_else(|| DispatchError::not_found("messaging endpoint", key))?;

        Ok(EndpointSettings {
            base_path: row.get("base_path"),
            channel_id: row.get("channel_id"),
            country: row.get("country"),
            config_item: row.get("config_item"),
        })
    }

    async fn policy_urls(&self, key: &str) -> Result<PolicyUrls> {
        let row = self
            .database
            .client()
            .query_opt(
                "SELECT unsubscribe, terms_of_use, privacy_notice FROM policy_url_sets WHERE key = $1",
                &[&key],
            )
            .await?
            .ok_or_else(|| DispatchError::not_found("policy URL set", key))?;

        Ok(PolicyUrls {
            unsubscribe: row.get("unsubscribe"),
            terms_of_use: row.get("terms_of_use"),
            privacy_notice: row.get("privacy_notice"),
        })
    }
}
