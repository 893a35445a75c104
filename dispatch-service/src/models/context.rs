use serde::{Deserialize, Serialize};

use crate::models::template::NotificationTemplate;

/// Inbound request to dispatch one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub contact_ids: Vec<String>,
    pub template_key: String,
    pub destination_url: String,

    #[serde(default)]
    pub notification_date: Option<String>,
    #[serde(default)]
    pub user_names: Vec<String>,
    #[serde(default)]
    pub patient_names: Vec<String>,

    #[serde(default)]
    pub endpoint_key: Option<String>,
    #[serde(default)]
    pub policy_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyUrls {
    pub unsubscribe: String,
    pub terms_of_use: String,
    pub privacy_notice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    pub base_path: String,
    pub channel_id: String,
    pub country: String,
    pub config_item: String,
}

impl EndpointSettings {
    /// `base_path/channel_id/country/config_item`, without doubled slashes at
    /// the joins.
    pub fn url(&self) -> String {
        let mut url = self.base_path.trim_end_matches('/').to_string();

        for segment in [&self.channel_id, &self.country, &self.config_item] {
            let segment = segment.trim_matches('/');
            if segment.is_empty() {
                continue;
            }
            url.push('/');
            url.push_str(segment);
        }

        url
    }
}

/// Per-batch invariant data, built once after validation and configuration
/// lookups succeed.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    pub contact_ids: Vec<String>,
    pub template: NotificationTemplate,
    pub endpoint_url: String,
    pub destination_url: String,
    pub notification_date: Option<String>,
    pub user_names: Vec<String>,
    pub patient_names: Vec<String>,
    pub policy_urls: PolicyUrls,
}
