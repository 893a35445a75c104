use serde::{Deserialize, Serialize};

/// Notification template descriptor, looked up by `developer_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub developer_name: String,
    pub subject: String,
    pub body_template: String,
    pub body_template_id: String,
    pub event_name: String,
    pub event_type: String,
}
