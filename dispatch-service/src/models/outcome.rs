use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::DispatchError,
    models::{recipient::Recipient, status::DispatchStatus, template::NotificationTemplate},
};

/// Textual status recorded when the provider gave none.
pub const FAILED_STATUS: &str = "Failed";

/// Success body from the messaging provider. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub status: Option<String>,
    pub message_id: Option<String>,
}

impl ProviderResponse {
    /// Each key is read on its own: a missing or non-string value leaves
    /// only that field empty. Bodies that are not JSON yield no fields.
    pub fn parse(body: &str) -> Self {
        let value: Value = serde_json::from_str(body).unwrap_or_default();
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            status: field("status"),
            message_id: field("messageId"),
        }
    }
}

/// Result of a single call to the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReceipt {
    pub status: DispatchStatus,
    pub provider_status: String,
    pub provider_message_id: Option<String>,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl ProviderReceipt {
    /// HTTP 200. The textual status falls back to `"Failed"` when the body
    /// carries no `status`, whatever the HTTP code said.
    pub fn accepted(response: ProviderResponse) -> Self {
        let provider_status = response
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FAILED_STATUS.to_string());

        let status = if provider_status.eq_ignore_ascii_case(FAILED_STATUS) {
            DispatchStatus::Failed
        } else {
            DispatchStatus::Sent
        };

        Self {
            status,
            provider_status,
            provider_message_id: response.message_id.filter(|id| !id.is_empty()),
            status_code: Some(200),
            error: None,
        }
    }

    pub fn rejected(status_code: u16) -> Self {
        Self {
            status: DispatchStatus::Failed,
            provider_status: FAILED_STATUS.to_string(),
            provider_message_id: None,
            status_code: Some(status_code),
            error: Some(DispatchError::NonSuccess(status_code).to_string()),
        }
    }

    pub fn unreachable(error: String) -> Self {
        Self {
            status: DispatchStatus::Failed,
            provider_status: FAILED_STATUS.to_string(),
            provider_message_id: None,
            status_code: None,
            error: Some(DispatchError::Transport(error).to_string()),
        }
    }
}

/// One dispatch attempt for one recipient. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub recipient: Recipient,
    pub template: NotificationTemplate,
    pub status: DispatchStatus,
    pub provider_status: String,
    pub provider_message_id: Option<String>,
    pub http_status_code: Option<u16>,
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn new(recipient: Recipient, template: NotificationTemplate, receipt: ProviderReceipt) -> Self {
        Self {
            recipient,
            template,
            status: receipt.status,
            provider_status: receipt.provider_status,
            provider_message_id: receipt.provider_message_id,
            http_status_code: receipt.status_code,
            error: receipt.error,
        }
    }
}

/// Row written to the dispatch log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchLogRecord {
    pub job_id: Uuid,
    pub recipient_id: String,
    pub recipient_email: String,
    pub subject: String,
    pub body_template: String,
    pub event_name: String,
    pub event_type: String,
    pub template_id: String,
    pub status: String,
    pub provider_message_id: Option<String>,
    pub response_code: String,
}

impl DispatchLogRecord {
    pub fn from_outcome(job_id: Uuid, outcome: &DispatchOutcome) -> Self {
        Self {
            job_id,
            recipient_id: outcome.recipient.id.clone(),
            recipient_email: outcome.recipient.email_address.clone(),
            subject: outcome.template.subject.clone(),
            body_template: outcome.template.body_template.clone(),
            event_name: outcome.template.event_name.clone(),
            event_type: outcome.template.event_type.clone(),
            template_id: outcome.template.body_template_id.clone(),
            status: outcome.provider_status.clone(),
            provider_message_id: outcome.provider_message_id.clone(),
            response_code: outcome.http_status_code.unwrap_or(0).to_string(),
        }
    }
}

/// Stored row as read back from the log store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchLog {
    pub id: i64,
    #[serde(flatten)]
    pub record: DispatchLogRecord,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tolerates_garbage() {
        let response = ProviderResponse::parse("<html>ok</html>");
        assert_eq!(response.status, None);
        assert_eq!(response.message_id, None);

        let response = ProviderResponse::parse("");
        assert_eq!(response.status, None);
    }

    #[test]
    fn accepted_without_status_records_failed_text() {
        let receipt = ProviderReceipt::accepted(ProviderResponse::default());

        assert_eq!(receipt.provider_status, "Failed");
        assert_eq!(receipt.status, DispatchStatus::Failed);
        assert_eq!(receipt.status_code, Some(200));
        assert_eq!(receipt.provider_message_id, None);
    }

    #[test]
    fn accepted_with_status_is_sent() {
        let receipt = ProviderReceipt::accepted(ProviderResponse::parse(
            r#"{"status":"Queued","messageId":"m-1"}"#,
        ));

        assert_eq!(receipt.status, DispatchStatus::Sent);
        assert_eq!(receipt.provider_status, "Queued");
        assert_eq!(receipt.provider_message_id.as_deref(), Some("m-1"));
    }

    #[test]
    fn mistyped_field_keeps_the_other() {
        let receipt = ProviderReceipt::accepted(ProviderResponse::parse(
            r#"{"status":"Sent","messageId":12345}"#,
        ));

        assert_eq!(receipt.status, DispatchStatus::Sent);
        assert_eq!(receipt.provider_status, "Sent");
        assert_eq!(receipt.provider_message_id, None);

        let receipt = ProviderReceipt::accepted(ProviderResponse::parse(
            r#"{"status":true,"messageId":"m-7"}"#,
        ));

        assert_eq!(receipt.provider_status, "Failed");
        assert_eq!(receipt.provider_message_id.as_deref(), Some("m-7"));
    }

    #[test]
    fn rejected_reports_http_code() {
        let receipt = ProviderReceipt::rejected(503);

        assert_eq!(receipt.status, DispatchStatus::Failed);
        assert_eq!(receipt.error.as_deref(), Some("provider returned HTTP 503"));
    }

    #[test]
    fn unreachable_logs_zero_response_code() {
        let outcome = DispatchOutcome::new(
            Recipient::new("003A", "Ada", "ada@example.com"),
            NotificationTemplate {
                developer_name: "t".to_string(),
                subject: "s".to_string(),
                body_template: "b".to_string(),
                body_template_id: "id".to_string(),
                event_name: "e".to_string(),
                event_type: "Email".to_string(),
            },
            ProviderReceipt::unreachable("connection refused".to_string()),
        );

        let record = DispatchLogRecord::from_outcome(Uuid::nil(), &outcome);
        assert_eq!(record.response_code, "0");
        assert_eq!(record.status, "Failed");
        assert_eq!(record.provider_message_id, None);
    }
}
