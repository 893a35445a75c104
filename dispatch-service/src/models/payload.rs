use serde::{Deserialize, Serialize};

use crate::models::{context::PolicyUrls, recipient::Recipient, template::NotificationTemplate};

/// Request body expected by the omnichannel messaging API. Absent optional
/// fields are left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(rename = "emailId")]
    pub email_id: String,
    pub body: PayloadBody,
    pub subject: String,
    #[serde(rename = "templateID")]
    pub template_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBody {
    pub firstname: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patientname: Option<String>,

    #[serde(rename = "ubi-pspb-unsubscribe")]
    pub unsubscribe: String,
    #[serde(rename = "ubi-pspb-termsofuse")]
    pub terms_of_use: String,
    #[serde(rename = "ubi-pspb-privacynotice")]
    pub privacy_notice: String,

    #[serde(rename = "Username")]
    pub username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    pub url: String,
}

impl MessagePayload {
    pub fn build(
        recipient: &Recipient,
        user_name: Option<&str>,
        patient_name: Option<&str>,
        template: &NotificationTemplate,
        policy_urls: &PolicyUrls,
        destination_url: &str,
        notification_date: Option<&str>,
    ) -> Self {
        Self {
            email_id: recipient.email_address.clone(),
            body: PayloadBody {
                firstname: recipient.display_name.clone(),
                patientname: non_empty(patient_name),
                unsubscribe: policy_urls.unsubscribe.clone(),
                terms_of_use: policy_urls.terms_of_use.clone(),
                privacy_notice: policy_urls.privacy_notice.clone(),
                username: user_name.unwrap_or_default().to_string(),
                date: non_empty(notification_date),
                url: destination_url.to_string(),
            },
            subject: template.subject.clone(),
            template_id: template.body_template_id.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
