use serde::{Deserialize, Serialize};

/// A contactable party resolved from the directory. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub display_name: String,
    pub email_address: String,
}

impl Recipient {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email_address: email_address.into(),
        }
    }
}
