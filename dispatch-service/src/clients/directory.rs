use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    clients::database::DatabaseClient,
    error::Result,
    models::recipient::Recipient,
};

/// Contact directory keyed by recipient id.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Returns the records that exist for `ids`, in any order, at most one
    /// per id.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Recipient>>;
}

/// Resolves `ids` against the directory, keeping caller order and one entry
/// per occurrence. Unknown ids are dropped and logged.
pub async fn resolve_recipients(
    directory: &dyn RecipientDirectory,
    ids: &[String],
) -> Result<Vec<Recipient>> {
    let mut unique: Vec<String> = ids.to_vec();
    unique.sort();
    unique.dedup();

    let found: HashMap<String, Recipient> = directory
        .find_by_ids(&unique)
        .await?
        .into_iter()
        .map(|recipient| (recipient.id.clone(), recipient))
        .collect();

    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        match found.get(id) {
            Some(recipient) => resolved.push(recipient.clone()),
            None => info!(recipient_id = %id, "Recipient not found in directory, skipping"),
        }
    }

    debug!(
        requested = ids.len(),
        resolved = resolved.len(),
        "Recipients resolved"
    );

    Ok(resolved)
}

pub struct PostgresDirectory {
    database: DatabaseClient,
}

impl PostgresDirectory {
    pub fn new(database: DatabaseClient) -> Self {
        Self { database }
    }
}

#[async_trait]
impl RecipientDirectory for PostgresDirectory {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Recipient>> {
        let rows = self
            .database
            .client()
            .query(
                "SELECT id, display_name, email_address FROM contacts WHERE id = ANY($1)",
                &[&ids],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| Recipient {
                id: row.get("id"),
                display_name: row.get("display_name"),
                email_address: row.get("email_address"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::memory::InMemoryDirectory;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new(vec![
            Recipient::new("A", "Ada", "ada@example.com"),
            Recipient::new("B", "Bob", "bob@example.com"),
        ])
    }

    #[tokio::test]
    async fn keeps_order_and_duplicates() {
        let resolved = resolve_recipients(&directory(), &ids(&["B", "A", "B", "A"]))
            .await
            .unwrap();

        let order: Vec<&str> = resolved.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "B", "A"]);
    }

    #[tokio::test]
    async fn drops_unknown_ids() {
        let resolved = resolve_recipients(&directory(), &ids(&["A", "Z", "B", "Z"]))
            .await
            .unwrap();

        let order: Vec<&str> = resolved.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn empty_input_resolves_to_nothing() {
        let resolved = resolve_recipients(&directory(), &[]).await.unwrap();
        assert!(resolved.is_empty());
    }
}
