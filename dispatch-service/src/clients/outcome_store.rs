use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::{
    clients::database::DatabaseClient,
    error::Result,
    models::outcome::{DispatchLog, DispatchLogRecord},
};

/// Durable dispatch log. Writes are always bulk.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Inserts every record in one write and returns the row count.
    async fn insert_all(&self, records: &[DispatchLogRecord]) -> Result<u64>;

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<DispatchLog>>;
}

pub struct PostgresOutcomeStore {
    database: DatabaseClient,
}

impl PostgresOutcomeStore {
    pub fn new(database: DatabaseClient) -> Self {
        Self { database }
    }
}

#[async_trait]
impl OutcomeStore for PostgresOutcomeStore {
    async fn insert_all(&self, records: &[DispatchLogRecord]) -> Result<u64> {
        let column = |f: fn(&DispatchLogRecord) -> &String| -> Vec<String> {
            records.iter().map(|r| f(r).clone()).collect()
        };

        let job_ids: Vec<Uuid> = records.iter().map(|r| r.job_id).collect();
        let recipient_ids = column(|r| &r.recipient_id);
        let emails = column(|r| &r.recipient_email);
        let subjects = column(|r| &r.subject);
        let body_templates = column(|r| &r.body_template);
        let event_names = column(|r| &r.event_name);
        let event_types = column(|r| &r.event_type);
        let template_ids = column(|r| &r.template_id);
        let statuses = column(|r| &r.status);
        let message_ids: Vec<Option<String>> = records
            .iter()
            .map(|r| r.provider_message_id.clone())
            .collect();
        let response_codes = column(|r| &r.response_code);

        let inserted = self
            .database
            .client()
            .execute(
                r#"
                INSERT INTO dispatch_logs (
                    job_id,
                    recipient_id,
                    recipient_email,
                    subject,
                    body_template,
                    event_name,
                    event_type,
                    template_id,
                    status,
                    provider_message_id,
                    response_code
                )
                SELECT * FROM UNNEST(
                    $1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[],
                    $7::text[], $8::text[], $9::text[], $10::text[], $11::text[]
                )
                "#,
                &[
                    &job_ids,
                    &recipient_ids,
                    &emails,
                    &subjects,
                    &body_templates,
                    &event_names,
                    &event_types,
                    &template_ids,
                    &statuses,
                    &message_ids,
                    &response_codes,
                ],
            )
            .await?;

        debug!(rows = inserted, "Dispatch log rows written");

        Ok(inserted)
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<DispatchLog>> {
        let rows = self
            .database
            .client()
            .query(
                r#"
                SELECT id, job_id, recipient_id, recipient_email, subject, body_template,
                       event_name, event_type, template_id, status, provider_message_id,
                       response_code, created_at
                FROM dispatch_logs
                WHERE job_id = $1
                ORDER BY id
                "#,
                &[&job_id],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| DispatchLog {
                id: row.get("id"),
                record: DispatchLogRecord {
                    job_id: row.get("job_id"),
                    recipient_id: row.get("recipient_id"),
                    recipient_email: row.get("recipient_email"),
                    subject: row.get("subject"),
                    body_template: row.get("body_template"),
                    event_name: row.get("event_name"),
                    event_type: row.get("event_type"),
                    template_id: row.get("template_id"),
                    status: row.get("status"),
                    provider_message_id: row.get("provider_message_id"),
                    response_code: row.get("response_code"),
                },
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
