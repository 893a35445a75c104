use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    clients::database::DatabaseClient,
    error::Result,
    models::{job::JobState, status::JobPhase},
};

/// Persists the resume cursor between chunk executions.
#[async_trait]
pub trait JobStateStore: Send + Sync {
    async fn save(&self, state: &JobState) -> Result<()>;

    async fn load(&self, job_id: Uuid) -> Result<Option<JobState>>;
}

pub struct PostgresJobStore {
    database: DatabaseClient,
}

impl PostgresJobStore {
    pub fn new(database: DatabaseClient) -> Self {
        Self { database }
    }
}

#[async_trait]
impl JobStateStore for PostgresJobStore {
    async fn save(&self, state: &JobState) -> Result<()> {
        self.database
            .client()
            .execute(
                r#"
                INSERT INTO dispatch_jobs (
                    job_id, template_key, next_user_name, next_patient_name,
                    processed, phase, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (job_id) DO UPDATE SET
                    next_user_name = EXCLUDED.next_user_name,
                    next_patient_name = EXCLUDED.next_patient_name,
                    processed = EXCLUDED.processed,
                    phase = EXCLUDED.phase,
                    updated_at = EXCLUDED.updated_at
                "#,
                &[
                    &state.job_id,
                    &state.template_key,
                    &(state.next_user_name as i64),
                    &(state.next_patient_name as i64),
                    &(state.processed as i64),
                    &state.phase.as_str(),
                    &state.updated_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn load(&self, job_id: Uuid) -> Result<Option<JobState>> {
        let row = self
            .database
            .client()
            .query_opt(
                r#"
                SELECT job_id, template_key, next_user_name, next_patient_name,
                       processed, phase, updated_at
                FROM dispatch_jobs
                WHERE job_id = $1
                "#,
                &[&job_id],
            )
            .await?;

        Ok(row.map(|row| {
            let phase: String = row.get("phase");
            let updated_at: DateTime<Utc> = row.get("updated_at");

            JobState {
                job_id: row.get("job_id"),
                template_key: row.get("template_key"),
                next_user_name: row.get::<_, i64>("next_user_name") as usize,
                next_patient_name: row.get::<_, i64>("next_patient_name") as usize,
                processed: row.get::<_, i64>("processed") as usize,
                phase: JobPhase::from_string(&phase),
                updated_at,
            }
        }))
    }
}
