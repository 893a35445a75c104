use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{outcome::DispatchOutcome, status::DispatchStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOutcome {
    Completed,
    Aborted,
}

/// Reply to a batch submission; the job runs in the background.
#[derive(Debug, Clone, Serialize)]
pub struct BatchAccepted {
    pub job_id: Uuid,
}

/// What a batch run did, returned instead of raising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub job_id: Uuid,
    pub outcome: BatchOutcome,
    pub requested: usize,
    pub resolved: usize,
    pub sent: usize,
    pub failed: usize,
    pub logged: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BatchSummary {
    pub fn aborted(job_id: Uuid, requested: usize, reason: String) -> Self {
        Self {
            job_id,
            outcome: BatchOutcome::Aborted,
            requested,
            resolved: 0,
            sent: 0,
            failed: 0,
            logged: 0,
            reason: Some(reason),
        }
    }

    pub fn completed(
        job_id: Uuid,
        requested: usize,
        outcomes: &[DispatchOutcome],
        logged: usize,
    ) -> Self {
        let sent = outcomes
            .iter()
            .filter(|o| o.status == DispatchStatus::Sent)
            .count();

        Self {
            job_id,
            outcome: BatchOutcome::Completed,
            requested,
            resolved: outcomes.len(),
            sent,
            failed: outcomes.len() - sent,
            logged,
            reason: None,
        }
    }
}
