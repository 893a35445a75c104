use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::status::JobPhase;

/// Resume cursor for one batch job.
///
/// The override cursors are global to the job: they advance once per
/// recipient and are carried from chunk to chunk, never reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    pub job_id: Uuid,
    pub template_key: String,
    pub next_user_name: usize,
    pub next_patient_name: usize,
    pub processed: usize,
    pub phase: JobPhase,
    pub updated_at: DateTime<Utc>,
}

/// Overrides handed to one recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientOverrides<'a> {
    pub user_name: Option<&'a str>,
    pub patient_name: Option<&'a str>,
}

impl JobState {
    pub fn new(job_id: Uuid, template_key: impl Into<String>) -> Self {
        Self {
            job_id,
            template_key: template_key.into(),
            next_user_name: 0,
            next_patient_name: 0,
            processed: 0,
            phase: JobPhase::Started,
            updated_at: Utc::now(),
        }
    }

    /// Consumes the next unused entry of each override list. A list that has
    /// run out yields `None` for the rest of the job.
    pub fn take_overrides<'a>(
        &mut self,
        user_names: &'a [String],
        patient_names: &'a [String],
    ) -> RecipientOverrides<'a> {
        let user_name = user_names.get(self.next_user_name).map(String::as_str);
        let patient_name = patient_names
            .get(self.next_patient_name)
            .map(String::as_str);

        self.next_user_name += 1;
        self.next_patient_name += 1;
        self.processed += 1;

        RecipientOverrides {
            user_name,
            patient_name,
        }
    }

    pub fn advance_to(&mut self, phase: JobPhase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }
}
