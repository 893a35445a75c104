//! In-memory collaborators for tests and local runs.
//!
//! Nothing here is shared across processes and all state is lost on exit.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    clients::{
        directory::RecipientDirectory, job_store::JobStateStore, outcome_store::OutcomeStore,
        settings::SettingsStore, template::TemplateCatalog,
    },
    error::{DispatchError, Result},
    models::{
        context::{EndpointSettings, PolicyUrls},
        job::JobState,
        outcome::{DispatchLog, DispatchLogRecord},
        recipient::Recipient,
        template::NotificationTemplate,
    },
};

fn poisoned<T>(_: PoisonError<T>) -> DispatchError {
    DispatchError::Persistence("lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    recipients: HashMap<String, Recipient>,
    lookups: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self {
            recipients: recipients
                .into_iter()
                .map(|recipient| (recipient.id.clone(), recipient))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryDirectory {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Recipient>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        Ok(ids
            .iter()
            .filter_map(|id| self.recipients.get(id).cloned())
            .collect())
    }
}

/// Log store that keeps every bulk write separately so tests can assert on
/// write granularity.
#[derive(Debug, Default)]
pub struct InMemoryOutcomeStore {
    writes: Mutex<Vec<Vec<DispatchLogRecord>>>,
    fail_writes: AtomicBool,
}

impl InMemoryOutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent `insert_all` fails with a persistence error.
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or_default()
    }

    pub fn records(&self) -> Vec<DispatchLogRecord> {
        self.writes
            .lock()
            .map(|w| w.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OutcomeStore for InMemoryOutcomeStore {
    async fn insert_all(&self, records: &[DispatchLogRecord]) -> Result<u64> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DispatchError::Persistence(
                "dispatch log store unavailable".to_string(),
            ));
        }

        self.writes.lock().map_err(poisoned)?.push(records.to_vec());

        Ok(records.len() as u64)
    }

    async fn find_by_job(&self, job_id: Uuid) -> Result<Vec<DispatchLog>> {
        let writes = self.writes.lock().map_err(poisoned)?;

        Ok(writes
            .iter()
            .flatten()
            .enumerate()
            .filter(|(_, record)| record.job_id == job_id)
            .map(|(index, record)| DispatchLog {
                id: index as i64 + 1,
                record: record.clone(),
                created_at: Utc::now(),
            })
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<Uuid, JobState>>,
    saves: AtomicUsize,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStateStore for InMemoryJobStore {
    async fn save(&self, state: &JobState) -> Result<()> {
        self.jobs
            .lock()
            .map_err(poisoned)?
            .insert(state.job_id, state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn load(&self, job_id: Uuid) -> Result<Option<JobState>> {
        Ok(self.jobs.lock().map_err(poisoned)?.get(&job_id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTemplateCatalog {
    templates: HashMap<String, NotificationTemplate>,
}

impl InMemoryTemplateCatalog {
    pub fn new(templates: Vec<NotificationTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|template| (template.developer_name.clone(), template))
                .collect(),
        }
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryTemplateCatalog {
    async fn template(&self, developer_name: &str) -> Result<NotificationTemplate> {
        self.templates
            .get(developer_name)
            .cloned()
            .ok_or_else(|| DispatchError::not_found("template", developer_name))
    }
}

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    endpoints: HashMap<String, EndpointSettings>,
    policy_urls: HashMap<String, PolicyUrls>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, key: impl Into<String>, settings: EndpointSettings) -> Self {
        self.endpoints.insert(key.into(), settings);
        self
    }

    pub fn with_policy_urls(mut self, key: impl Into<String>, urls: PolicyUrls) -> Self {
        self.policy_urls.insert(key.into(), urls);
        self
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn endpoint(&self, key: &str) -> Result<EndpointSettings> {
        self.endpoints
            .get(key)
            .cloned()
            .ok_or_else(|| DispatchError::not_found("messaging endpoint", key))
    }

    async fn policy_urls(&self, key: &str) -> Result<PolicyUrls> {
        self.policy_urls
            .get(key)
            .cloned()
            .ok_or_else(|| DispatchError::not_found("policy URL set", key))
    }
}
