use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    clients::{
        directory::{RecipientDirectory, resolve_recipients},
        job_store::JobStateStore,
        messaging::MessagingClient,
        outcome_store::OutcomeStore,
        settings::SettingsStore,
        template::TemplateCatalog,
    },
    config::Config,
    error::{DispatchError, Result},
    models::{
        context::{BatchRequest, DispatchContext},
        job::JobState,
        outcome::{DispatchLogRecord, DispatchOutcome},
        payload::MessagePayload,
        recipient::Recipient,
        status::{DispatchStatus, JobPhase},
        summary::BatchSummary,
        validation::validate_batch_request,
    },
};

/// External collaborators of the dispatcher.
#[derive(Clone)]
pub struct Collaborators {
    pub directory: Arc<dyn RecipientDirectory>,
    pub templates: Arc<dyn TemplateCatalog>,
    pub settings: Arc<dyn SettingsStore>,
    pub outcomes: Arc<dyn OutcomeStore>,
    pub jobs: Arc<dyn JobStateStore>,
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub chunk_size: usize,
    pub default_endpoint_key: String,
    pub default_policy_key: String,
}

impl DispatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_size: config.dispatch_chunk_size,
            default_endpoint_key: config.default_endpoint_key.clone(),
            default_policy_key: config.default_policy_key.clone(),
        }
    }
}

/// Drives one batch: start (resolve recipients), execute (per-chunk
/// dispatch), finish (single bulk log write).
#[derive(Clone)]
pub struct BatchDispatcher {
    collaborators: Collaborators,
    messaging: MessagingClient,
    options: DispatchOptions,
}

impl BatchDispatcher {
    pub fn new(
        collaborators: Collaborators,
        messaging: MessagingClient,
        options: DispatchOptions,
    ) -> Self {
        Self {
            collaborators,
            messaging,
            options: DispatchOptions {
                chunk_size: options.chunk_size.max(1),
                ..options
            },
        }
    }

    pub async fn run_batch(&self, request: BatchRequest) -> BatchSummary {
        self.run_job(Uuid::new_v4(), request).await
    }

    /// Never fails. Every error ends the batch at a phase boundary and is
    /// logged; the summary says how far it got.
    pub async fn run_job(&self, job_id: Uuid, request: BatchRequest) -> BatchSummary {
        let span = info_span!("batch", job_id = %job_id, template_key = %request.template_key);

        self.run_phases(job_id, request).instrument(span).await
    }

    async fn run_phases(&self, job_id: Uuid, request: BatchRequest) -> BatchSummary {
        let requested = request.contact_ids.len();
        let template_key = request.template_key.clone();

        info!(requested, "Batch received");

        let context = match self.prepare(request).await {
            Ok(context) => context,
            Err(e) => {
                error!(error = %e, "Batch rejected before start");
                return self
                    .abort(JobState::new(job_id, template_key), requested, e.to_string())
                    .await;
            }
        };

        let mut state = JobState::new(job_id, template_key);

        let recipients = match self.start(&context).await {
            Ok(recipients) => recipients,
            Err(e) => {
                error!(error = %e, "Start phase failed");
                return self.abort(state, requested, e.to_string()).await;
            }
        };

        self.save_state(&state).await;

        let mut outcomes = Vec::with_capacity(recipients.len());
        for chunk in recipients.chunks(self.options.chunk_size) {
            outcomes.extend(self.execute_chunk(&context, &mut state, chunk).await);

            state.advance_to(JobPhase::Executing);
            self.save_state(&state).await;
        }

        let logged = self.finish(job_id, &outcomes).await;

        state.advance_to(JobPhase::Finished);
        self.save_state(&state).await;

        BatchSummary::completed(job_id, requested, &outcomes, logged)
    }

    /// Validates the request, then resolves template, endpoint and policy
    /// URLs. Nothing is dispatched if this fails.
    pub async fn prepare(&self, request: BatchRequest) -> Result<DispatchContext> {
        validate_batch_request(&request)?;

        let template = self
            .collaborators
            .templates
            .template(&request.template_key)
            .await?;

        let endpoint_key = request
            .endpoint_key
            .as_deref()
            .unwrap_or(&self.options.default_endpoint_key);
        let endpoint = self.collaborators.settings.endpoint(endpoint_key).await?;

        let policy_key = request
            .policy_key
            .as_deref()
            .unwrap_or(&self.options.default_policy_key);
        let policy_urls = self.collaborators.settings.policy_urls(policy_key).await?;

        Ok(DispatchContext {
            contact_ids: request.contact_ids,
            template,
            endpoint_url: endpoint.url(),
            destination_url: request.destination_url,
            notification_date: request.notification_date,
            user_names: request.user_names,
            patient_names: request.patient_names,
            policy_urls,
        })
    }

    /// Start phase. An empty resolution is an error: there is nothing to
    /// dispatch and nothing to log.
    pub async fn start(&self, context: &DispatchContext) -> Result<Vec<Recipient>> {
        let recipients =
            resolve_recipients(self.collaborators.directory.as_ref(), &context.contact_ids).await?;

        if recipients.is_empty() {
            return Err(DispatchError::Validation(
                "No recipients resolved for batch".to_string(),
            ));
        }

        info!(resolved = recipients.len(), "Recipients resolved");

        Ok(recipients)
    }

    /// Execute phase for one chunk. Overrides are taken from `state`, whose
    /// cursor must be carried from the previous chunk of the same job.
    pub async fn execute_chunk(
        &self,
        context: &DispatchContext,
        state: &mut JobState,
        chunk: &[Recipient],
    ) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(chunk.len());

        for recipient in chunk {
            let overrides = state.take_overrides(&context.user_names, &context.patient_names);

            let payload = MessagePayload::build(
                recipient,
                overrides.user_name,
                overrides.patient_name,
                &context.template,
                &context.policy_urls,
                &context.destination_url,
                context.notification_date.as_deref(),
            );

            let receipt = self.messaging.send(&context.endpoint_url, &payload).await;

            if receipt.status == DispatchStatus::Failed {
                error!(
                    recipient_id = %recipient.id,
                    status_code = receipt.status_code.unwrap_or(0),
                    provider_status = %receipt.provider_status,
                    error = receipt.error.as_deref().unwrap_or(""),
                    "Notification dispatch failed"
                );
            } else {
                debug!(
                    recipient_id = %recipient.id,
                    message_id = receipt.provider_message_id.as_deref().unwrap_or(""),
                    "Notification dispatched"
                );
            }

            outcomes.push(DispatchOutcome::new(
                recipient.clone(),
                context.template.clone(),
                receipt,
            ));
        }

        outcomes
    }

    /// Finish phase. Writes every outcome in one bulk insert and returns the
    /// number of rows logged.
    pub async fn finish(&self, job_id: Uuid, outcomes: &[DispatchOutcome]) -> usize {
        let logged = if outcomes.is_empty() {
            error!("No dispatch outcomes to log");
            0
        } else {
            let records: Vec<DispatchLogRecord> = outcomes
                .iter()
                .map(|outcome| DispatchLogRecord::from_outcome(job_id, outcome))
                .collect();

            match self.collaborators.outcomes.insert_all(&records).await {
                Ok(rows) => rows as usize,
                Err(e) => {
                    error!(error = %e, records = records.len(), "Failed to write dispatch log");
                    0
                }
            }
        };

        info!(outcomes = outcomes.len(), logged, "Batch complete");

        logged
    }

    async fn abort(
        &self,
        mut state: JobState,
        requested: usize,
        reason: String,
    ) -> BatchSummary {
        state.advance_to(JobPhase::Aborted);
        self.save_state(&state).await;

        BatchSummary::aborted(state.job_id, requested, reason)
    }

    async fn save_state(&self, state: &JobState) {
        if let Err(e) = self.collaborators.jobs.save(state).await {
            warn!(error = %e, phase = state.phase.as_str(), "Failed to persist job state");
        }
    }
}
