use std::sync::Arc;

use anyhow::{Error, Result};
use dispatch_service::{
    api::{BatchApi, run_api_server},
    clients::{
        database::DatabaseClient, directory::PostgresDirectory, health::HealthChecker,
        job_store::PostgresJobStore, messaging::MessagingClient,
        outcome_store::PostgresOutcomeStore, settings::PostgresSettingsStore,
        template::TemplateServiceClient,
    },
    config::Config,
    dispatcher::{BatchDispatcher, Collaborators, DispatchOptions},
    telemetry::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing(config.log_format);

    let database = DatabaseClient::connect(&config.database_url).await?;
    database.migrate().await?;

    let jobs = Arc::new(PostgresJobStore::new(database.clone()));
    let outcomes = Arc::new(PostgresOutcomeStore::new(database.clone()));

    let collaborators = Collaborators {
        directory: Arc::new(PostgresDirectory::new(database.clone())),
        templates: Arc::new(TemplateServiceClient::new(&config)?),
        settings: Arc::new(PostgresSettingsStore::new(database.clone())),
        outcomes: outcomes.clone(),
        jobs: jobs.clone(),
    };

    let dispatcher = BatchDispatcher::new(
        collaborators,
        MessagingClient::new(&config)?,
        DispatchOptions::from_config(&config),
    );

    let health_checker = HealthChecker::new(database, config.template_service_url.clone())?;

    info!(
        chunk_size = config.dispatch_chunk_size,
        "Configuration validated, dispatch service starting"
    );

    run_api_server(
        config.server_port,
        BatchApi {
            dispatcher,
            jobs,
            outcomes,
        },
        health_checker,
    )
    .await
}
