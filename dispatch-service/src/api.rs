use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    clients::{health::HealthChecker, job_store::JobStateStore, outcome_store::OutcomeStore},
    dispatcher::BatchDispatcher,
    models::{
        context::BatchRequest,
        health::HealthStatus,
        job::JobState,
        outcome::DispatchLog,
        response::ApiResponse,
        summary::BatchAccepted,
        validation::validate_batch_request,
    },
};

#[derive(Clone)]
pub struct BatchApi {
    pub dispatcher: BatchDispatcher,
    pub jobs: Arc<dyn JobStateStore>,
    pub outcomes: Arc<dyn OutcomeStore>,
}

pub fn batch_router(state: BatchApi) -> Router {
    Router::new()
        .route("/api/v1/batches", post(submit_batch))
        .route("/api/v1/batches/{job_id}", get(get_batch))
        .route("/api/v1/batches/{job_id}/logs", get(get_batch_logs))
        .with_state(state)
}

pub async fn run_api_server(
    port: u16,
    batch_api: BatchApi,
    health_checker: HealthChecker,
) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(Arc::new(health_checker))
        .merge(batch_router(batch_api))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Dispatch API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    let health = checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Accepts a batch and runs it in the background. Obviously malformed
/// requests are turned away here; everything else is reported through the
/// job state.
async fn submit_batch(
    State(api): State<BatchApi>,
    Json(request): Json<BatchRequest>,
) -> (StatusCode, Json<ApiResponse<BatchAccepted>>) {
    if let Err(e) = validate_batch_request(&request) {
        error!(
            error = %e,
            template_key = %request.template_key,
            requested = request.contact_ids.len(),
            "Batch rejected"
        );
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(e.to_string(), "Batch rejected".to_string())),
        );
    }

    let job_id = Uuid::new_v4();
    let dispatcher = api.dispatcher.clone();

    tokio::spawn(async move {
        let summary = dispatcher.run_job(job_id, request).await;
        info!(
            job_id = %summary.job_id,
            outcome = ?summary.outcome,
            sent = summary.sent,
            failed = summary.failed,
            logged = summary.logged,
            "Batch job finished"
        );
    });

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            BatchAccepted { job_id },
            "Batch accepted".to_string(),
        )),
    )
}

async fn get_batch(
    State(api): State<BatchApi>,
    Path(job_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<JobState>>) {
    match api.jobs.load(job_id).await {
        Ok(Some(state)) => (
            StatusCode::OK,
            Json(ApiResponse::success(state, "Batch found".to_string())),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(
                format!("No batch with id {}", job_id),
                "Batch not found".to_string(),
            )),
        ),
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Failed to load job state");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string(), "Lookup failed".to_string())),
            )
        }
    }
}

async fn get_batch_logs(
    State(api): State<BatchApi>,
    Path(job_id): Path<Uuid>,
) -> (StatusCode, Json<ApiResponse<Vec<DispatchLog>>>) {
    match api.outcomes.find_by_job(job_id).await {
        Ok(logs) => (
            StatusCode::OK,
            Json(ApiResponse::success(logs, "Dispatch logs".to_string())),
        ),
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Failed to load dispatch logs");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string(), "Lookup failed".to_string())),
            )
        }
    }
}
