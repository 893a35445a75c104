use std::{collections::HashMap, time::{Duration, Instant}};

use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    clients::database::DatabaseClient,
    models::health::{DependencyHealth, HealthCheckResponse, HealthStatus},
};

const DATABASE: &str = "database";
const TEMPLATE_SERVICE: &str = "template_service";
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub struct HealthChecker {
    database: DatabaseClient,
    http_client: Client,
    template_service_url: String,
}

impl HealthChecker {
    pub fn new(database: DatabaseClient, template_service_url: String) -> Result<Self> {
        Ok(Self {
            database,
            http_client: health_http_client(PROBE_TIMEOUT)?,
            template_service_url: template_service_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        checks.insert(DATABASE.to_string(), self.check_database().await);
        checks.insert(TEMPLATE_SERVICE.to_string(), self.check_template_service().await);

        HealthCheckResponse {
            status: determine_overall_status(&checks),
            timestamp: Utc::now(),
            checks,
        }
    }

    async fn check_database(&self) -> DependencyHealth {
        let start = Instant::now();

        match self.database.health_check().await {
            Ok(_) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "Database health check passed");
                DependencyHealth::healthy(elapsed)
            }
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                DependencyHealth::unhealthy(e.to_string())
            }
        }
    }

    // Never worse than degraded.
    async fn check_template_service(&self) -> DependencyHealth {
        let start = Instant::now();
        let url = format!("{}/health", self.template_service_url);

        match self.http_client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(response_time_ms = elapsed, "Template service health check passed");
                DependencyHealth::healthy(elapsed)
            }
            Ok(response) => {
                warn!(status = %response.status(), "Template service reported unhealthy");
                DependencyHealth::degraded(format!("Returned status {}", response.status()))
            }
            Err(e) => {
                warn!(error = %e, "Template service unreachable");
                DependencyHealth::degraded(format!("Connection failed: {}", e))
            }
        }
    }
}

fn health_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow!("Failed to create health check HTTP client: {}", e))
}

fn determine_overall_status(checks: &HashMap<String, DependencyHealth>) -> HealthStatus {
    let database_unhealthy = checks
        .get(DATABASE)
        .is_some_and(|health| health.status == HealthStatus::Unhealthy);

    let has_degraded = checks
        .values()
        .any(|health| health.status != HealthStatus::Healthy);

    if database_unhealthy {
        HealthStatus::Unhealthy
    } else if has_degraded {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}
