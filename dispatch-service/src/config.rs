use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::{models::retry::RetryConfig, telemetry::LogFormat};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub database_url: String,

    pub template_service_url: String,

    pub default_endpoint_key: String,
    pub default_policy_key: String,

    #[serde(default = "default_chunk_size")]
    pub dispatch_chunk_size: usize,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub retry_backoff_multiplier: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    pub server_port: u16,
}

fn default_chunk_size() -> usize {
    200
}

fn default_http_timeout() -> u64 {
    30
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_initial_retry_delay() -> u64 {
    200
}

fn default_max_retry_delay() -> u64 {
    2000
}

fn default_backoff_multiplier() -> u64 {
    2
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;

        if config.dispatch_chunk_size == 0 {
            return Err(anyhow!("DISPATCH_CHUNK_SIZE must be at least 1"));
        }

        Ok(config)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
            backoff_multiplier: self.retry_backoff_multiplier,
        }
    }
}
