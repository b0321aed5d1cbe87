use std::str::FromStr;

use anyhow::{Context, Result};

use crate::matching::ranker::DEFAULT_LIMIT;

/// Where job postings are read from.
#[derive(Debug, Clone)]
pub enum JobSource {
    Postgres { database_url: String },
    /// JSON array of postings loaded into memory at startup (local runs).
    File { path: String },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub job_source: JobSource,
    pub azure_api_key: String,
    pub azure_endpoint: String,
    pub azure_api_version: String,
    pub embedding_deployment: String,
    /// Chat deployment used to summarize CVs. Summarization is skipped when unset.
    pub summary_deployment: Option<String>,
    pub embedding_dimension: usize,
    pub embedding_timeout_secs: u64,
    pub match_limit: usize,
    pub max_upload_bytes: usize,
    pub backfill_embeddings: bool,
    pub run_migrations: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let job_source = match std::env::var("JOBS_FILE") {
            Ok(path) if !path.trim().is_empty() => JobSource::File { path },
            _ => JobSource::Postgres {
                database_url: require_env("DATABASE_URL")?,
            },
        };

        Ok(Config {
            job_source,
            azure_api_key: require_env("AZURE_OPENAI_API_KEY")?,
            azure_endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
            azure_api_version: require_env("AZURE_OPENAI_API_VERSION")?,
            embedding_deployment: require_env("AZURE_OPENAI_EMBEDDING_DEPLOYMENT")?,
            summary_deployment: std::env::var("AZURE_OPENAI_GPT4_DEPLOYMENT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            embedding_dimension: env_or("EMBEDDING_DIMENSION", 1536)?,
            embedding_timeout_secs: env_or("EMBEDDING_TIMEOUT_SECS", 30)?,
            match_limit: env_or("MATCH_LIMIT", DEFAULT_LIMIT)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            backfill_embeddings: env_or("BACKFILL_EMBEDDINGS", false)?,
            run_migrations: env_or("RUN_MIGRATIONS", false)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T>(key: &str, raw: Option<&str>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{value}'")),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            job_source: JobSource::File {
                path: "jobs.json".to_string(),
            },
            azure_api_key: "test-key".to_string(),
            azure_endpoint: "http://localhost:9".to_string(),
            azure_api_version: "2024-02-15-preview".to_string(),
            embedding_deployment: "text-embedding-3-small".to_string(),
            summary_deployment: None,
            embedding_dimension: crate::testing::STUB_DIMENSION,
            embedding_timeout_secs: 1,
            match_limit: DEFAULT_LIMIT,
            max_upload_bytes: 1024 * 1024,
            backfill_embeddings: false,
            run_migrations: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
