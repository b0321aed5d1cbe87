//! Trait-based access to the job catalog.
//!
//! Default: `PgJobStore` over the `job_postings_jobposting` table.
//! `InMemoryJobStore` serves local runs from a JSON file and backs the tests.
//!
//! `AppState` holds an `Arc<dyn JobStore>`, chosen at startup via config.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::models::job::JobPosting;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Up to `limit` postings in store-defined order, no relevance filtering.
    async fn fetch_candidates(&self, limit: usize) -> Result<Vec<JobPosting>, AppError>;

    async fn get_job(&self, job_id: &str) -> Result<Option<JobPosting>, AppError>;

    /// Postings whose searchable text fields contain `keyword`, ignoring case.
    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<JobPosting>, AppError>;

    /// Postings without a usable stored embedding (missing, not `dimension`
    /// long, non-finite or all zero), in store order, starting after the
    /// posting `after` (keyset pagination for the backfill task).
    async fn jobs_missing_embeddings(
        &self,
        after: Option<&str>,
        dimension: usize,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError>;

    async fn save_embedding(&self, job_id: &str, embedding: &[f32]) -> Result<(), AppError>;
}

const JOB_COLUMNS: &str = "id, job_title, company, location, level, description, \
    job_description, key_responsibilities, required_qualifications, \
    preferred_qualifications, benefits, salary, application_instructions, \
    embedding, metadata";

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn fetch_candidates(&self, limit: usize) -> Result<Vec<JobPosting>, AppError> {
        let jobs = sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings_jobposting ORDER BY id LIMIT $1"
        ))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} candidate jobs (limit {limit})", jobs.len());
        Ok(jobs)
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobPosting>, AppError> {
        let job = sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings_jobposting WHERE id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<JobPosting>, AppError> {
        let pattern = format!("%{}%", escape_like(keyword));
        let jobs = sqlx::query_as::<_, JobPosting>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM job_postings_jobposting
            WHERE job_title ILIKE $1 ESCAPE '\'
               OR description ILIKE $1 ESCAPE '\'
               OR job_description ILIKE $1 ESCAPE '\'
               OR key_responsibilities ILIKE $1 ESCAPE '\'
               OR required_qualifications ILIKE $1 ESCAPE '\'
               OR preferred_qualifications ILIKE $1 ESCAPE '\'
               OR company ILIKE $1 ESCAPE '\'
            ORDER BY id
            LIMIT $2
            "#
        ))
        .bind(pattern)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn jobs_missing_embeddings(
        &self,
        after: Option<&str>,
        dimension: usize,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError> {
        let jobs = sqlx::query_as::<_, JobPosting>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM job_postings_jobposting
            WHERE (embedding IS NULL
                   OR cardinality(embedding) <> $2
                   OR 'NaN'::real = ANY(embedding)
                   OR 'Infinity'::real = ANY(embedding)
                   OR '-Infinity'::real = ANY(embedding)
                   OR 0 = ALL(embedding))
              AND ($1::text IS NULL OR id > $1)
            ORDER BY id
            LIMIT $3
            "#
        ))
        .bind(after)
        .bind(i32::try_from(dimension).unwrap_or(i32::MAX))
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn save_embedding(&self, job_id: &str, embedding: &[f32]) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE job_postings_jobposting SET embedding = $1 WHERE id = $2")
            .bind(embedding)
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Job {job_id} not found")));
        }
        Ok(())
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Escapes LIKE metacharacters so the keyword is matched literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
