use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::matching::similarity::is_usable_embedding;
use crate::models::job::JobPosting;

/// Job store held entirely in memory, in insertion order.
pub struct InMemoryJobStore {
    jobs: RwLock<Vec<JobPosting>>,
}

impl InMemoryJobStore {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self {
            jobs: RwLock::new(jobs),
        }
    }

    /// Loads a JSON array of postings.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read jobs file {}", path.display()))?;
        let jobs: Vec<JobPosting> = serde_json::from_str(&raw)
            .with_context(|| format!("Jobs file {} is not a JSON array of postings", path.display()))?;
        Ok(Self::new(jobs))
    }

    pub fn len(&self) -> usize {
        self.read().map(|jobs| jobs.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<JobPosting>>, AppError> {
        self.jobs
            .read()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("job store lock poisoned")))
    }

    fn select<F>(&self, limit: usize, predicate: F) -> Result<Vec<JobPosting>, AppError>
    where
        F: Fn(&JobPosting) -> bool,
    {
        Ok(self
            .read()?
            .iter()
            .filter(|job| predicate(job))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn fetch_candidates(&self, limit: usize) -> Result<Vec<JobPosting>, AppError> {
        self.select(limit, |_| true)
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobPosting>, AppError> {
        Ok(self.read()?.iter().find(|job| job.id == job_id).cloned())
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<JobPosting>, AppError> {
        self.select(limit, |job| job.contains_keyword(keyword))
    }

    async fn jobs_missing_embeddings(
        &self,
        after: Option<&str>,
        dimension: usize,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError> {
        let jobs = self.read()?;
        let start = after
            .and_then(|id| jobs.iter().position(|job| job.id == id))
            .map_or(0, |pos| pos + 1);
        Ok(jobs[start..]
            .iter()
            .filter(|job| {
                !job.embedding
                    .as_deref()
                    .is_some_and(|v| is_usable_embedding(v, dimension))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn save_embedding(&self, job_id: &str, embedding: &[f32]) -> Result<(), AppError> {
        let mut jobs = self
            .jobs
            .write()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("job store lock poisoned")))?;
        let job = jobs
            .iter_mut()
            .find(|job| job.id == job_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        job.embedding = Some(embedding.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_jobs;

    #[tokio::test]
    async fn test_fetch_candidates_respects_limit_and_order() {
        let store = InMemoryJobStore::new(sample_jobs());
        let jobs = store.fetch_candidates(2).await.unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["swe-1", "fe-2"]);
        assert_eq!(store.fetch_candidates(100).await.unwrap().len(), store.len());
    }

    #[tokio::test]
    async fn test_search_python_only_returns_python_postings() {
        let store = InMemoryJobStore::new(sample_jobs());
        let jobs = store.search("python", 10).await.unwrap();
        assert!(!jobs.is_empty());
        assert!(jobs.iter().all(|j| j.contains_keyword("python")));
        assert!(jobs.iter().all(|j| j.id != "fe-2"));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_limited() {
        let store = InMemoryJobStore::new(sample_jobs());
        assert_eq!(
            store.search("PYTHON", 10).await.unwrap(),
            store.search("python", 10).await.unwrap()
        );
        assert_eq!(store.search("python", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_job() {
        let store = InMemoryJobStore::new(sample_jobs());
        assert!(store.get_job("fe-2").await.unwrap().is_some());
        assert!(store.get_job("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_embedding() {
        let store = InMemoryJobStore::new(sample_jobs());
        let before = store.jobs_missing_embeddings(None, 2, 100).await.unwrap().len();

        store.save_embedding("swe-1", &[1.0, 0.0]).await.unwrap();
        assert_eq!(
            store.jobs_missing_embeddings(None, 2, 100).await.unwrap().len(),
            before - 1
        );

        let err = store.save_embedding("missing", &[1.0]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unusable_stored_embeddings_count_as_missing() {
        let mut jobs = sample_jobs();
        jobs[0].embedding = Some(vec![1.0, 0.0]);
        jobs[1].embedding = Some(vec![1.0, 0.0, 0.0]);
        jobs[2].embedding = Some(vec![f32::NAN, 1.0]);
        jobs[3].embedding = Some(vec![0.0, 0.0]);
        let store = InMemoryJobStore::new(jobs);

        let missing = store.jobs_missing_embeddings(None, 2, 100).await.unwrap();
        let ids: Vec<_> = missing.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["fe-2", "data-3", "blank-4"]);

        let after = store
            .jobs_missing_embeddings(Some("fe-2"), 2, 100)
            .await
            .unwrap();
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_from_json_file_rejects_non_array() {
        let path = std::env::temp_dir().join(format!("jobs-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"id": "not-an-array"}"#).unwrap();
        assert!(InMemoryJobStore::from_json_file(&path).is_err());

        std::fs::write(&path, r#"[{"id": "a", "job_title": "Data Engineer"}]"#).unwrap();
        let store = InMemoryJobStore::from_json_file(&path).unwrap();
        assert_eq!(store.len(), 1);
        std::fs::remove_file(&path).ok();
    }
}
