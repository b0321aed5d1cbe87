use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job::JobResponse;

pub const MAX_SEARCH_LIMIT: usize = 100;

/// Postings containing `keyword` (case-insensitive) in their title,
/// descriptions, responsibilities, qualifications or company.
pub async fn search_jobs_by_keyword(
    keyword: &str,
    limit: usize,
    store: &dyn JobStore,
) -> Result<Vec<JobResponse>, AppError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("keyword cannot be empty".to_string()));
    }
    if limit == 0 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    let jobs = store.search(keyword, limit.min(MAX_SEARCH_LIMIT)).await?;
    Ok(jobs.into_iter().map(JobResponse::from).collect())
}

pub async fn get_job_by_id(job_id: &str, store: &dyn JobStore) -> Result<JobResponse, AppError> {
    store
        .get_job(job_id)
        .await?
        .map(JobResponse::from)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::memory::InMemoryJobStore;
    use crate::models::job::JobPosting;
    use crate::testing::sample_jobs;

    #[tokio::test]
    async fn test_search_python_returns_only_python_postings() {
        let store = InMemoryJobStore::new(sample_jobs());
        let jobs = search_jobs_by_keyword("python", 10, &store).await.unwrap();

        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["swe-1", "data-3"]);
        assert!(jobs.iter().all(|j| j.match_score.is_none()));
    }

    #[tokio::test]
    async fn test_search_limit_is_capped() {
        let jobs: Vec<_> = (0..150)
            .map(|i| JobPosting {
                id: format!("job-{i}"),
                job_title: Some("Rust Engineer".to_string()),
                ..Default::default()
            })
            .collect();
        let store = InMemoryJobStore::new(jobs);

        let found = search_jobs_by_keyword("rust", 1000, &store).await.unwrap();
        assert_eq!(found.len(), MAX_SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn test_search_rejects_blank_keyword_and_zero_limit() {
        let store = InMemoryJobStore::new(sample_jobs());
        assert!(matches!(
            search_jobs_by_keyword("  ", 10, &store).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            search_jobs_by_keyword("python", 0, &store).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_job_by_id_not_found() {
        let store = InMemoryJobStore::new(sample_jobs());
        assert_eq!(get_job_by_id("fe-2", &store).await.unwrap().id, "fe-2");
        assert!(matches!(
            get_job_by_id("nope", &store).await,
            Err(AppError::NotFound(_))
        ));
    }
}
