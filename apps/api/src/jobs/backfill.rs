//! Precomputes candidate embeddings so match requests can skip the
//! per-candidate provider call.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::matching::embedding::EmbeddingProvider;
use crate::matching::similarity::is_usable_embedding;

pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BackfillReport {
    pub stored: usize,
    /// Postings with no text to embed.
    pub skipped_empty: usize,
    /// Postings whose provider call failed or returned an unusable vector.
    pub failed: usize,
}

/// Embeds every posting whose stored embedding is missing or unusable for
/// the provider's dimension.
///
/// Walks the unfilled postings once, in store order. Failures are never
/// persisted as zero vectors; the posting stays unfilled and is embedded per
/// request instead.
pub async fn backfill_embeddings(
    store: &dyn JobStore,
    embedder: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<BackfillReport, AppError> {
    let batch_size = batch_size.max(1);
    let mut report = BackfillReport::default();
    let mut cursor: Option<String> = None;
    let dimension = embedder.dimension();

    loop {
        let batch = store
            .jobs_missing_embeddings(cursor.as_deref(), dimension, batch_size)
            .await?;
        if batch.is_empty() {
            break;
        }

        for job in &batch {
            let Some(text) = job.embedding_text() else {
                report.skipped_empty += 1;
                continue;
            };

            match embedder.embed(&text).await {
                Ok(vector) if is_usable_embedding(&vector, dimension) => {
                    store.save_embedding(&job.id, &vector).await?;
                    report.stored += 1;
                }
                Ok(vector) => {
                    warn!(
                        job_id = %job.id,
                        dimension = vector.len(),
                        "Unusable embedding returned; leaving job unfilled"
                    );
                    report.failed += 1;
                }
                Err(e) => {
                    warn!(job_id = %job.id, "Embedding failed during backfill: {e}");
                    report.failed += 1;
                }
            }
        }

        if batch.len() < batch_size {
            break;
        }
        cursor = batch.last().map(|job| job.id.clone());
    }

    info!(
        stored = report.stored,
        skipped_empty = report.skipped_empty,
        failed = report.failed,
        "Embedding backfill finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::memory::InMemoryJobStore;
    use crate::models::job::JobPosting;
    use crate::testing::{
        sample_jobs, FailingEmbedder, SelectiveFailingEmbedder, StubEmbedder, STUB_DIMENSION,
    };

    #[tokio::test]
    async fn test_fills_missing_embeddings() {
        let store = InMemoryJobStore::new(sample_jobs());
        let embedder = StubEmbedder::new();

        let report = backfill_embeddings(&store, &embedder, 2).await.unwrap();

        assert_eq!(report.stored, 3);
        assert_eq!(report.skipped_empty, 1);
        assert_eq!(report.failed, 0);
        let swe = store.get_job("swe-1").await.unwrap().unwrap();
        assert!(swe.embedding.is_some());
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op_for_filled_rows() {
        let store = InMemoryJobStore::new(sample_jobs());
        let embedder = StubEmbedder::new();

        backfill_embeddings(&store, &embedder, 10).await.unwrap();
        let calls_after_first = embedder.calls();
        let report = backfill_embeddings(&store, &embedder, 10).await.unwrap();

        assert_eq!(report.stored, 0);
        assert_eq!(embedder.calls(), calls_after_first);
    }

    #[tokio::test]
    async fn test_provider_failures_are_not_persisted() {
        let store = InMemoryJobStore::new(sample_jobs());

        let report = backfill_embeddings(&store, &FailingEmbedder, 10).await.unwrap();

        assert_eq!(report.stored, 0);
        assert_eq!(report.failed, 3);
        assert_eq!(
            store
                .jobs_missing_embeddings(None, STUB_DIMENSION, 10)
                .await
                .unwrap()
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn test_replaces_stale_and_non_finite_embeddings() {
        let mut jobs = sample_jobs();
        jobs[0].embedding = Some(vec![1.0, 2.0]);
        jobs[1].embedding = Some(vec![f32::NAN; STUB_DIMENSION]);
        let store = InMemoryJobStore::new(jobs);

        let report = backfill_embeddings(&store, &StubEmbedder::new(), 10)
            .await
            .unwrap();

        assert_eq!(report.stored, 3);
        for id in ["swe-1", "fe-2"] {
            let job = store.get_job(id).await.unwrap().unwrap();
            let embedding = job.embedding.unwrap();
            assert!(is_usable_embedding(&embedding, STUB_DIMENSION), "{id}");
        }
    }

    #[tokio::test]
    async fn test_partial_failure_terminates() {
        let jobs: Vec<_> = (0..5)
            .map(|i| JobPosting {
                id: format!("job-{i}"),
                job_title: Some(if i == 0 {
                    "Broken posting".to_string()
                } else {
                    format!("Python role {i}")
                }),
                ..Default::default()
            })
            .collect();
        let store = InMemoryJobStore::new(jobs);
        let embedder = SelectiveFailingEmbedder { poison: "Broken" };

        let report = backfill_embeddings(&store, &embedder, 2).await.unwrap();

        assert_eq!(report.stored, 4);
        let remaining = store
            .jobs_missing_embeddings(None, STUB_DIMENSION, 10)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "job-0");
    }
}
