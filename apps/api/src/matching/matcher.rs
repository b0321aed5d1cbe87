//! CV → job matching pipeline.
//!
//! Build query → embed query → fetch candidates → embed each candidate
//! (reusing stored vectors) → score → sort → truncate.

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::matching::embedding::{embed_or_zero, EmbeddingProvider, EmbeddingVector};
use crate::matching::query::QueryProfile;
use crate::matching::ranker::{rank, Candidate};
use crate::matching::similarity::{is_usable_embedding, is_zero_vector};
use crate::models::job::{JobPosting, ScoredJob};

/// Minimum number of postings pulled from the store per request.
const MIN_CANDIDATES: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct MatchRequest<'a> {
    pub cv_text: &'a str,
    pub interests: Option<&'a str>,
    pub soft_skills: Option<&'a str>,
    pub limit: usize,
}

/// Store rows fetched for a request asking for `limit` matches.
pub fn candidate_fetch_limit(limit: usize) -> usize {
    limit.saturating_mul(3).max(MIN_CANDIDATES)
}

pub async fn find_matches(
    store: &dyn JobStore,
    embedder: &dyn EmbeddingProvider,
    request: MatchRequest<'_>,
) -> Result<Vec<ScoredJob>, AppError> {
    let Some(profile) = QueryProfile::build(request.cv_text, request.interests, request.soft_skills)
    else {
        debug!("No usable query text; skipping embedding");
        return Ok(Vec::new());
    };
    if request.limit == 0 {
        return Ok(Vec::new());
    }

    let query_embedding = embed_or_zero(embedder, profile.text()).await;
    if is_zero_vector(&query_embedding) {
        warn!("Could not generate a usable embedding for the CV; returning no matches");
        return Ok(Vec::new());
    }

    let fetch_limit = candidate_fetch_limit(request.limit);
    let jobs = store.fetch_candidates(fetch_limit).await?;
    if jobs.is_empty() {
        info!("No jobs found in the store (fetch limit {fetch_limit})");
        return Ok(Vec::new());
    }

    let mut candidates = Vec::with_capacity(jobs.len());
    let mut reused = 0usize;
    let mut embedded = 0usize;

    // One provider call at a time; stored vectors skip the call entirely.
    for job in jobs {
        let embedding = match stored_embedding(&job, embedder.dimension()) {
            Some(vector) => {
                reused += 1;
                Some(vector)
            }
            None => match job.embedding_text() {
                Some(text) => {
                    embedded += 1;
                    Some(embed_or_zero(embedder, &text).await)
                }
                None => None,
            },
        };
        candidates.push(Candidate { job, embedding });
    }

    info!(
        candidates = candidates.len(),
        reused, embedded, "Scoring candidate jobs"
    );

    Ok(rank(&query_embedding, candidates, request.limit)?)
}

/// A stored embedding is only trusted when it matches the provider's
/// dimensionality, is finite and is not the zero placeholder.
fn stored_embedding(job: &JobPosting, dimension: usize) -> Option<EmbeddingVector> {
    job.embedding
        .as_ref()
        .filter(|v| is_usable_embedding(v, dimension))
        .cloned()
}
