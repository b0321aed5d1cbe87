use crate::matching::embedding::EmbeddingVector;
use crate::matching::similarity::{cosine_similarity, SimilarityError};
use crate::models::job::{JobPosting, ScoredJob};

/// Matches returned when the caller does not ask for a count.
pub const DEFAULT_LIMIT: usize = 10;

/// A fetched posting together with the vector it will be scored by.
/// `embedding` is `None` when the posting had no text worth embedding.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub job: JobPosting,
    pub embedding: Option<EmbeddingVector>,
}

/// Scores every candidate against `query`, sorts descending and keeps the
/// first `limit`.
///
/// The sort is stable: candidates with equal scores stay in fetch order, so
/// a batch where nothing could be embedded comes back in store order.
pub fn rank(
    query: &[f32],
    candidates: Vec<Candidate>,
    limit: usize,
) -> Result<Vec<ScoredJob>, SimilarityError> {
    let mut scored = candidates
        .into_iter()
        .map(|candidate| {
            let score = match &candidate.embedding {
                Some(embedding) => cosine_similarity(query, embedding)?,
                None => 0.0,
            };
            Ok(ScoredJob {
                job: candidate.job,
                score,
            })
        })
        .collect::<Result<Vec<_>, SimilarityError>>()?;

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);

    Ok(scored)
}
