// CV ↔ job matching: query building, embeddings, cosine scoring, ranking.
// All provider calls go through llm_client via the EmbeddingProvider seam.

pub mod embedding;
pub mod handlers;
pub mod matcher;
pub mod query;
pub mod ranker;
pub mod similarity;
