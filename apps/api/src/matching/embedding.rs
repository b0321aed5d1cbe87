//! Embedding provider seam.
//!
//! `AppState` carries an `Arc<dyn EmbeddingProvider>`; production wires in
//! `AzureEmbeddingProvider`, tests inject a deterministic stub.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::llm_client::{LlmClient, LlmError};

pub type EmbeddingVector = Vec<f32>;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider label for logs.
    fn name(&self) -> &str;

    /// Dimensionality every returned vector must have.
    fn dimension(&self) -> usize;

    /// Embeds one text. Errors are returned as-is; see `embed_or_zero` for
    /// the degrading variant used by the matcher.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, LlmError>;
}

/// Azure OpenAI embeddings deployment (e.g. text-embedding-3-small, 1536 dims).
pub struct AzureEmbeddingProvider {
    llm: LlmClient,
    dimension: usize,
}

impl AzureEmbeddingProvider {
    pub fn new(llm: LlmClient, dimension: usize) -> Self {
        Self { llm, dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for AzureEmbeddingProvider {
    fn name(&self) -> &str {
        self.llm.embedding_deployment()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, LlmError> {
        self.llm.embed(text).await
    }
}

/// Embeds `text`, substituting a zero vector of the provider's dimension
/// when the call fails or returns a vector of the wrong size or with
/// non-finite components. A zero vector
/// scores 0.0 against everything, so one failed candidate never aborts a
/// whole ranking.
pub async fn embed_or_zero(provider: &dyn EmbeddingProvider, text: &str) -> EmbeddingVector {
    let expected = provider.dimension();
    match provider.embed(text).await {
        Ok(vector) if vector.len() == expected && vector.iter().all(|x| x.is_finite()) => {
            debug!(provider = provider.name(), dimension = expected, "embedding generated");
            vector
        }
        Ok(vector) => {
            warn!(
                provider = provider.name(),
                expected,
                actual = vector.len(),
                "embedding has unexpected dimension or non-finite values; using zero vector"
            );
            vec![0.0; expected]
        }
        Err(e) => {
            warn!(
                provider = provider.name(),
                snippet = %snippet(text),
                "embedding failed, using zero vector: {e}"
            );
            vec![0.0; expected]
        }
    }
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
