use std::sync::Arc;

use crate::config::Config;
use crate::cv::summarizer::CvSummarizer;
use crate::jobs::store::JobStore;
use crate::matching::embedding::EmbeddingProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Job catalog. Default: PgJobStore; InMemoryJobStore when JOBS_FILE is set.
    pub store: Arc<dyn JobStore>,
    /// Embedding provider, constructed once at startup and injected here.
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// CV condensing step. Pass-through unless a chat deployment is configured.
    pub summarizer: Arc<dyn CvSummarizer>,
    pub config: Config,
}
