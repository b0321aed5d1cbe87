//! Test doubles shared by unit and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::jobs::memory::InMemoryJobStore;
use crate::jobs::store::JobStore;
use crate::llm_client::LlmError;
use crate::matching::embedding::{EmbeddingProvider, EmbeddingVector};
use crate::models::job::JobPosting;

const VOCABULARY: [&str; 16] = [
    "python",
    "aws",
    "cloud",
    "microservices",
    "react",
    "css",
    "javascript",
    "html",
    "typescript",
    "docker",
    "kubernetes",
    "sql",
    "machine",
    "learning",
    "java",
    "design",
];

pub const STUB_DIMENSION: usize = VOCABULARY.len();

/// Bag-of-words embedder over a fixed vocabulary. Deterministic, counts calls.
pub struct StubEmbedder {
    calls: AtomicUsize,
    output_dimension: usize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self::with_dimension_override(STUB_DIMENSION)
    }

    /// Returns vectors of `dimension` components while still reporting
    /// `STUB_DIMENSION`, to exercise dimension validation.
    pub fn with_dimension_override(dimension: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            output_dimension: dimension,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn bag_of_words(text: &str) -> EmbeddingVector {
    let mut vector = vec![0.0; STUB_DIMENSION];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
    {
        if let Some(idx) = VOCABULARY.iter().position(|w| *w == token) {
            vector[idx] += 1.0;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn name(&self) -> &str {
        "stub"
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = bag_of_words(text);
        vector.resize(self.output_dimension, 0.0);
        Ok(vector)
    }
}

/// Provider that always fails, like an unreachable endpoint.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }

    async fn embed(&self, _text: &str) -> Result<EmbeddingVector, LlmError> {
        Err(LlmError::Api {
            status: 503,
            message: "Service unavailable".to_string(),
        })
    }
}

/// Fails only for texts containing `poison`, embeds everything else.
pub struct SelectiveFailingEmbedder {
    pub poison: &'static str,
}

#[async_trait]
impl EmbeddingProvider for SelectiveFailingEmbedder {
    fn name(&self) -> &str {
        "selective"
    }

    fn dimension(&self) -> usize {
        STUB_DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<EmbeddingVector, LlmError> {
        if text.contains(self.poison) {
            return Err(LlmError::EmptyContent);
        }
        Ok(bag_of_words(text))
    }
}

/// In-memory store that remembers the last candidate limit it was asked for.
pub struct RecordingJobStore {
    inner: InMemoryJobStore,
    last_fetch_limit: AtomicUsize,
}

impl RecordingJobStore {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self {
            inner: InMemoryJobStore::new(jobs),
            last_fetch_limit: AtomicUsize::new(0),
        }
    }

    pub fn last_fetch_limit(&self) -> usize {
        self.last_fetch_limit.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStore for RecordingJobStore {
    async fn fetch_candidates(&self, limit: usize) -> Result<Vec<JobPosting>, AppError> {
        self.last_fetch_limit.store(limit, Ordering::SeqCst);
        self.inner.fetch_candidates(limit).await
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<JobPosting>, AppError> {
        self.inner.get_job(job_id).await
    }

    async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<JobPosting>, AppError> {
        self.inner.search(keyword, limit).await
    }

    async fn jobs_missing_embeddings(
        &self,
        after: Option<&str>,
        dimension: usize,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError> {
        self.inner
            .jobs_missing_embeddings(after, dimension, limit)
            .await
    }

    async fn save_embedding(&self, job_id: &str, embedding: &[f32]) -> Result<(), AppError> {
        self.inner.save_embedding(job_id, embedding).await
    }
}

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

/// Small catalog in fetch order: swe-1, fe-2, data-3, blank-4.
pub fn sample_jobs() -> Vec<JobPosting> {
    vec![
        JobPosting {
            id: "swe-1".to_string(),
            job_title: text("Senior Software Engineer"),
            company: text("TechCorp"),
            location: text("Remote"),
            level: text("Senior"),
            job_description: text(
                "Looking for an experienced software engineer with 5+ years in Python, \
                 JavaScript, and cloud technologies. Knowledge of AWS or Azure required.",
            ),
            required_qualifications: text("Python, AWS, cloud deployments"),
            ..Default::default()
        },
        JobPosting {
            id: "fe-2".to_string(),
            job_title: text("Frontend Developer"),
            company: text("WebSolutions"),
            location: text("San Francisco"),
            job_description: text(
                "Frontend developer needed with strong React experience. Must be proficient \
                 in HTML, CSS and modern JavaScript.",
            ),
            preferred_qualifications: text("TypeScript and React design systems"),
            ..Default::default()
        },
        JobPosting {
            id: "data-3".to_string(),
            job_title: text("Data Engineer"),
            company: text("DataFlow"),
            location: text("Portland"),
            job_description: text("Data engineer needed with strong SQL and Python skills."),
            ..Default::default()
        },
        JobPosting {
            id: "blank-4".to_string(),
            salary: text("$90k"),
            ..Default::default()
        },
    ]
}
