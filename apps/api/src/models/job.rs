use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// One row of `job_postings_jobposting`.
///
/// Free-text fields are all optional; ingestion fills whatever the source
/// posting carried. `embedding` is written by the backfill task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub job_description: Option<String>,
    pub key_responsibilities: Option<String>,
    pub required_qualifications: Option<String>,
    pub preferred_qualifications: Option<String>,
    pub benefits: Option<String>,
    pub salary: Option<String>,
    pub application_instructions: Option<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl JobPosting {
    /// Text embedded for a candidate posting: title, descriptions,
    /// responsibilities, qualifications and company, space separated.
    /// `None` when the posting has no usable text.
    pub fn embedding_text(&self) -> Option<String> {
        let parts = [
            &self.job_title,
            &self.description,
            &self.job_description,
            &self.key_responsibilities,
            &self.required_qualifications,
            &self.preferred_qualifications,
            &self.company,
        ];
        let text = parts
            .iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!text.is_empty()).then_some(text)
    }

    /// Case-insensitive substring match over the searchable text fields.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        [
            &self.job_title,
            &self.description,
            &self.job_description,
            &self.key_responsibilities,
            &self.required_qualifications,
            &self.preferred_qualifications,
            &self.company,
        ]
        .iter()
        .filter_map(|f| f.as_deref())
        .any(|f| f.to_lowercase().contains(&needle))
    }
}

/// A posting paired with its similarity to the query profile.
#[derive(Debug, Clone)]
pub struct ScoredJob {
    pub job: JobPosting,
    pub score: f64,
}

/// Wire shape shared by the match, lookup and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: String,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub key_responsibilities: Option<String>,
    pub required_qualifications: Option<String>,
    pub preferred_qualifications: Option<String>,
    pub benefits: Option<String>,
    pub salary: Option<String>,
    pub application_instructions: Option<String>,
    pub match_score: Option<f64>,
}

impl From<JobPosting> for JobResponse {
    fn from(job: JobPosting) -> Self {
        JobResponse {
            id: job.id,
            job_title: job.job_title,
            job_description: job.job_description,
            company: job.company,
            location: job.location,
            level: job.level,
            description: job.description,
            key_responsibilities: job.key_responsibilities,
            required_qualifications: job.required_qualifications,
            preferred_qualifications: job.preferred_qualifications,
            benefits: job.benefits,
            salary: job.salary,
            application_instructions: job.application_instructions,
            match_score: None,
        }
    }
}

impl From<ScoredJob> for JobResponse {
    fn from(scored: ScoredJob) -> Self {
        JobResponse {
            match_score: Some(scored.score),
            ..JobResponse::from(scored.job)
        }
    }
}
