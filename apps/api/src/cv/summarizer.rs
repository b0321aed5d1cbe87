//! CV summarization, the condensing step run before embedding.
//!
//! `LlmCvSummarizer` asks the chat deployment for a structured profile.
//! `PassthroughSummarizer` is used when no chat deployment is configured.

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{cv_summary_prompt, CV_SUMMARY_SYSTEM};
use crate::llm_client::LlmClient;

#[async_trait]
pub trait CvSummarizer: Send + Sync {
    async fn summarize(&self, cv_text: &str) -> Result<String, AppError>;
}

pub struct PassthroughSummarizer;

#[async_trait]
impl CvSummarizer for PassthroughSummarizer {
    async fn summarize(&self, cv_text: &str) -> Result<String, AppError> {
        Ok(cv_text.to_string())
    }
}

pub struct LlmCvSummarizer(pub LlmClient);

#[async_trait]
impl CvSummarizer for LlmCvSummarizer {
    async fn summarize(&self, cv_text: &str) -> Result<String, AppError> {
        // Nothing to condense; keep the empty-query short-circuit intact.
        if cv_text.trim().is_empty() {
            return Ok(String::new());
        }

        let summary = self
            .0
            .chat_text(&cv_summary_prompt(cv_text), CV_SUMMARY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Error processing CV: {e}")))?;

        info!(
            "CV summarized: {} chars -> {} chars",
            cv_text.len(),
            summary.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::llm_client::AzureSettings;

    #[tokio::test]
    async fn test_passthrough_returns_input() {
        let text = PassthroughSummarizer.summarize("Rust, Tokio").await.unwrap();
        assert_eq!(text, "Rust, Tokio");
    }

    #[tokio::test]
    async fn test_llm_summarizer_skips_blank_cv() {
        let llm = LlmClient::new(AzureSettings {
            endpoint: "http://localhost:9".to_string(),
            api_key: "key".to_string(),
            api_version: "2024-02-15-preview".to_string(),
            embedding_deployment: "embed".to_string(),
            chat_deployment: Some("gpt-4".to_string()),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        let summary = LlmCvSummarizer(llm).summarize("  \n").await.unwrap();
        assert!(summary.is_empty());
    }
}
