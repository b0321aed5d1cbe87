/// LLM Client: the single point of entry for all Azure OpenAI calls.
///
/// No other module may call the provider directly. Chat completions (CV
/// summaries) and embeddings both go through `LlmClient`.
use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

const SUMMARY_MAX_TOKENS: u32 = 2048;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No chat deployment configured")]
    NoChatDeployment,
}

/// Connection settings for one Azure OpenAI resource.
#[derive(Debug, Clone)]
pub struct AzureSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub embedding_deployment: String,
    pub chat_deployment: Option<String>,
    pub timeout: Duration,
}

impl AzureSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.azure_endpoint.clone(),
            api_key: config.azure_api_key.clone(),
            api_version: config.azure_api_version.clone(),
            embedding_deployment: config.embedding_deployment.clone(),
            chat_deployment: config.summary_deployment.clone(),
            timeout: Duration::from_secs(config.embedding_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single provider client shared by all services.
/// Cheap to clone; the underlying `reqwest::Client` is reference counted.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: AzureSettings,
}

impl LlmClient {
    pub fn new(settings: AzureSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn embedding_deployment(&self) -> &str {
        &self.settings.embedding_deployment
    }

    pub fn has_chat_deployment(&self) -> bool {
        self.settings.chat_deployment.is_some()
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!(
            "{}/openai/deployments/{}/{}?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            deployment,
            operation,
            self.settings.api_version
        )
    }

    /// Chat completion against the configured chat deployment.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn chat(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let deployment = self
            .settings
            .chat_deployment
            .as_deref()
            .ok_or(LlmError::NoChatDeployment)?;
        let url = self.deployment_url(deployment, "chat/completions");

        let request_body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.0,
            max_tokens: SUMMARY_MAX_TOKENS,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Chat call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .header("api-key", &self.settings.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Chat API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            let chat_response: ChatResponse = ensure_success(response).await?.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience wrapper returning only the text of the first choice.
    pub async fn chat_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.chat(prompt, system).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    /// Embeds a single text with the embedding deployment. One attempt only;
    /// callers decide how to degrade on failure.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = self.deployment_url(&self.settings.embedding_deployment, "embeddings");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.settings.api_key)
            .json(&EmbeddingRequest { input: [text] })
            .send()
            .await?;

        let body: EmbeddingResponse = ensure_success(response).await?.json().await?;
        first_embedding(body)
    }
}

async fn ensure_success(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message: api_error_message(body),
    })
}

fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

fn first_embedding(response: EmbeddingResponse) -> Result<Vec<f32>, LlmError> {
    response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|v| !v.is_empty())
        .ok_or(LlmError::EmptyContent)
}
