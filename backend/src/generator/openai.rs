//! `OpenAI` chat completions client

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ChatCompletionApi, ChatRequest, GenerationError};
use crate::{http_client, types::AppConfig};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the `OpenAI` chat completions endpoint
pub struct OpenAiClient {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    http_client: ClientWithMiddleware,
}

impl OpenAiClient {
    /// Creates a client from `config`; without an API key every call fails fast
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            http_client: http_client::build(config.http_timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl ChatCompletionApi for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;
        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| GenerationError::MissingApiKey)?;
        bearer.set_sensitive(true);

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_message,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_message,
                },
            ],
            temperature: request.temperature,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(AUTHORIZATION, bearer)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let completion = response.json::<ChatCompletionResponse>().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("No completion text".to_string()))
    }
}
