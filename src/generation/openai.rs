use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::TextGenerator;
use crate::config::GenerationConfig;
use crate::error::{AppError, ExternalError};

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_completion_tokens: config.max_completion_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::ConfigError("OpenAI API key not configured".into()));
        }

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            max_completion_tokens: self.max_completion_tokens,
        };

        debug!("Requesting completion from {} with model {}", self.endpoint, self.model);
        let res = self.http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("unknown status").to_string();
            error!("OpenAI API error: {} {}", status.as_u16(), message);
            return Err(ExternalError::ResponseError { status: status.as_u16(), message }.into());
        }

        // A body that is not a chat completion is treated as an empty reply,
        // which the gateway maps to the fallback recipe.
        let body: ChatResponse = match res.json().await {
            Ok(body) => body,
            Err(e) => {
                error!("Unexpected completion payload: {}", e);
                return Ok(String::new());
            }
        };

        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
