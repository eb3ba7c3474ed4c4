// src/ai/openai.rs
//
// OpenAI-compatible chat completions client.
//
// One request per call: fixed system prompt, one user prompt, fixed
// temperature and token budget. No retries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::ai::{build_prompt, GenerationError, MessageGenerator, SYSTEM_PROMPT};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 200;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Trimmed text of the first choice, empty when there is none.
    fn first_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct OpenAiMessageGenerator {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiMessageGenerator {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            http_client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MessageGenerator for OpenAiMessageGenerator {
    async fn generate(
        &self,
        name: &str,
        role: &str,
        company: &str,
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(name, role, company);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = self.completions_url();
        info!("Requesting outreach message for {} at {} ({})", name, company, self.model);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Error generating message: {}", e);
                GenerationError::Transport(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Generation endpoint error {}: {}", status, body);
            return Err(GenerationError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let data: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse generation response: {}", e);
            GenerationError::Transport(e)
        })?;

        Ok(data.first_text())
    }
}
