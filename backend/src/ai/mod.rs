// src/ai/mod.rs

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub mod openai;

pub use openai::OpenAiMessageGenerator;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates professional but friendly LinkedIn outreach messages.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },
}

/// Dynamic generator trait object.
pub type DynMessageGenerator = Arc<dyn MessageGenerator>;

/// Anything that can write an outreach message for a lead.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    /// Generate a short outreach message.
    ///
    /// Callers make sure all three inputs are non-empty; implementations do
    /// not check. Returns an empty string when the provider produced no text.
    async fn generate(
        &self,
        name: &str,
        role: &str,
        company: &str,
    ) -> Result<String, GenerationError>;
}

/// User prompt for one lead.
pub fn build_prompt(name: &str, role: &str, company: &str) -> String {
    format!(
        "Write a short, friendly LinkedIn outreach message to {name}, who is a {role} at {company}. \
         Make it casual and under 500 characters."
    )
}

/// Canned generator.
///
/// Lets the form and the API run end to end without a provider key.
pub struct DummyMessageGenerator;

impl DummyMessageGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyMessageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageGenerator for DummyMessageGenerator {
    async fn generate(
        &self,
        name: &str,
        role: &str,
        company: &str,
    ) -> Result<String, GenerationError> {
        Ok(format!(
            "Hi {name}, I came across your work as {role} at {company} and would love to connect!"
        ))
    }
}

/// Factory function to build a message generator from config.
///
/// - `LLM_PROVIDER=dummy` → DummyMessageGenerator
/// - `LLM_PROVIDER=openai` or unset with a key → OpenAiMessageGenerator
/// - no key → DummyMessageGenerator, with a warning
pub fn build_message_generator(cfg: &Config) -> DynMessageGenerator {
    match (cfg.llm_provider.as_deref(), cfg.openai_api_key.as_deref()) {
        (Some("dummy"), _) => {
            info!("Using DummyMessageGenerator (LLM_PROVIDER=dummy)");
            Arc::new(DummyMessageGenerator::new())
        }
        (Some("openai") | None, Some(key)) => {
            info!(
                "Using OpenAiMessageGenerator (model={}, base_url={})",
                cfg.openai_model, cfg.openai_base_url
            );
            Arc::new(OpenAiMessageGenerator::new(
                key.to_string(),
                cfg.openai_base_url.clone(),
                cfg.openai_model.clone(),
            ))
        }
        (Some(other), Some(_)) => {
            warn!("Unknown LLM_PROVIDER '{}'; using DummyMessageGenerator", other);
            Arc::new(DummyMessageGenerator::new())
        }
        _ => {
            warn!("OPENAI_API_KEY not set; using DummyMessageGenerator");
            Arc::new(DummyMessageGenerator::new())
        }
    }
}
