use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::LLMConfig;
use crate::llm::openai_compat::OpenAICompatAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

/// The remote chat model, as seen by the rest of the crate.
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

const TOGETHER_API_BASE: &str = "https://api.together.xyz/v1";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Known OpenAI-compatible providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Together,
    OpenAI,
    Groq,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Together => write!(f, "together"),
            Provider::OpenAI => write!(f, "openai"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

impl Provider {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "together" => Some(Provider::Together),
            "openai" => Some(Provider::OpenAI),
            "groq" => Some(Provider::Groq),
            _ => None,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Together => TOGETHER_API_BASE,
            Provider::OpenAI => OPENAI_API_BASE,
            Provider::Groq => GROQ_API_BASE,
        }
    }
}

/// Build the adapter described by the configuration.
pub fn create_adapter(config: &LLMConfig) -> AppResult<Arc<dyn LLMAdapter>> {
    let provider = Provider::from_id(&config.provider).ok_or_else(|| {
        AppError::Config(format!("Unsupported LLM provider: {}", config.provider))
    })?;
    let base_url = config
        .api_base
        .as_deref()
        .unwrap_or_else(|| provider.default_base_url());

    if config.api_key.is_empty() {
        warn!(provider = %provider, "No LLM API key configured; model calls will fail");
    }
    info!(provider = %provider, base_url, model = %config.model, "LLM adapter configured");

    let adapter = OpenAICompatAdapter::with_timeout(
        &config.api_key,
        base_url,
        config.timeout_secs.map(Duration::from_secs),
    )?;
    Ok(Arc::new(adapter))
}
