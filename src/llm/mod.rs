// LLM abstraction layer

pub mod openai_compat;
pub mod provider;

pub use openai_compat::OpenAICompatAdapter;
pub use provider::*;
pub use crate::types::{LLMMessage, LLMRequest, LLMResponse, TokenUsage};
