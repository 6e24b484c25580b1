//! Query language heuristic
//!
//! Purely lexical: a question counts as Romanized Hindi if its lowercased
//! text contains any keyword as a substring. Words like "layer" or "sky"
//! therefore match too; that behaviour is kept as is.

use serde::Serialize;

pub const HINDI_KEYWORDS: [&str; 10] = [
    "ky", "hai", "kya", "ye", "kaun", "kahan", "karo", "kare", "nahi", "hai kya",
];

pub fn is_hindi(text: &str) -> bool {
    let lowered = text.to_lowercase();
    HINDI_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Hindi,
}

impl Language {
    pub fn detect(text: &str) -> Self {
        if is_hindi(text) {
            Language::Hindi
        } else {
            Language::English
        }
    }

    /// Status line shown while the model is working
    pub fn waiting_label(&self) -> &'static str {
        match self {
            Language::Hindi => "Thinking ..",
            Language::English => "Generating response...",
        }
    }

    /// Placeholder reply when the model call fails
    pub fn request_failed_reply(&self) -> String {
        match self {
            Language::Hindi => "Error processing request (error aagya)".to_string(),
            Language::English => "Error processing request".to_string(),
        }
    }
}
