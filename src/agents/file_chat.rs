//! File Chat Agent
//!
//! Answers one question about one document. The system prompt is rebuilt
//! from scratch on every call and carries the whole document; no earlier
//! turns are sent to the model.

use std::sync::Arc;

use tracing::{error, info};

use crate::agents::language::Language;
use crate::config::LLMConfig;
use crate::documents::ExtractedDocument;
use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMMessage, LLMRequest};

pub const NOT_IN_FILE_HINDI: &str = "File mein ye jankari nahi hai";
pub const NOT_IN_FILE_ENGLISH: &str = "This information isn't in the file";

pub struct FileChatAgent {
    llm: Arc<dyn LLMAdapter>,
    model: String,
}

impl FileChatAgent {
    pub fn new(llm: Arc<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    pub fn from_config(llm: Arc<dyn LLMAdapter>, config: &LLMConfig) -> Self {
        Self::new(llm, config.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The document is embedded verbatim, however large it is.
    pub fn system_prompt(document: &ExtractedDocument) -> String {
        format!(
            "File content:\n\
             {content}\n\
             \n\
             Rules:\n\
             1. Answer in the same language as the question\n\
             2. For Hindi queries (like 'ye kya hai?'), respond in Romanized Hindi\n\
             3. For English queries (like 'what is?') respond in English\n\
             4. Respond in a clear and natural way. If the answer is in table form, use markdown formatting (| col1 | col2 | ... |).\n\
             5. If answer isn't in file, say:\n   \
                - Hindi: \"{hindi}\"\n   \
                - English: \"{english}\"\n",
            content = document.text(),
            hindi = NOT_IN_FILE_HINDI,
            english = NOT_IN_FILE_ENGLISH,
        )
    }

    pub fn build_request(&self, document: &ExtractedDocument, question: &str) -> LLMRequest {
        LLMRequest {
            model: self.model.clone(),
            messages: vec![
                LLMMessage::system(Self::system_prompt(document)),
                LLMMessage::user(question),
            ],
            max_tokens: None,
            temperature: None,
        }
    }

    /// Ask the model, surfacing its error.
    pub async fn try_answer(&self, document: &ExtractedDocument, question: &str) -> AppResult<String> {
        let request = self.build_request(document, question);
        let response = self.llm.create_chat_completion(&request).await?;
        info!(
            reply_len = response.content.len(),
            total_tokens = response.usage.total_tokens,
            "Model replied"
        );
        Ok(response.content)
    }

    /// Ask the model; any failure becomes the placeholder reply for `language`.
    pub async fn answer(
        &self,
        document: &ExtractedDocument,
        question: &str,
        language: Language,
    ) -> String {
        info!(
            question_len = question.len(),
            document_len = document.len(),
            language = ?language,
            "{}",
            language.waiting_label()
        );

        match self.try_answer(document, question).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Model call failed, using placeholder reply");
                language.request_failed_reply()
            }
        }
    }
}
