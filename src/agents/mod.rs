//! Agent System
//!
//! One agent answers questions about one uploaded file:
//!
//! - **Language heuristic**: classifies the question as Romanized Hindi or English
//! - **File Chat Agent**: prompts the model with the document and the question
//! - **Formatter**: turns the raw reply into display HTML
//!
//! ## Turn Overview
//!
//! ```text
//! Question + Document
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Language   │  → Hindi / English
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  File Chat  │  → Raw model reply (or placeholder on failure)
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Formatter  │  → Table or escaped text
//! └─────────────┘
//!      │
//!      ▼
//!  Assistant Turn
//! ```

pub mod file_chat;
pub mod language;

pub use file_chat::FileChatAgent;
pub use language::{is_hindi, Language};

use serde::Serialize;
use tracing::info;

use crate::documents::ExtractedDocument;
use crate::formatter::{format_reply, ReplyKind};
use crate::session::{Session, Turn};

/// What one question-and-answer exchange added to the session
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub language: Language,
    pub reply_kind: ReplyKind,
    pub user_turn: Turn,
    pub assistant_turn: Turn,
}

/// Run one chat turn against `session`.
///
/// The user turn is logged before the model is asked, so a question stays
/// in the log even if answering takes long. Exactly two turns are appended.
pub async fn execute_turn(
    session: &mut Session,
    agent: &FileChatAgent,
    document: &ExtractedDocument,
    question: &str,
) -> TurnOutcome {
    let language = Language::detect(question);
    info!(
        session_id = %session.id(),
        language = ?language,
        "Starting chat turn"
    );

    let user_turn = Turn::user(question);
    session.append(user_turn.clone());

    let reply = agent.answer(document, question, language).await;
    let formatted = format_reply(&reply);

    let assistant_turn = Turn::assistant(formatted.html);
    session.append(assistant_turn.clone());

    info!(
        session_id = %session.id(),
        reply_kind = ?formatted.kind,
        turns = session.len(),
        "Chat turn complete"
    );

    TurnOutcome {
        language,
        reply_kind: formatted.kind,
        user_turn,
        assistant_turn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::file_chat::tests::ScriptedModel;
    use crate::session::Role;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_turn_appends_user_then_formatted_reply() {
        let agent = FileChatAgent::new(
            ScriptedModel::replying("| name | qty |\n|---|---|\n| chai | 2 |"),
            "m",
        );
        let document = ExtractedDocument::from_raw("name qty\nchai 2");
        let mut session = Session::new(Uuid::new_v4());

        let outcome = execute_turn(&mut session, &agent, &document, "kitni chai hai").await;

        assert_eq!(outcome.language, Language::Hindi);
        assert_eq!(outcome.reply_kind, ReplyKind::Table);
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].role(), Role::User);
        assert_eq!(session.turns()[0].content(), "kitni chai hai");
        assert_eq!(session.turns()[1].role(), Role::Assistant);
        assert!(session.turns()[1].content().contains("<td>chai</td>"));
    }

    #[tokio::test]
    async fn test_model_failure_still_appends_two_turns() {
        let agent = FileChatAgent::new(ScriptedModel::failing("boom"), "m");
        let document = ExtractedDocument::from_raw("anything");
        let mut session = Session::new(Uuid::new_v4());

        let outcome = execute_turn(&mut session, &agent, &document, "what is this").await;

        assert_eq!(outcome.language, Language::English);
        assert_eq!(outcome.reply_kind, ReplyKind::Text);
        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[1].content(), "Error processing request");
    }

    #[tokio::test]
    async fn test_turns_accumulate_across_questions() {
        let agent = FileChatAgent::new(ScriptedModel::replying("ok"), "m");
        let document = ExtractedDocument::from_raw("doc");
        let mut session = Session::new(Uuid::new_v4());

        execute_turn(&mut session, &agent, &document, "first").await;
        execute_turn(&mut session, &agent, &document, "second").await;

        let contents: Vec<&str> = session.turns().iter().map(|t| t.content()).collect();
        assert_eq!(contents, vec!["first", "ok", "second", "ok"]);
    }
}
