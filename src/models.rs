use std::sync::Arc;

use uuid::Uuid;

use crate::agents::{FileChatAgent, Language, TurnOutcome};
use crate::config::Config;
use crate::documents::{FileKind, LargeFileStager};
use crate::formatter::ReplyKind;
use crate::llm::LLMAdapter;
use crate::session::{SessionStore, SidebarState, Turn};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub agent: Arc<FileChatAgent>,
    pub stager: LargeFileStager,
}

impl AppState {
    /// Wire the shared state around an already-built model adapter.
    pub fn new(config: Config, llm: Arc<dyn LLMAdapter>) -> Self {
        let agent = Arc::new(FileChatAgent::from_config(llm, &config.llm));
        let stager = LargeFileStager::from_config(&config.upload);
        Self {
            config,
            sessions: SessionStore::new(),
            agent,
            stager,
        }
    }
}

// API request/response types

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SidebarResponse {
    pub session_id: Uuid,
    pub sidebar: SidebarState,
}

/// Summary of the file that came with a turn
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileSummary {
    pub name: String,
    pub kind: FileKind,
    pub size: u64,
    pub characters: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub file: FileSummary,
    /// `None` when the request carried no message and only the file was checked.
    pub language: Option<Language>,
    pub reply_kind: Option<ReplyKind>,
    pub turns: Vec<Turn>,
}

impl TurnResponse {
    pub fn validated(session_id: Uuid, file: FileSummary) -> Self {
        Self {
            session_id,
            file,
            language: None,
            reply_kind: None,
            turns: Vec::new(),
        }
    }

    pub fn answered(session_id: Uuid, file: FileSummary, outcome: TurnOutcome) -> Self {
        Self {
            session_id,
            file,
            language: Some(outcome.language),
            reply_kind: Some(outcome.reply_kind),
            turns: vec![outcome.user_turn, outcome.assistant_turn],
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub sessions: usize,
    pub model: String,
}
