//! Conversation Sessions
//!
//! A session is the private, in-memory state of one interactive chat: the
//! append-only turn log and the sidebar flag. Nothing here is persisted;
//! ending a session drops it.

pub mod store;

pub use store::{SessionHandle, SessionStore};

use chrono::{DateTime, Local, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the log. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
    time: String,
}

impl Turn {
    /// A turn stamped with the current local time
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self::at(role, content, Local::now().time())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    /// `content` is expected to be formatter output (render-safe HTML).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }

    pub fn at(role: Role, content: impl Into<String>, time: NaiveTime) -> Self {
        Self {
            role,
            content: content.into(),
            time: time.format("%H:%M").to_string(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Minute-granularity timestamp, `HH:MM`
    pub fn time(&self) -> &str {
        &self.time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarState {
    #[default]
    Expanded,
    Collapsed,
}

impl SidebarState {
    pub fn toggled(self) -> Self {
        match self {
            SidebarState::Expanded => SidebarState::Collapsed,
            SidebarState::Collapsed => SidebarState::Expanded,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    turns: Vec<Turn>,
    sidebar: SidebarState,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            turns: Vec::new(),
            sidebar: SidebarState::default(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The only way the turn log changes.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn sidebar(&self) -> SidebarState {
        self.sidebar
    }

    pub fn toggle_sidebar(&mut self) -> SidebarState {
        self.sidebar = self.sidebar.toggled();
        self.sidebar
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            sidebar: self.sidebar,
            created_at: self.created_at,
            turns: self.turns.clone(),
        }
    }
}

/// Serializable snapshot of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub sidebar: SidebarState,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_arrival_order() {
        let mut session = Session::new(Uuid::new_v4());
        assert!(session.is_empty());

        for i in 0..7 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            session.append(Turn::now(role, format!("message {i}")));
        }

        assert_eq!(session.len(), 7);
        for (i, turn) in session.turns().iter().enumerate() {
            assert_eq!(turn.content(), format!("message {i}"));
        }
    }

    #[test]
    fn test_earlier_turns_unchanged_by_later_appends() {
        let mut session = Session::new(Uuid::new_v4());
        session.append(Turn::user("ye kya hai"));
        let first = session.turns()[0].clone();

        session.append(Turn::assistant("Yeh ek report hai"));
        session.append(Turn::user("aur?"));

        assert_eq!(session.turns()[0], first);
    }

    #[test]
    fn test_timestamp_is_minute_granularity() {
        let time = NaiveTime::from_hms_opt(9, 5, 59).unwrap();
        let turn = Turn::at(Role::User, "hello", time);
        assert_eq!(turn.time(), "09:05");
        assert_eq!(turn.role(), Role::User);

        let now = Turn::user("hi");
        assert_eq!(now.time().len(), 5);
        assert_eq!(&now.time()[2..3], ":");
    }

    #[test]
    fn test_sidebar_toggle() {
        let mut session = Session::new(Uuid::new_v4());
        assert_eq!(session.sidebar(), SidebarState::Expanded);
        assert_eq!(session.toggle_sidebar(), SidebarState::Collapsed);
        assert_eq!(session.toggle_sidebar(), SidebarState::Expanded);
    }

    #[test]
    fn test_view_serializes_roles_and_times() {
        let mut session = Session::new(Uuid::new_v4());
        session.append(Turn::at(
            Role::Assistant,
            "done",
            NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        ));

        let json = serde_json::to_value(session.view()).unwrap();
        assert_eq!(json["sidebar"], "expanded");
        assert_eq!(json["turns"][0]["role"], "assistant");
        assert_eq!(json["turns"][0]["time"], "23:59");
        assert_eq!(json["turns"][0]["content"], "done");
    }
}
