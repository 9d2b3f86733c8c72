use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::errors::AssistantResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub ts: DateTime<Utc>,
    pub role: Role,
    pub content: String,
    /// Assistant messages echo the question they answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            ts: Utc::now(),
            role: Role::User,
            content: content.to_string(),
            question: None,
            evidence: Vec::new(),
        }
    }

    pub fn assistant(question: &str, answer: &str, evidence: Vec<String>) -> Self {
        Self {
            ts: Utc::now(),
            role: Role::Assistant,
            content: answer.to_string(),
            question: Some(question.to_string()),
            evidence,
        }
    }
}

/// Append-only log of one chat session. Owned by the session, never shared.
pub struct SessionHistory {
    pub session_id: String,
    entries: Vec<ChatMessage>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// "Start New Chat": drops every message and starts a fresh session id.
    pub fn reset(&mut self) {
        debug!(session = %self.session_id, dropped = self.entries.len(), "session reset");
        self.entries.clear();
        self.session_id = uuid::Uuid::new_v4().to_string();
    }

    /// Writes the transcript as JSON lines.
    pub fn export_jsonl(&self, path: &Path) -> AssistantResult<()> {
        let mut file = std::fs::File::create(path)?;
        for entry in &self.entries {
            writeln!(file, "{}", serde_json::to_string(entry)?)?;
        }
        debug!(path = %path.display(), entries = self.entries.len(), "transcript exported");
        Ok(())
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new()
    }
}
