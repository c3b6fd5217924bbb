//! In-memory conversation transcript.
//!
//! Append-only: entries are never mutated after insertion, and the only
//! removal primitive keeps the leading welcome entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub is_error: bool,
}

#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: impl Into<String>, sender: Sender, is_error: bool) {
        self.entries.push(ConversationEntry {
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            is_error,
        });
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.append(text, Sender::User, false);
    }

    pub fn append_bot(&mut self, text: impl Into<String>) {
        self.append(text, Sender::Bot, false);
    }

    /// Append a user-facing error message attributed to the bot.
    pub fn append_error(&mut self, text: impl Into<String>) {
        self.append(text, Sender::Bot, true);
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything but the first (welcome) entry.
    pub fn clear_retaining_first(&mut self) {
        self.entries.truncate(1);
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_arrive_in_append_order() {
        let mut log = ConversationLog::new();
        log.append_bot("환영합니다");
        log.append_user("질문");
        log.append_bot("답변");

        let senders: Vec<Sender> = log.entries().iter().map(|e| e.sender).collect();
        assert_eq!(senders, vec![Sender::Bot, Sender::User, Sender::Bot]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().unwrap().text, "답변");
    }

    #[test]
    fn error_entries_are_flagged_and_bot_attributed() {
        let mut log = ConversationLog::new();
        log.append_error("일시적인 오류가 발생했습니다");
        let entry = log.last().unwrap();
        assert!(entry.is_error);
        assert_eq!(entry.sender, Sender::Bot);
    }

    #[test]
    fn clear_keeps_only_the_welcome_entry() {
        let mut log = ConversationLog::new();
        log.append_bot("환영합니다");
        log.append_user("하나");
        log.append_bot("둘");

        log.clear_retaining_first();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].text, "환영합니다");
    }

    #[test]
    fn clear_on_empty_log_is_a_no_op() {
        let mut log = ConversationLog::new();
        log.clear_retaining_first();
        assert!(log.is_empty());
    }

    #[test]
    fn entry_serde_roundtrip() {
        let entry = ConversationEntry {
            text: "안녕하세요".to_string(),
            sender: Sender::User,
            timestamp: Utc::now(),
            is_error: false,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"sender\":\"user\""));
        let back: ConversationEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, "안녕하세요");
        assert_eq!(back.timestamp, entry.timestamp);
    }
}
