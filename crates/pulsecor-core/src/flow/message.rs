//! Chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSender {
    Cora,
    User,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::Cora => "Cora",
            MessageSender::User => "User",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Cora" => MessageSender::Cora,
            _ => MessageSender::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    QuickReply,
    /// Gentle nudges injected by the app rather than the dialogue.
    SystemInfo,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::QuickReply => "quick_reply",
            MessageType::SystemInfo => "system_info",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "quick_reply" => MessageType::QuickReply,
            "system_info" => MessageType::SystemInfo,
            _ => MessageType::Text,
        }
    }
}

/// One chat bubble, persisted append-only per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Option<i64>,
    pub session_id: String,
    pub sender: MessageSender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub message_type: MessageType,
    /// Quick-reply buttons offered alongside this message, if any.
    pub quick_replies: Vec<String>,
}

impl ChatMessage {
    pub fn cora(session_id: &str, content: &str, quick_replies: Vec<String>) -> Self {
        let message_type = if quick_replies.is_empty() {
            MessageType::Text
        } else {
            MessageType::QuickReply
        };
        Self {
            id: None,
            session_id: session_id.to_string(),
            sender: MessageSender::Cora,
            content: content.to_string(),
            timestamp: Utc::now(),
            message_type,
            quick_replies,
        }
    }

    pub fn user(session_id: &str, content: &str) -> Self {
        Self {
            id: None,
            session_id: session_id.to_string(),
            sender: MessageSender::User,
            content: content.to_string(),
            timestamp: Utc::now(),
            message_type: MessageType::Text,
            quick_replies: Vec::new(),
        }
    }

    pub fn system(session_id: &str, content: &str) -> Self {
        Self {
            id: None,
            session_id: session_id.to_string(),
            sender: MessageSender::Cora,
            content: content.to_string(),
            timestamp: Utc::now(),
            message_type: MessageType::SystemInfo,
            quick_replies: Vec::new(),
        }
    }
}
