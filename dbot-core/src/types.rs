//! Core types: user, chat, message, update, handler response and dispatch outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id, username, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    /// First and last name joined by a space; falls back to the username, then the id.
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self
                .username
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
        }
    }
}

/// Chat (channel, group or private) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// A single message with user, chat, content, and optional reply context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub message_type: String,
    pub direction: MessageDirection,
    pub created_at: DateTime<Utc>,
    pub reply_to_message_id: Option<String>,
}

/// Direction of the message (from user or from bot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// What an inbound update carries. Shapes the router does not bind to end up in `Other`.
#[derive(Debug, Clone)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    CallbackQuery {
        user: User,
        chat: Option<Chat>,
        data: Option<String>,
    },
    /// Any other platform event; carries the event name (e.g. `poll`, `unknown`).
    Other(String),
}

/// One inbound event from the chat platform. Immutable once received; `raw` keeps the received payload.
#[derive(Debug, Clone)]
pub struct Update {
    pub id: i64,
    pub kind: UpdateKind,
    pub raw: serde_json::Value,
}

impl Update {
    pub fn new(id: i64, kind: UpdateKind) -> Self {
        Self {
            id,
            kind,
            raw: serde_json::Value::Null,
        }
    }

    /// Wraps a message as a `message` update.
    pub fn from_message(id: i64, message: Message) -> Self {
        Self::new(id, UpdateKind::Message(message))
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    /// The new or edited message, if any.
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => Some(m),
            _ => None,
        }
    }

    /// Message text, or callback data for callback queries. Media captions are not text.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => {
                if m.message_type != "text" || m.content.is_empty() {
                    None
                } else {
                    Some(m.content.as_str())
                }
            }
            UpdateKind::CallbackQuery { data, .. } => data.as_deref(),
            UpdateKind::Other(_) => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => Some(&m.user),
            UpdateKind::CallbackQuery { user, .. } => Some(user),
            UpdateKind::Other(_) => None,
        }
    }

    pub fn chat(&self) -> Option<&Chat> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => Some(&m.chat),
            UpdateKind::CallbackQuery { chat, .. } => chat.as_ref(),
            UpdateKind::Other(_) => None,
        }
    }

    /// Event name as used by the platform (`message`, `edited_message`, `callback_query`, ...).
    pub fn event_type(&self) -> &str {
        match &self.kind {
            UpdateKind::Message(_) => "message",
            UpdateKind::EditedMessage(_) => "edited_message",
            UpdateKind::CallbackQuery { .. } => "callback_query",
            UpdateKind::Other(name) => name.as_str(),
        }
    }
}

/// Result of the handler that matched an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// The update was handled; nothing to report.
    Handled,
    /// The update was handled and this text was sent back; middlewares see it in `after()`.
    Reply(String),
}

/// How a single dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler matched and ran.
    Handled {
        router: String,
        handler: String,
        response: HandlerResponse,
    },
    /// No router/filter matched; the update is dropped.
    Unhandled,
    /// A middleware declined to pass the update on.
    Rejected { middleware: String },
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Converts a transport-specific update type to core [`Update`].
pub trait ToCoreUpdate: Send + Sync {
    fn to_core(&self) -> Update;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>, username: Option<&str>) -> User {
        User {
            id: 42,
            username: username.map(str::to_string),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            is_bot: false,
        }
    }

    fn message(content: &str) -> Message {
        message_of_type(content, "text")
    }

    fn message_of_type(content: &str, message_type: &str) -> Message {
        Message {
            id: "1".to_string(),
            user: user(Some("Ada"), None, None),
            chat: Chat {
                id: 7,
                chat_type: "private".to_string(),
            },
            content: content.to_string(),
            message_type: message_type.to_string(),
            direction: MessageDirection::Incoming,
            created_at: Utc::now(),
            reply_to_message_id: None,
        }
    }

    #[test]
    fn test_full_name_variants() {
        assert_eq!(user(Some("Ada"), Some("Lovelace"), None).full_name(), "Ada Lovelace");
        assert_eq!(user(Some("Ada"), None, None).full_name(), "Ada");
        assert_eq!(user(None, None, Some("ada")).full_name(), "ada");
        assert_eq!(user(None, None, None).full_name(), "42");
    }

    #[test]
    fn test_update_accessors_for_message() {
        let update = Update::from_message(1, message("ping"));
        assert_eq!(update.text(), Some("ping"));
        assert_eq!(update.chat().map(|c| c.id), Some(7));
        assert_eq!(update.user().map(|u| u.id), Some(42));
        assert_eq!(update.event_type(), "message");
    }

    #[test]
    fn test_empty_message_has_no_text() {
        let update = Update::from_message(1, message(""));
        assert!(update.text().is_none());
        assert!(update.message().is_some());
    }

    #[test]
    fn test_caption_is_not_text() {
        let update = Update::from_message(1, message_of_type("ping", "photo"));
        assert!(update.text().is_none());
        assert_eq!(update.message().map(|m| m.content.as_str()), Some("ping"));
    }

    #[test]
    fn test_other_update_has_no_identity() {
        let update = Update::new(9, UpdateKind::Other("poll".to_string()));
        assert!(update.user().is_none());
        assert!(update.chat().is_none());
        assert_eq!(update.event_type(), "poll");
    }
}
