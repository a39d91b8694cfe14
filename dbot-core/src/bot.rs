//! Bot abstraction for outbound messages.
//!
//! [`Bot`] is transport-agnostic; `dbot_telegram::TelegramBotAdapter` implements it via teloxide.

use crate::error::{DbotError, Result};
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Outbound messaging used by handlers. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends an HTML-formatted message to the given chat.
    async fn send_html(&self, chat: &Chat, html: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }
    /// Copies `message` into `chat` without the "forwarded from" header.
    async fn copy_message(&self, chat: &Chat, message: &Message) -> Result<()>;
}

/// Parses a message id string into an i32 (Telegram message ids are 32-bit).
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| DbotError::Bot(format!("Invalid message_id: {}", s)))
}

/// Escapes `&`, `<` and `>` for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps escaped text in `<b>` tags.
pub fn html_bold(text: &str) -> String {
    format!("<b>{}</b>", escape_html(text))
}
