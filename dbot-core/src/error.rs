//! Error types for the bot core.
//!
//! [`DbotError`] is the top-level error; [`HandlerError`] is used for handler failures.

use thiserror::Error;

/// Top-level error for dbot (storage, bot transport, webhook, discovery, handler).
#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
}

/// Errors produced by handlers and middlewares.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No message in update")]
    NoMessage,

    #[error("Unauthorized access")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, DbotError>;
