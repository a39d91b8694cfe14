//! # dbot-core
//!
//! Core types and traits for the webhook bot: [`Update`], [`Bot`], [`Handler`], [`Middleware`],
//! [`UpdateContext`], the conversation-state interface ([`StateStorage`], [`FsmContext`]),
//! errors and tracing initialization. Transport-agnostic; used by handler-chain, storage and dbot-telegram.

pub mod bot;
pub mod error;
pub mod handler;
pub mod logger;
pub mod state;
pub mod types;

pub use bot::{escape_html, html_bold, parse_message_id, Bot};
pub use error::{DbotError, HandlerError, Result};
pub use handler::{Handler, Middleware, UpdateContext};
pub use logger::init_tracing;
pub use state::{FsmContext, StateData, StateStorage, StorageKey, DEFAULT_DESTINY};
pub use types::{
    Chat, DispatchOutcome, HandlerResponse, Message, MessageDirection, ToCoreMessage,
    ToCoreUpdate, ToCoreUser, Update, UpdateKind, User,
};
