//! # dbot-telegram
//!
//! Telegram layer for the webhook bot: teloxide adapters, the [`dbot_core::Bot`] implementation,
//! webhook secret issuance and registration, and the axum routes that receive updates.

mod adapters;
mod bot_adapter;
mod config;
mod registrar;
mod secret;
mod server;

pub use adapters::{parse_update, TelegramMessageWrapper, TelegramUpdateWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::{bot_id_from_token, TelegramConfig};
pub use registrar::{compute_webhook_url, register_webhook, WebhookApi};
pub use secret::{WebhookSecret, SECRET_HEADER};
pub use server::{webhook_router, AppContext};
