//! # Webhook bot application
//!
//! Wires the state store, the handler and middleware plugin trees, the Telegram webhook and the
//! HTTP server. Config is loaded from env; [`run_bot`] runs the startup sequence and serves.

pub mod cli;
pub mod config;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use config::BotConfig;
pub use runner::{build_app, run_bot, WebhookApp};
