//! Application configuration, loaded once from env.

mod bot_config;


pub use bot_config::BotConfig;
