//! Bot config: public URL, Telegram connection, state store, server and logging. Loaded from env.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use dbot_telegram::TelegramConfig;

/// Default endpoint path Telegram posts updates to.
pub const DEFAULT_WEBHOOK_PATH: &str = "/tgupdates";

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// APP_BASE_URL: public base URL the webhook is reachable at
    pub base_url: String,
    /// TELEGRAM_API_TOKEN or BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_WEBHOOK_PATH
    pub webhook_path: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// PROXY_URL: outbound proxy for Bot API calls
    pub proxy_url: Option<String>,
    /// STATE_STORE_URL: `memory` or a SQLite location
    pub state_store_url: String,
    /// STATE_DESTINY
    pub state_destiny: String,
    /// LISTEN_ADDR
    pub listen_addr: String,
    /// LOG_FILE
    pub log_file: String,
    /// DISPATCH_TIMEOUT_SECS
    pub dispatch_timeout_secs: Option<u64>,
    /// ALLOWED_USERS: comma-separated user ids; empty disables the allowlist
    pub allowed_users: Vec<i64>,
}

fn parse_user_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("ALLOWED_USERS contains an invalid user id: {}", s))
        })
        .collect()
}

impl BotConfig {
    /// Load from environment variables. `token` overrides TELEGRAM_API_TOKEN / BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("TELEGRAM_API_TOKEN")
                .or_else(|_| env::var("BOT_TOKEN"))
                .map_err(|_| anyhow::anyhow!("TELEGRAM_API_TOKEN (or BOT_TOKEN) not set"))?,
        };
        let base_url = env::var("APP_BASE_URL").map_err(|_| anyhow::anyhow!("APP_BASE_URL not set"))?;
        let webhook_path =
            env::var("TELEGRAM_WEBHOOK_PATH").unwrap_or_else(|_| DEFAULT_WEBHOOK_PATH.to_string());
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let proxy_url = env::var("PROXY_URL").ok().filter(|s| !s.is_empty());
        let state_store_url = env::var("STATE_STORE_URL").unwrap_or_else(|_| "memory".to_string());
        let state_destiny =
            env::var("STATE_DESTINY").unwrap_or_else(|_| dbot_core::DEFAULT_DESTINY.to_string());
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/webhook-bot.log".to_string());
        let dispatch_timeout_secs = match env::var("DISPATCH_TIMEOUT_SECS") {
            Ok(s) => Some(
                s.parse()
                    .with_context(|| format!("DISPATCH_TIMEOUT_SECS is not a number: {}", s))?,
            ),
            Err(_) => None,
        };
        let allowed_users = match env::var("ALLOWED_USERS") {
            Ok(s) => parse_user_ids(&s)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            base_url,
            bot_token,
            webhook_path,
            telegram_api_url,
            proxy_url,
            state_store_url,
            state_destiny,
            listen_addr,
            log_file,
            dispatch_timeout_secs,
            allowed_users,
        })
    }

    /// Validate config: URLs parse, base URL is http(s), path starts with `/`, listen address parses.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("Bot token is empty");
        }
        let base = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("APP_BASE_URL is not a valid URL: {}", self.base_url))?;
        if base.scheme() != "https" && base.scheme() != "http" {
            anyhow::bail!("APP_BASE_URL must be http(s): {}", self.base_url);
        }
        if !self.webhook_path.starts_with('/') {
            anyhow::bail!("TELEGRAM_WEBHOOK_PATH must start with '/': {}", self.webhook_path);
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        self.listen_addr()?;
        if self.dispatch_timeout_secs == Some(0) {
            anyhow::bail!("DISPATCH_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("LISTEN_ADDR is not a socket address: {}", self.listen_addr))
    }

    pub fn dispatch_timeout(&self) -> Option<Duration> {
        self.dispatch_timeout_secs.map(Duration::from_secs)
    }

    /// Telegram connection settings for building the bot.
    pub fn telegram(&self) -> TelegramConfig {
        TelegramConfig {
            bot_token: self.bot_token.clone(),
            telegram_api_url: self.telegram_api_url.clone(),
            proxy_url: self.proxy_url.clone(),
        }
    }
}
