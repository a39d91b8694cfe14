//! Telegram connection settings: token, API URL override and outbound proxy.

use anyhow::{Context, Result};
use tracing::{error, info};

/// Telegram Bot API access settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub proxy_url: Option<String>,
}

impl TelegramConfig {
    /// Uses the given token; no API URL override, no proxy.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            proxy_url: None,
        }
    }

    /// Builds the teloxide bot. An invalid proxy is an error; an invalid API URL falls back to
    /// the default endpoint.
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        let bot = match &self.proxy_url {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .with_context(|| format!("Invalid PROXY_URL: {}", proxy_url))?;
                let client = teloxide::net::default_reqwest_settings()
                    .proxy(proxy)
                    .build()
                    .context("Failed to build HTTP client")?;
                info!("Using outbound proxy for Bot API");
                teloxide::Bot::with_client(self.bot_token.clone(), client)
            }
            None => teloxide::Bot::new(self.bot_token.clone()),
        };

        Ok(match &self.telegram_api_url {
            Some(url_str) => match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            },
            None => bot,
        })
    }
}

/// Numeric bot id: the part of the token before `:`. Zero when the token has no numeric prefix.
pub fn bot_id_from_token(token: &str) -> i64 {
    token
        .split(':')
        .next()
        .and_then(|id| id.parse().ok())
        .unwrap_or(0)
}
