//! Wraps teloxide::Bot and implements [`dbot_core::Bot`] and [`WebhookApi`]. Production code talks
//! to Telegram; tests can substitute other impls or point the bot at a mock server.

use async_trait::async_trait;
use dbot_core::{parse_message_id, Bot as CoreBot, Chat, DbotError, Message, Result, ToCoreUser, User};
use teloxide::payloads::{SendMessageSetters, SetWebhookSetters};
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode};

use crate::adapters::TelegramUserWrapper;
use crate::registrar::WebhookApi;
use crate::secret::WebhookSecret;

/// Thin wrapper around teloxide::Bot.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

fn bot_error(e: teloxide::RequestError) -> DbotError {
    DbotError::Bot(e.to_string())
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_html(&self, chat: &Chat, html: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn copy_message(&self, chat: &Chat, message: &Message) -> Result<()> {
        let id = parse_message_id(&message.id)?;
        self.bot
            .copy_message(ChatId(chat.id), ChatId(message.chat.id), MessageId(id))
            .await
            .map_err(bot_error)?;
        Ok(())
    }
}

#[async_trait]
impl WebhookApi for TelegramBotAdapter {
    async fn set_webhook(&self, url: &str, secret: &WebhookSecret) -> Result<()> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| DbotError::Webhook(format!("Invalid webhook URL {}: {}", url, e)))?;
        self.bot
            .set_webhook(url)
            .drop_pending_updates(true)
            .secret_token(secret.expose().to_string())
            .await
            .map_err(|e| DbotError::Webhook(e.to_string()))?;
        Ok(())
    }

    async fn get_me(&self) -> Result<User> {
        let me = self.bot.get_me().await.map_err(bot_error)?;
        Ok(TelegramUserWrapper(&me.user).to_core())
    }
}
