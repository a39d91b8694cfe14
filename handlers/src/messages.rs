//! Message handlers and the `messages` router.

use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{html_bold, Handler, HandlerError, HandlerResponse, Message, Result, UpdateContext};
use handler_chain::{Filter, Router};
use tracing::{instrument, warn};

const FALLBACK_REPLY: &str = "Nice try!";

fn message_of(ctx: &UpdateContext) -> Result<&Message> {
    ctx.update.message().ok_or_else(|| HandlerError::NoMessage.into())
}

/// Replies with the sender's user id.
pub struct IdHandler;

#[async_trait]
impl Handler for IdHandler {
    fn name(&self) -> &str {
        "id"
    }

    #[instrument(skip(self, ctx), fields(update_id = ctx.update.id))]
    async fn handle(&self, ctx: &UpdateContext) -> Result<HandlerResponse> {
        let message = message_of(ctx)?;
        let text = format!("Your ID: {}", message.user.id);
        ctx.bot.reply_to(message, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }
}

/// Greets the sender by full name, in bold.
pub struct StartHandler;

#[async_trait]
impl Handler for StartHandler {
    fn name(&self) -> &str {
        "start"
    }

    #[instrument(skip(self, ctx), fields(update_id = ctx.update.id))]
    async fn handle(&self, ctx: &UpdateContext) -> Result<HandlerResponse> {
        let message = message_of(ctx)?;
        let html = format!("Hello, {}!", html_bold(&message.user.full_name()));
        ctx.bot.send_html(&message.chat, &html).await?;
        Ok(HandlerResponse::Reply(html))
    }
}

/// Sends a copy of the message back to its chat; answers "Nice try!" if copying fails.
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    fn name(&self) -> &str {
        "echo"
    }

    #[instrument(skip(self, ctx), fields(update_id = ctx.update.id))]
    async fn handle(&self, ctx: &UpdateContext) -> Result<HandlerResponse> {
        let message = message_of(ctx)?;
        match ctx.bot.copy_message(&message.chat, message).await {
            Ok(()) => Ok(HandlerResponse::Handled),
            Err(e) => {
                warn!(error = %e, "copy_message failed");
                ctx.bot.send_message(&message.chat, FALLBACK_REPLY).await?;
                Ok(HandlerResponse::Reply(FALLBACK_REPLY.to_string()))
            }
        }
    }
}

/// Answers "pong"; answers "Nice try!" if that fails.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    #[instrument(skip(self, ctx), fields(update_id = ctx.update.id))]
    async fn handle(&self, ctx: &UpdateContext) -> Result<HandlerResponse> {
        let message = message_of(ctx)?;
        match ctx.bot.reply_to(message, "pong").await {
            Ok(()) => Ok(HandlerResponse::Reply("pong".to_string())),
            Err(e) => {
                warn!(error = %e, "pong failed");
                ctx.bot.send_message(&message.chat, FALLBACK_REPLY).await?;
                Ok(HandlerResponse::Reply(FALLBACK_REPLY.to_string()))
            }
        }
    }
}

pub fn router() -> Router {
    Router::new("messages")
        .message(Filter::command("id"), Arc::new(IdHandler))
        .message(Filter::command_start(), Arc::new(StartHandler))
        .message(Filter::text("echo"), Arc::new(EchoHandler))
        .message(Filter::text("ping"), Arc::new(PingHandler))
}
