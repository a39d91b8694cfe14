use async_trait::async_trait;
use dbot_core::{DispatchOutcome, Middleware, Result, UpdateContext};
use tracing::{debug, info, instrument};

/// Logs each update in before() and the dispatch outcome in after(); always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    #[instrument(skip(self, ctx), fields(update_id = ctx.update.id))]
    async fn before(&self, ctx: &mut UpdateContext) -> Result<bool> {
        let user = ctx.update.user();
        info!(
            event = %ctx.update.event_type(),
            user_id = user.map(|u| u.id),
            username = %user.and_then(|u| u.username.as_deref()).unwrap_or("unknown"),
            chat_id = ctx.update.chat().map(|c| c.id),
            text = %ctx.update.text().unwrap_or(""),
            "Received update"
        );
        Ok(true)
    }

    #[instrument(skip(self, ctx, outcome), fields(update_id = ctx.update.id))]
    async fn after(&self, ctx: &UpdateContext, outcome: &DispatchOutcome) -> Result<()> {
        debug!(outcome = ?outcome, "Processed update");
        Ok(())
    }
}
