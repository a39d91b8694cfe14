//! Handler and Middleware traits and the per-update context they share.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bot::Bot;
use crate::error::Result;
use crate::state::FsmContext;
use crate::types::{DispatchOutcome, HandlerResponse, Update};

/// Everything a middleware or handler sees for one update.
pub struct UpdateContext {
    pub update: Update,
    pub bot: Arc<dyn Bot>,
    /// Conversation state; `None` when the update has no chat or no sender.
    pub state: Option<FsmContext>,
    /// Bot username from `getMe`, used for command mentions.
    pub bot_username: Option<String>,
    /// Values injected by middlewares for later middlewares and the handler.
    pub data: HashMap<String, serde_json::Value>,
}

impl UpdateContext {
    pub fn new(update: Update, bot: Arc<dyn Bot>) -> Self {
        Self {
            update,
            bot,
            state: None,
            bot_username: None,
            data: HashMap::new(),
        }
    }

    pub fn with_state(mut self, state: Option<FsmContext>) -> Self {
        self.state = state;
        self
    }

    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }
}

/// Handles an update selected by a router filter.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in logs and in [`DispatchOutcome::Handled`].
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, ctx: &UpdateContext) -> Result<HandlerResponse>;
}

/// Pipeline stage run before routing. Middlewares run `before` in registration order and `after`
/// in reverse order.
#[async_trait]
pub trait Middleware: Send + Sync {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Observes or transforms the context. Return false to stop the pipeline: later middlewares
    /// and all routers are skipped.
    async fn before(&self, _ctx: &mut UpdateContext) -> Result<bool> {
        Ok(true)
    }

    /// Runs with the final outcome, once the pipeline ends without an error. Only called if this
    /// middleware's `before` returned true: a later middleware returning `Ok(false)` still runs it
    /// (outcome `Rejected`). An error from any `before` or from the handler aborts dispatch, and
    /// no `after` runs.
    async fn after(&self, _ctx: &UpdateContext, _outcome: &DispatchOutcome) -> Result<()> {
        Ok(())
    }
}
