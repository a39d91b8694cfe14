//! # Dispatcher
//!
//! Owns the middleware chain and the router set. For each update: middleware `before` in
//! registration order (any false stops the pipeline), then the first matching handler across
//! routers in registration order, then middleware `after` in reverse order.
//!
//! Registration happens at startup only; afterwards the dispatcher is shared read-only
//! (`Arc<Dispatcher>`) and `dispatch` runs concurrently for independent updates.

use std::sync::Arc;

use dbot_core::{
    Bot, DispatchOutcome, FsmContext, Middleware, Result, StateStorage, StorageKey, Update,
    UpdateContext, DEFAULT_DESTINY,
};
use tracing::{debug, error, info, instrument};

use crate::router::{Route, Router};

pub struct Dispatcher {
    middleware: Vec<Arc<dyn Middleware>>,
    routers: Vec<Router>,
    storage: Arc<dyn StateStorage>,
    bot_id: i64,
    destiny: String,
    bot_username: Option<String>,
}

impl Dispatcher {
    /// Creates an empty dispatcher that keeps conversation state in `storage`.
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self {
            middleware: Vec::new(),
            routers: Vec::new(),
            storage,
            bot_id: 0,
            destiny: DEFAULT_DESTINY.to_string(),
            bot_username: None,
        }
    }

    /// Bot id used in state keys.
    pub fn with_bot_id(mut self, bot_id: i64) -> Self {
        self.bot_id = bot_id;
        self
    }

    /// Discriminator used in state keys.
    pub fn with_destiny(mut self, destiny: impl Into<String>) -> Self {
        self.destiny = destiny.into();
        self
    }

    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.set_bot_username(Some(username.into()));
        self
    }

    /// Sets the username commands may mention. Startup only.
    pub fn set_bot_username(&mut self, username: Option<String>) {
        self.bot_username = username;
    }

    /// Appends a middleware to the chain. Startup only.
    pub fn register_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Appends a router to the router set. Startup only.
    pub fn register_router(&mut self, router: Router) {
        self.routers.push(router);
    }

    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    pub fn storage(&self) -> &Arc<dyn StateStorage> {
        &self.storage
    }

    fn build_context(&self, update: Update, bot: Arc<dyn Bot>) -> UpdateContext {
        let state = match (update.chat(), update.user()) {
            (Some(chat), Some(user)) => Some(FsmContext::new(
                self.storage.clone(),
                StorageKey::new(self.bot_id, chat.id, user.id).with_destiny(self.destiny.clone()),
            )),
            _ => None,
        };
        UpdateContext::new(update, bot)
            .with_state(state)
            .with_bot_username(self.bot_username.clone())
    }

    fn resolve<'a>(&'a self, ctx: &UpdateContext) -> Option<Route<'a>> {
        self.routers.iter().find_map(|r| r.resolve(ctx))
    }

    /// Runs one update through the pipeline. A handler or middleware error ends the dispatch
    /// and is returned to the caller; `after` hooks are skipped in that case.
    #[instrument(skip(self, update, bot), fields(update_id = update.id, event = %update.event_type()))]
    pub async fn dispatch(&self, update: Update, bot: Arc<dyn Bot>) -> Result<DispatchOutcome> {
        let mut ctx = self.build_context(update, bot);

        debug!(
            middleware = self.middleware.len(),
            routers = self.routers.len(),
            "step: dispatch started"
        );

        for (index, mw) in self.middleware.iter().enumerate() {
            debug!(middleware = %mw.name(), "step: middleware before");
            if !mw.before(&mut ctx).await? {
                info!(middleware = %mw.name(), "step: middleware before returned false, pipeline stopped");
                let outcome = DispatchOutcome::Rejected {
                    middleware: mw.name().to_string(),
                };
                self.run_after(&self.middleware[..index], &ctx, &outcome)
                    .await?;
                return Ok(outcome);
            }
        }

        let outcome = match self.resolve(&ctx) {
            Some(route) => {
                let handler_name = route.handler.name().to_string();
                info!(router = %route.router, handler = %handler_name, "step: handler matched");
                let response = route.handler.handle(&ctx).await?;
                debug!(handler = %handler_name, response = ?response, "step: handler done");
                DispatchOutcome::Handled {
                    router: route.router.to_string(),
                    handler: handler_name,
                    response,
                }
            }
            None => {
                debug!("step: no handler matched, update dropped");
                DispatchOutcome::Unhandled
            }
        };

        self.run_after(&self.middleware, &ctx, &outcome).await?;
        Ok(outcome)
    }

    async fn run_after(
        &self,
        entered: &[Arc<dyn Middleware>],
        ctx: &UpdateContext,
        outcome: &DispatchOutcome,
    ) -> Result<()> {
        for mw in entered.iter().rev() {
            debug!(middleware = %mw.name(), "step: middleware after");
            mw.after(ctx, outcome).await?;
        }
        Ok(())
    }

    /// Dispatches and swallows failures: a failing handler is logged and its update dropped,
    /// never fatal to the process. Returns `None` on failure.
    pub async fn feed_update(&self, update: Update, bot: Arc<dyn Bot>) -> Option<DispatchOutcome> {
        let update_id = update.id;
        match self.dispatch(update, bot).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(error = %e, update_id = update_id, "Dispatch failed, update dropped");
                None
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("middleware", &self.middleware.len())
            .field("routers", &self.routers)
            .field("bot_id", &self.bot_id)
            .field("destiny", &self.destiny)
            .field("bot_username", &self.bot_username)
            .finish()
    }
}

