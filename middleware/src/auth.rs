use async_trait::async_trait;
use dbot_core::{Middleware, Result, UpdateContext};
use tracing::{info, instrument, warn};

/// Stops the pipeline unless the sender is in the allowlist. Updates without a sender are stopped too.
pub struct AuthMiddleware {
    allowed_users: Vec<i64>,
}

impl AuthMiddleware {
    /// Creates a middleware that allows only the given user ids.
    pub fn new(allowed_users: Vec<i64>) -> Self {
        Self { allowed_users }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    fn name(&self) -> &str {
        "auth"
    }

    #[instrument(skip(self, ctx), fields(update_id = ctx.update.id))]
    async fn before(&self, ctx: &mut UpdateContext) -> Result<bool> {
        let Some(user_id) = ctx.update.user().map(|u| u.id) else {
            warn!("Update without sender, pipeline stopped");
            return Ok(false);
        };
        if self.allowed_users.contains(&user_id) {
            info!(user_id = user_id, "User authorized");
            Ok(true)
        } else {
            warn!(user_id = user_id, "Unauthorized access attempt");
            Ok(false)
        }
    }
}
