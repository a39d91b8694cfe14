//! Middlewares tree: logging and an optional user allowlist.
//!
//! [`manifest`] lists the modules discovered at startup, rooted at `middlewares`.

mod auth;
mod logging;

use std::sync::Arc;

use dbot_core::Middleware;
use handler_chain::{MiddlewareSet, PluginManifest};

pub use auth::AuthMiddleware;
pub use logging::LoggingMiddleware;

/// Middleware modules in this crate. `auth` is declared only when `allowed_users` is non-empty.
pub fn manifest(allowed_users: Vec<i64>) -> PluginManifest<MiddlewareSet> {
    let manifest = PluginManifest::new("middlewares").register("logging", || {
        Ok(Some(vec![Arc::new(LoggingMiddleware) as Arc<dyn Middleware>]))
    });
    if allowed_users.is_empty() {
        return manifest;
    }
    manifest.register("auth", move || {
        Ok(Some(vec![
            Arc::new(AuthMiddleware::new(allowed_users.clone())) as Arc<dyn Middleware>
        ]))
    })
}
