//! # Handlers tree
//!
//! Sample command handlers: `/id`, `/start`, `echo` and `ping`. [`manifest`] lists the modules
//! discovered at startup, rooted at `handlers`.

mod messages;


use handler_chain::{PluginManifest, Router};

pub use messages::{router as messages_router, EchoHandler, IdHandler, PingHandler, StartHandler};

/// Handler modules in this crate.
pub fn manifest() -> PluginManifest<Router> {
    PluginManifest::new("handlers").register("messages", || Ok(Some(messages::router())))
}
