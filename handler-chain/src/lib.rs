//! # Handler chain
//!
//! Update routing for the webhook bot: [`Filter`]s select updates, [`Router`]s bind filters to
//! handlers, and the [`Dispatcher`] runs the middleware chain and picks the first matching handler.
//! [`PluginManifest`] lists the handler and middleware modules registered at startup.

mod discovery;
mod dispatcher;
mod filter;
mod router;

pub use discovery::{DiscoveryError, MiddlewareSet, PluginManifest};
pub use dispatcher::Dispatcher;
pub use filter::{CommandObject, Filter};
pub use router::{EventKind, Route, Router};

// Integration tests live in tests/dispatcher_test.rs and tests/discovery_test.rs
