//! Router: ordered (event kind, filter, handler) bindings plus nested sub-routers.
//!
//! Bindings are tried in registration order, then sub-routers depth-first in inclusion order.
//! The first match wins.

use std::sync::Arc;

use dbot_core::{Handler, Update, UpdateContext, UpdateKind};

use crate::filter::Filter;

/// Which updates a binding listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Message,
    EditedMessage,
    CallbackQuery,
}

impl EventKind {
    pub fn accepts(&self, update: &Update) -> bool {
        matches!(
            (self, &update.kind),
            (EventKind::Message, UpdateKind::Message(_))
                | (EventKind::EditedMessage, UpdateKind::EditedMessage(_))
                | (EventKind::CallbackQuery, UpdateKind::CallbackQuery { .. })
        )
    }
}

struct Binding {
    kind: EventKind,
    filter: Filter,
    handler: Arc<dyn Handler>,
}

/// A named set of bindings.
pub struct Router {
    name: String,
    bindings: Vec<Binding>,
    sub_routers: Vec<Router>,
}

/// A handler selected for an update, with the name of the router that owns it.
pub struct Route<'a> {
    pub router: &'a str,
    pub handler: &'a Arc<dyn Handler>,
}

impl Router {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
            sub_routers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds a handler for new messages.
    pub fn message(self, filter: Filter, handler: Arc<dyn Handler>) -> Self {
        self.bind(EventKind::Message, filter, handler)
    }

    pub fn edited_message(self, filter: Filter, handler: Arc<dyn Handler>) -> Self {
        self.bind(EventKind::EditedMessage, filter, handler)
    }

    pub fn callback_query(self, filter: Filter, handler: Arc<dyn Handler>) -> Self {
        self.bind(EventKind::CallbackQuery, filter, handler)
    }

    pub fn bind(mut self, kind: EventKind, filter: Filter, handler: Arc<dyn Handler>) -> Self {
        self.bindings.push(Binding {
            kind,
            filter,
            handler,
        });
        self
    }

    /// Nests a router; it is consulted after this router's own bindings.
    pub fn include_router(mut self, router: Router) -> Self {
        self.sub_routers.push(router);
        self
    }

    /// Number of bindings in this router and all sub-routers.
    pub fn handler_count(&self) -> usize {
        self.bindings.len()
            + self
                .sub_routers
                .iter()
                .map(Router::handler_count)
                .sum::<usize>()
    }

    /// First binding whose event kind and filter accept the update.
    pub fn resolve(&self, ctx: &UpdateContext) -> Option<Route<'_>> {
        for binding in &self.bindings {
            if binding.kind.accepts(&ctx.update) && binding.filter.matches(ctx) {
                return Some(Route {
                    router: &self.name,
                    handler: &binding.handler,
                });
            }
        }
        self.sub_routers.iter().find_map(|r| r.resolve(ctx))
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("handlers", &self.handler_count())
            .field("sub_routers", &self.sub_routers.len())
            .finish()
    }
}
