//! Plugin discovery.
//!
//! Each plugin crate exports a [`PluginManifest`]: a root name (`handlers`, `middlewares`) and an
//! explicit list of module paths with a loader per module. Discovery runs every loader in sorted
//! path order, so registration order does not depend on how the modules were declared.
//!
//! A loader that fails (error or panic) aborts discovery. A loader that returns `None` is a
//! module without an export: it is reported and skipped.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dbot_core::{DbotError, Middleware};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::dispatcher::Dispatcher;
use crate::router::Router;

/// What a middleware module exports; may be several middlewares.
pub type MiddlewareSet = Vec<Arc<dyn Middleware>>;

type Loader<T> = Box<dyn Fn() -> anyhow::Result<Option<T>> + Send + Sync>;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("failed to load plugin module {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("plugin module {path} panicked while loading")]
    Panicked { path: String },

    #[error("plugin module {0} is declared twice")]
    DuplicatePath(String),
}

impl From<DiscoveryError> for DbotError {
    fn from(e: DiscoveryError) -> Self {
        DbotError::Discovery(e.to_string())
    }
}

pub struct PluginManifest<T> {
    root: String,
    entries: Vec<(String, Loader<T>)>,
}

impl<T> PluginManifest<T> {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Declares a module at `path` (relative to the root). The loader runs once per discovery.
    pub fn register<F>(mut self, path: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<Option<T>> + Send + Sync + 'static,
    {
        self.entries.push((path.into(), Box::new(loader)));
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn full_path(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.root.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Loads every module. Returns the export (or `None`) per full module path, sorted by path.
    #[instrument(skip(self), fields(root = %self.root))]
    pub fn discover(&self) -> Result<BTreeMap<String, Option<T>>, DiscoveryError> {
        let mut ordered: Vec<(String, &Loader<T>)> = self
            .entries
            .iter()
            .map(|(path, loader)| (self.full_path(path), loader))
            .collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut found = BTreeMap::new();
        for (path, loader) in ordered {
            if found.contains_key(&path) {
                return Err(DiscoveryError::DuplicatePath(path));
            }
            let export = match panic::catch_unwind(AssertUnwindSafe(|| loader())) {
                Ok(Ok(export)) => export,
                Ok(Err(source)) => return Err(DiscoveryError::Load { path, source }),
                Err(_) => return Err(DiscoveryError::Panicked { path }),
            };
            found.insert(path, export);
        }
        Ok(found)
    }
}

impl Dispatcher {
    /// Discovers both plugin trees, then registers what they export: middlewares first, then
    /// routers, each in path order. Nothing is registered unless both trees load completely; on
    /// error the dispatcher is dropped.
    pub fn setup(
        mut self,
        middlewares: &PluginManifest<MiddlewareSet>,
        handlers: &PluginManifest<Router>,
    ) -> Result<Self, DiscoveryError> {
        let found_middlewares = middlewares.discover()?;
        let found_routers = handlers.discover()?;

        for (file, export) in found_middlewares {
            match export {
                Some(set) if !set.is_empty() => {
                    for mw in set {
                        info!(middleware = %mw.name(), file = %file, "Middleware loaded");
                        self.register_middleware(mw);
                    }
                }
                _ => warn!(file = %file, "No middleware found in {}", file),
            }
        }

        for (file, export) in found_routers {
            match export {
                Some(router) => {
                    info!(
                        router = %router.name(),
                        handlers = router.handler_count(),
                        file = %file,
                        "Router loaded"
                    );
                    self.register_router(router);
                }
                None => warn!(file = %file, "No router found in {}", file),
            }
        }

        Ok(self)
    }
}
