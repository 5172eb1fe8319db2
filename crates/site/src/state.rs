//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::store::FormStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`; every clone sees the same
/// store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: FormStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: SiteConfig, store: FormStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the submission store.
    #[must_use]
    pub fn store(&self) -> &FormStore {
        &self.inner.store
    }
}
