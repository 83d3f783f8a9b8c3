//! Application state management

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::pdf::{DocumentEngine, LopdfEngine};

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: Arc<dyn DocumentEngine>,
}

impl AppState {
    /// Create state backed by the lopdf engine
    pub fn new(config: Config) -> Self {
        Self::with_engine(config, Arc::new(LopdfEngine))
    }

    /// Create state with a specific document engine
    pub fn with_engine(config: Config, engine: Arc<dyn DocumentEngine>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, engine }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document engine
    pub fn engine(&self) -> Arc<dyn DocumentEngine> {
        Arc::clone(&self.inner.engine)
    }

    /// Directory request workspaces are created in
    pub fn workspace_root(&self) -> &Path {
        &self.inner.config.uploads.workspace_root
    }
}
