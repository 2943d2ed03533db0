//! Application state management.

use std::sync::Arc;

use smp_cache::MetadataProvider;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of validated aggregates.
    pub provider: Arc<dyn MetadataProvider>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Returns the metadata provider.
    pub fn provider(&self) -> &dyn MetadataProvider {
        self.provider.as_ref()
    }
}
