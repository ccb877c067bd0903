//! API server builder and router

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get};
use serde_json::json;

use crate::error::RegistryError;
use crate::prepare::{ChartPreparer, DeadlinePreparer};
use crate::store::ManifestStore;
use crate::{catalog, manifest, path};

/// Shared state for the request handlers.
#[derive(Clone)]
pub(crate) struct RegistryState {
    pub(crate) store: ManifestStore,
    pub(crate) preparer: Arc<dyn ChartPreparer>,
}

/// Registry builder for configuring and creating the chart registry service
pub struct RegistryBuilder {
    store: ManifestStore,
    preparer: Option<Arc<dyn ChartPreparer>>,
    prepare_timeout: Option<Duration>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("store", &self.store)
            .field("prepare_timeout", &self.prepare_timeout)
            .finish_non_exhaustive()
    }
}

impl RegistryBuilder {
    /// Create a new registry builder
    pub fn new() -> Self {
        Self {
            store: ManifestStore::new(),
            preparer: None,
            prepare_timeout: None,
        }
    }

    /// Use an existing manifest store instead of a fresh empty one.
    ///
    /// Stores are cheaply cloneable handles to the same table; keeping one
    /// lets the embedding application seed or inspect the cache outside
    /// request handling.
    pub fn store(mut self, store: ManifestStore) -> Self {
        self.store = store;
        self
    }

    /// Set the chart preparer invoked to populate missing entries
    pub fn preparer(mut self, preparer: impl ChartPreparer + 'static) -> Self {
        self.preparer = Some(Arc::new(preparer));
        self
    }

    /// Bound every preparer call to a deadline
    ///
    /// An expired deadline fails the triggering request with
    /// `DEADLINE_EXCEEDED`; without one, a stalled preparer stalls the
    /// whole registry for as long as it blocks.
    pub fn prepare_timeout(mut self, deadline: Duration) -> Self {
        self.prepare_timeout = Some(deadline);
        self
    }

    /// Build the registry service
    ///
    /// Returns a Router that can be served with any tower-compatible server
    pub fn build(self) -> Router {
        let preparer = self.preparer.expect("chart preparer must be configured");
        let preparer: Arc<dyn ChartPreparer> = match self.prepare_timeout {
            Some(deadline) => Arc::new(DeadlinePreparer::new(preparer, deadline)),
            None => preparer,
        };

        let state = RegistryState {
            store: self.store,
            preparer,
        };

        Router::new()
            .route("/v2/", get(api_version_check))
            .route("/v2/{*path}", any(dispatch))
            .with_state(state)
    }
}

/// API version check endpoint
///
/// Returns 200 OK to indicate the registry is available
async fn api_version_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({})))
}

/// Classify and serve everything below `/v2/`.
///
/// Repository names span path segments, so the endpoints are told apart by
/// inspecting the whole path rather than with router captures. Paths that
/// match no endpoint are answered 404.
async fn dispatch(State(state): State<RegistryState>, method: Method, uri: Uri) -> Response {
    let result = if path::is_manifest(uri.path()) {
        manifest::manifests(&state, &method, &uri).await
    } else if path::is_tags(uri.path()) {
        manifest::tags(&state, &method, &uri).await
    } else if path::is_catalog(uri.path()) {
        catalog::catalog(&state, &method, &uri).await
    } else {
        Err(RegistryError::PathUnknown(uri.path().to_string()))
    };

    result.unwrap_or_else(|err| err.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryResult;
    use crate::store::Repositories;

    #[derive(Debug)]
    struct NoopPreparer;

    #[async_trait::async_trait]
    impl ChartPreparer for NoopPreparer {
        async fn prepare(
            &self,
            _repositories: &mut Repositories,
            _namespace: &str,
            _name: &str,
            _reference: &str,
        ) -> RegistryResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builder() {
        let _registry = RegistryBuilder::new()
            .store(ManifestStore::new())
            .preparer(NoopPreparer)
            .prepare_timeout(Duration::from_secs(30))
            .build();
    }
}
