//! Catalog endpoint

use axum::Json;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::api::RegistryState;
use crate::error::{RegistryError, RegistryResult};

/// Cap on returned repository names when `n` is absent or unparsable.
const DEFAULT_CATALOG_LIMIT: usize = 10_000;

/// Catalog response
#[derive(Debug, serde::Serialize)]
struct Catalog {
    repositories: Vec<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct CatalogQuery {
    n: Option<String>,
}

/// Serve `GET /v2/_catalog`.
///
/// `n` caps the listing; an unparsable `n` silently falls back to the
/// default cap rather than failing, a known inconsistency with the tags
/// endpoint's strict parsing that is kept as inherited behavior. Names
/// come back in map order and there is no cursor: callers cannot page
/// past the cap.
pub(crate) async fn catalog(
    state: &RegistryState,
    method: &Method,
    uri: &Uri,
) -> RegistryResult<Response> {
    if method != Method::GET {
        return Err(RegistryError::MethodUnknown);
    }

    let query: CatalogQuery = uri
        .query()
        .and_then(|raw| serde_urlencoded::from_str(raw).ok())
        .unwrap_or_default();
    let limit = query
        .n
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_CATALOG_LIMIT);

    let repositories = state.store.list_repositories(limit).await;

    Ok(Json(Catalog { repositories }).into_response())
}
