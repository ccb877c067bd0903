//! Manifest and tag endpoints

use axum::Json;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::api::RegistryState;
use crate::error::{RegistryError, RegistryResult};
use crate::path;

/// Methods the manifest endpoint understands.
#[derive(Debug, Clone, Copy)]
enum ManifestMethod {
    Get,
    Head,
}

impl ManifestMethod {
    fn from_http(method: &Method) -> RegistryResult<Self> {
        if method == Method::GET {
            Ok(ManifestMethod::Get)
        } else if method == Method::HEAD {
            Ok(ManifestMethod::Head)
        } else {
            Err(RegistryError::MethodUnknown)
        }
    }
}

/// Serve GET/HEAD for a single manifest reference, populating on miss.
///
/// The method check comes first, so rejected methods never touch the store.
/// Both verbs emit the same headers; only GET writes the blob.
pub(crate) async fn manifests(
    state: &RegistryState,
    method: &Method,
    uri: &Uri,
) -> RegistryResult<Response> {
    let verb = ManifestMethod::from_http(method)?;
    let (repository, reference) = path::manifest_target(uri.path());

    let manifest = state
        .store
        .get_or_prepare(state.preparer.as_ref(), &repository, &reference)
        .await?;

    let digest = manifest.digest();
    let headers = [
        (
            header::HeaderName::from_static("docker-content-digest"),
            digest,
        ),
        (header::CONTENT_TYPE, manifest.content_type.clone()),
        (header::CONTENT_LENGTH, manifest.blob.len().to_string()),
    ];

    Ok(match verb {
        ManifestMethod::Get => (StatusCode::OK, headers, manifest.blob).into_response(),
        ManifestMethod::Head => (StatusCode::OK, headers).into_response(),
    })
}

/// Tag list response
#[derive(Debug, serde::Serialize)]
struct TagList {
    name: String,
    tags: Vec<String>,
}

/// Pagination parameters for the tags endpoint.
///
/// `n` stays a string: this endpoint rejects unparsable values itself,
/// unlike the catalog endpoint which silently falls back to its default.
/// The asymmetry is inherited behavior, kept on purpose.
#[derive(Debug, Default, serde::Deserialize)]
struct TagsQuery {
    last: Option<String>,
    n: Option<String>,
}

/// Serve `GET /v2/<name>/tags/list`, refreshing the repository first.
pub(crate) async fn tags(
    state: &RegistryState,
    method: &Method,
    uri: &Uri,
) -> RegistryResult<Response> {
    if method != Method::GET {
        return Err(RegistryError::MethodUnknown);
    }

    let repository = path::repository_name(uri.path());
    let mut tags = state
        .store
        .list_tags(state.preparer.as_ref(), &repository)
        .await?;

    let query: TagsQuery = match uri.query() {
        Some(raw) => serde_urlencoded::from_str(raw)
            .map_err(|err| RegistryError::InvalidPagination(err.to_string()))?,
        None => TagsQuery::default(),
    };

    // Resume strictly after the cursor; a cursor at or past the final tag
    // leaves nothing.
    if let Some(last) = query.last.as_deref().filter(|last| !last.is_empty()) {
        match tags.iter().position(|tag| tag.as_str() > last) {
            Some(index) => {
                tags.drain(..index);
            }
            None => tags.clear(),
        }
    }

    // `n` caps the page, it never pads it.
    if let Some(n) = query.n.as_deref().filter(|n| !n.is_empty()) {
        let n: usize = n
            .parse()
            .map_err(|err| RegistryError::InvalidPagination(format!("{err}")))?;
        if n < tags.len() {
            tags.truncate(n);
        }
    }

    Ok(Json(TagList {
        name: repository,
        tags,
    })
    .into_response())
}
