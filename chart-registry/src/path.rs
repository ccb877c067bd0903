//! Request path classification for the distribution protocol
//!
//! Repository names span multiple path segments (`namespace/name`), so the
//! endpoints cannot be told apart with per-segment router captures; these
//! helpers classify and decompose raw request paths instead.

fn elements(path: &str) -> Vec<&str> {
    path.split('/').skip(1).collect()
}

/// True for `/v2/<name>/manifests/<reference>` shaped paths.
pub(crate) fn is_manifest(path: &str) -> bool {
    let elements = elements(path);
    elements.len() >= 4 && elements[elements.len() - 2] == "manifests"
}

/// True for `/v2/<name>/tags/list` shaped paths.
pub(crate) fn is_tags(path: &str) -> bool {
    let elements = elements(path);
    elements.len() >= 4 && elements[elements.len() - 2] == "tags"
}

/// True for `/v2/_catalog` shaped paths.
pub(crate) fn is_catalog(path: &str) -> bool {
    let elements = elements(path);
    elements.len() >= 2 && elements[elements.len() - 1] == "_catalog"
}

/// Split a manifest path into repository name and reference.
///
/// Callers must have classified the path with [`is_manifest`] first.
pub(crate) fn manifest_target(path: &str) -> (String, String) {
    let elements = elements(path);
    let reference = elements[elements.len() - 1].to_string();
    (join_repository(&elements), reference)
}

/// Extract the repository name from a tags path.
///
/// Callers must have classified the path with [`is_tags`] first.
pub(crate) fn repository_name(path: &str) -> String {
    join_repository(&elements(path))
}

fn join_repository(elements: &[&str]) -> String {
    elements[1..elements.len() - 2].join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_manifest_paths() {
        assert!(is_manifest("/v2/acme/web/manifests/latest"));
        assert!(is_manifest("/v2/acme/web/manifests/sha256:deadbeef"));
        assert!(is_manifest("/v2/solo/manifests/latest"));
        assert!(!is_manifest("/v2/manifests/latest"));
        assert!(!is_manifest("/v2/acme/web/tags/list"));
        assert!(!is_manifest("/v2/"));
    }

    #[test]
    fn classifies_tags_paths() {
        assert!(is_tags("/v2/acme/web/tags/list"));
        assert!(is_tags("/v2/a/b/c/tags/list"));
        assert!(!is_tags("/v2/tags/list"));
        assert!(!is_tags("/v2/acme/web/manifests/latest"));
    }

    #[test]
    fn classifies_catalog_paths() {
        assert!(is_catalog("/v2/_catalog"));
        assert!(!is_catalog("/v2/"));
        assert!(!is_catalog("/v2/acme/web/tags/list"));
        assert!(!is_catalog("/_catalog"));
    }

    #[test]
    fn decomposes_manifest_targets() {
        let (repository, reference) = manifest_target("/v2/acme/web/manifests/latest");
        assert_eq!(repository, "acme/web");
        assert_eq!(reference, "latest");

        let (repository, reference) = manifest_target("/v2/a/b/c/manifests/v1.2.3");
        assert_eq!(repository, "a/b/c");
        assert_eq!(reference, "v1.2.3");

        let (repository, reference) = manifest_target("/v2/solo/manifests/latest");
        assert_eq!(repository, "solo");
        assert_eq!(reference, "latest");
    }

    #[test]
    fn extracts_tags_repositories() {
        assert_eq!(repository_name("/v2/acme/web/tags/list"), "acme/web");
        assert_eq!(repository_name("/v2/a/b/c/tags/list"), "a/b/c");
    }
}
