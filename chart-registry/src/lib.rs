//! # Lazy OCI Chart Registry
//!
//! This crate implements the metadata-serving core of a chart registry
//! speaking the read side of the
//! [OCI Distribution Specification](https://github.com/opencontainers/distribution-spec):
//! manifest GET/HEAD, paginated tag listing, and catalog listing. Charts
//! are materialized lazily: the first request for an absent manifest
//! invokes a [`ChartPreparer`], the result lands in the in-memory
//! [`ManifestStore`], and every later request is served from the cache.
//!
//! ## Features
//!
//! - Manifest serving with `Docker-Content-Digest`, content type and length
//! - Cursor pagination (`last`/`n`) on tag listings, capped catalog listing
//! - On-demand population through a pluggable [`ChartPreparer`], with an
//!   optional per-call deadline
//! - Builder pattern for configuration
//!
//! ## Example
//!
//! ```no_run
//! use chart_registry::{
//!     ChartPreparer, RegistryBuilder, RegistryResult, Repositories, StoredManifest,
//! };
//!
//! /// Serves the same placeholder chart for every request.
//! struct PlaceholderPreparer;
//!
//! #[async_trait::async_trait]
//! impl ChartPreparer for PlaceholderPreparer {
//!     async fn prepare(
//!         &self,
//!         repositories: &mut Repositories,
//!         namespace: &str,
//!         name: &str,
//!         reference: &str,
//!     ) -> RegistryResult<()> {
//!         let repository = format!("{namespace}/{name}");
//!         let reference = if reference.is_empty() { "latest" } else { reference };
//!         if repositories.get(&repository, reference).is_none() {
//!             repositories.insert(
//!                 repository,
//!                 reference,
//!                 StoredManifest::new(
//!                     "application/vnd.oci.image.manifest.v1+json",
//!                     br#"{"schemaVersion":2}"#.as_slice(),
//!                     Vec::new(),
//!                 ),
//!             );
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let app = RegistryBuilder::new().preparer(PlaceholderPreparer).build();
//! // Serve `app` with axum or any tower-compatible server.
//! ```

mod api;
mod catalog;
mod error;
mod manifest;
mod path;
mod prepare;
mod store;

pub use api::RegistryBuilder;
pub use error::{RegistryError, RegistryResult};
pub use prepare::{ChartPreparer, DeadlinePreparer};
pub use store::{ManifestStore, Repositories, StoredManifest};
