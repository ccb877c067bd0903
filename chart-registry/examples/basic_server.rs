//! Basic chart registry server example
//!
//! Run with: cargo run -p chart-registry --example basic_server

use chart_registry::{
    ChartPreparer, RegistryBuilder, RegistryResult, Repositories, StoredManifest,
};

/// Synthesizes a placeholder manifest for whatever chart a client asks for,
/// standing in for a real chart conversion pipeline.
#[derive(Debug)]
struct PlaceholderPreparer;

#[async_trait::async_trait]
impl ChartPreparer for PlaceholderPreparer {
    async fn prepare(
        &self,
        repositories: &mut Repositories,
        namespace: &str,
        name: &str,
        reference: &str,
    ) -> RegistryResult<()> {
        let repository = format!("{namespace}/{name}");
        let reference = if reference.is_empty() { "latest" } else { reference };

        if repositories.get(&repository, reference).is_none() {
            tracing::info!(repository, reference, "synthesizing placeholder chart");
            let manifest = serde_json::json!({
                "schemaVersion": 2,
                "mediaType": "application/vnd.oci.image.manifest.v1+json",
                "config": {
                    "mediaType": "application/vnd.cncf.helm.config.v1+json",
                    "size": 0,
                    "digest": "sha256:0000000000000000000000000000000000000000000000000000000000000000",
                },
                "layers": [],
            });
            repositories.insert(
                repository,
                reference,
                StoredManifest::new(
                    "application/vnd.oci.image.manifest.v1+json",
                    serde_json::to_vec(&manifest).expect("static manifest serializes"),
                    Vec::new(),
                ),
            );
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Build the registry service
    let app = RegistryBuilder::new()
        .preparer(PlaceholderPreparer)
        .prepare_timeout(std::time::Duration::from_secs(30))
        .build();

    // Bind to address
    let addr = "127.0.0.1:5000";
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Chart registry listening on http://{}", addr);
    tracing::info!(
        "Try: curl -i http://{}/v2/charts/demo/manifests/latest",
        addr
    );

    // Serve the registry
    axum::serve(listener, app).await?;

    Ok(())
}
