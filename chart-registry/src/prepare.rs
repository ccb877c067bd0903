//! Chart preparation seam
//!
//! Chart synthesis itself (fetching an upstream chart and converting it
//! into manifests) lives outside this crate; [`ChartPreparer`] is the
//! interface the registry needs from it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{RegistryError, RegistryResult};
use crate::store::Repositories;

/// Synthesizes charts into the manifest store on demand.
///
/// The registry calls [`ChartPreparer::prepare`] while holding the store
/// lock and passes the locked table in as `repositories`; implementations
/// insert fully-formed records through it and must not reach the store by
/// any other route. An empty `reference` asks for every known reference of
/// the repository (used by tag listing). The registry learns the outcome
/// only by re-reading the table afterwards, so a successful return that
/// inserted nothing surfaces to the client as not-found.
///
/// Implementations must be idempotent: preparing an already-populated
/// reference again must leave the existing record untouched.
#[async_trait]
pub trait ChartPreparer: Send + Sync {
    /// Populate `repositories` for the chart at `namespace`/`name`.
    async fn prepare(
        &self,
        repositories: &mut Repositories,
        namespace: &str,
        name: &str,
        reference: &str,
    ) -> RegistryResult<()>;
}

#[async_trait]
impl<P> ChartPreparer for Arc<P>
where
    P: ChartPreparer + ?Sized,
{
    async fn prepare(
        &self,
        repositories: &mut Repositories,
        namespace: &str,
        name: &str,
        reference: &str,
    ) -> RegistryResult<()> {
        (**self)
            .prepare(repositories, namespace, name, reference)
            .await
    }
}

/// Decorator that bounds every preparation with a deadline.
///
/// A stalled preparer stalls the whole subsystem, since the store lock
/// stays held for the duration of the call; the deadline caps that stall
/// and fails just the one request with [`RegistryError::DeadlineExceeded`].
#[derive(Debug)]
pub struct DeadlinePreparer<P> {
    inner: P,
    deadline: Duration,
}

impl<P> DeadlinePreparer<P> {
    /// Wrap `inner`, bounding each `prepare` call to `deadline`.
    pub fn new(inner: P, deadline: Duration) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl<P> ChartPreparer for DeadlinePreparer<P>
where
    P: ChartPreparer,
{
    async fn prepare(
        &self,
        repositories: &mut Repositories,
        namespace: &str,
        name: &str,
        reference: &str,
    ) -> RegistryResult<()> {
        tokio::time::timeout(
            self.deadline,
            self.inner.prepare(repositories, namespace, name, reference),
        )
        .await
        .map_err(|_| RegistryError::DeadlineExceeded)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct SleepyPreparer(Duration);

    #[async_trait]
    impl ChartPreparer for SleepyPreparer {
        async fn prepare(
            &self,
            _repositories: &mut Repositories,
            _namespace: &str,
            _name: &str,
            _reference: &str,
        ) -> RegistryResult<()> {
            tokio::time::sleep(self.0).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_off_a_stalled_preparer() {
        let preparer = DeadlinePreparer::new(
            SleepyPreparer(Duration::from_secs(3600)),
            Duration::from_secs(1),
        );
        let mut repositories = Repositories::default();

        let err = preparer
            .prepare(&mut repositories, "acme", "web", "latest")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_preparers_pass_through() {
        let preparer = DeadlinePreparer::new(
            SleepyPreparer(Duration::from_millis(1)),
            Duration::from_secs(1),
        );
        let mut repositories = Repositories::default();

        preparer
            .prepare(&mut repositories, "acme", "web", "latest")
            .await
            .unwrap();
    }
}
