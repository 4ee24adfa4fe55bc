//! Capability traits for administrative resources
//!
//! Each capability is a separate trait so a resource only exposes what it
//! supports. Writes go through [`WritePipeline`] and [`run_pipeline`].

use async_trait::async_trait;

use super::repositories::{Page, PageRequest, RepoResult};

/// Staged write: validate, persist, then post-process
#[async_trait]
pub trait WritePipeline<I, E>: Send + Sync
where
    I: Send + Sync + 'static,
    E: Send + 'static,
{
    /// Reject the input before anything is written
    async fn pre_validate(&self, _input: &I) -> RepoResult<()> {
        Ok(())
    }

    /// Write the input and return the stored entity
    async fn persist(&self, input: I) -> RepoResult<E>;

    /// Hook run after a successful write
    async fn post_process(&self, entity: E) -> RepoResult<E> {
        Ok(entity)
    }
}

/// Run the three stages of a write in order, stopping at the first failure
pub async fn run_pipeline<P, I, E>(pipeline: &P, input: I) -> RepoResult<E>
where
    P: WritePipeline<I, E> + ?Sized,
    I: Send + Sync + 'static,
    E: Send + 'static,
{
    pipeline.pre_validate(&input).await?;
    let entity = pipeline.persist(input).await?;
    pipeline.post_process(entity).await
}

#[async_trait]
pub trait Create<E, I>: Send + Sync
where
    I: Send + Sync + 'static,
{
    async fn create(&self, input: I) -> RepoResult<E>;
}

#[async_trait]
pub trait ReadPaged<E, F>: Send + Sync
where
    F: Send + 'static,
{
    async fn read_paged(&self, filter: F, page: PageRequest) -> RepoResult<Page<E>>;
}

#[async_trait]
pub trait ReadByKey<E, K>: Send + Sync
where
    K: Sync + ?Sized,
{
    async fn read_by_key(&self, key: &K) -> RepoResult<E>;
}

#[async_trait]
pub trait Update<E, K, P>: Send + Sync
where
    K: Sync + ?Sized,
    P: Send + Sync + 'static,
{
    async fn update(&self, key: &K, patch: P) -> RepoResult<E>;
}

#[async_trait]
pub trait Delete<K>: Send + Sync
where
    K: Sync + ?Sized,
{
    async fn delete(&self, key: &K) -> RepoResult<()>;
}
