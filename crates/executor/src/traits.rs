//! Executor trait definition.

use crate::error::ExecutorResult;
use crate::types::{BasicCred, ClusterDetails, CreateRequest};
use async_trait::async_trait;

/// Creates and destroys clusters and per-binding credentials.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Create the cluster backing a service instance.
    async fn create_cluster(&self, req: &CreateRequest) -> ExecutorResult<()>;

    /// Delete the cluster backing `instance_id`.
    ///
    /// Fails with `BindingsRemain` without touching the cluster while any
    /// binding-created user still exists.
    async fn delete_cluster(&self, instance_id: &str) -> ExecutorResult<()>;

    /// Create (or return the existing) credential for a binding.
    async fn create_binding(
        &self,
        instance_id: &str,
        bind_id: &str,
        app_id: Option<&str>,
    ) -> ExecutorResult<BasicCred>;

    /// Remove the credential created for a binding.
    async fn delete_binding(&self, instance_id: &str, bind_id: &str) -> ExecutorResult<()>;

    /// Describe the cluster backing `instance_id`.
    async fn cluster_detail(&self, instance_id: &str) -> ExecutorResult<ClusterDetails>;

    /// Short backend name for logs.
    fn kind(&self) -> &'static str;
}
