//! Request bodies and stand-in executors.

use async_trait::async_trait;
use osbridge_executor::{
    BasicCred, ClusterDetails, CreateRequest, Executor, ExecutorError, ExecutorResult,
    MockExecutor,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Plan ID of the published "small" plan.
#[allow(dead_code)]
pub const SMALL_PLAN_ID: &str = "885a1cb6-ca42-43e9-a725-8195918e1343";

#[allow(dead_code)]
pub const INSTANCE_ID: &str = "4b3a5c2e-1f0d-4e5b-9a8c-7d6e5f4a3b2c";

#[allow(dead_code)]
pub const BINDING_ID: &str = "a7cb6bd8-cf67-400f-805c-019e85eac3bf";

#[allow(dead_code)]
pub fn instance_uri(instance_id: &str) -> String {
    format!("/v2/service_instances/{instance_id}")
}

#[allow(dead_code)]
pub fn binding_uri(instance_id: &str, binding_id: &str) -> String {
    format!("/v2/service_instances/{instance_id}/service_bindings/{binding_id}")
}

/// Provision body with both required parameters.
#[allow(dead_code)]
pub fn provision_body(cluster_name: &str, namespace: &str) -> Value {
    json!({
        "service_id": super::server::SERVICE_ID,
        "plan_id": SMALL_PLAN_ID,
        "organization_guid": "org",
        "space_guid": "space",
        "parameters": {"CLUSTERNAME": cluster_name, "NAMESPACE": namespace}
    })
}

#[allow(dead_code)]
pub fn bind_body() -> Value {
    json!({
        "service_id": super::server::SERVICE_ID,
        "plan_id": SMALL_PLAN_ID,
        "bind_resource": {"app_guid": "app-1"}
    })
}

/// Executor whose every call fails with the configured error.
#[allow(dead_code)]
pub struct FailingExecutor {
    pub error: fn() -> ExecutorError,
}

#[async_trait]
impl Executor for FailingExecutor {
    async fn create_cluster(&self, _req: &CreateRequest) -> ExecutorResult<()> {
        Err((self.error)())
    }

    async fn delete_cluster(&self, _instance_id: &str) -> ExecutorResult<()> {
        Err((self.error)())
    }

    async fn create_binding(
        &self,
        _instance_id: &str,
        _bind_id: &str,
        _app_id: Option<&str>,
    ) -> ExecutorResult<BasicCred> {
        Err((self.error)())
    }

    async fn delete_binding(&self, _instance_id: &str, _bind_id: &str) -> ExecutorResult<()> {
        Err((self.error)())
    }

    async fn cluster_detail(&self, _instance_id: &str) -> ExecutorResult<ClusterDetails> {
        Err((self.error)())
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// Mock executor that holds `create_cluster` for one cluster name until released.
#[allow(dead_code)]
pub struct GatedExecutor {
    inner: MockExecutor,
    gated_cluster: String,
    /// Signalled when the gated create reaches the executor.
    pub arrived: Notify,
    /// Lets the gated create continue.
    pub release: Notify,
    cluster_calls: AtomicUsize,
}

#[allow(dead_code)]
impl GatedExecutor {
    pub fn new(gated_cluster: &str) -> Self {
        Self {
            inner: MockExecutor::new(),
            gated_cluster: gated_cluster.to_string(),
            arrived: Notify::new(),
            release: Notify::new(),
            cluster_calls: AtomicUsize::new(0),
        }
    }

    /// Number of create/delete cluster calls that reached the executor.
    pub fn cluster_calls(&self) -> usize {
        self.cluster_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Executor for GatedExecutor {
    async fn create_cluster(&self, req: &CreateRequest) -> ExecutorResult<()> {
        self.cluster_calls.fetch_add(1, Ordering::SeqCst);
        if req.cluster_name == self.gated_cluster {
            self.arrived.notify_one();
            self.release.notified().await;
        }
        self.inner.create_cluster(req).await
    }

    async fn delete_cluster(&self, instance_id: &str) -> ExecutorResult<()> {
        self.cluster_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_cluster(instance_id).await
    }

    async fn create_binding(
        &self,
        instance_id: &str,
        bind_id: &str,
        app_id: Option<&str>,
    ) -> ExecutorResult<BasicCred> {
        self.inner.create_binding(instance_id, bind_id, app_id).await
    }

    async fn delete_binding(&self, instance_id: &str, bind_id: &str) -> ExecutorResult<()> {
        self.inner.delete_binding(instance_id, bind_id).await
    }

    async fn cluster_detail(&self, instance_id: &str) -> ExecutorResult<ClusterDetails> {
        self.inner.cluster_detail(instance_id).await
    }

    fn kind(&self) -> &'static str {
        "gated"
    }
}
