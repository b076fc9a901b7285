//! In-memory executor.
//!
//! Keeps instances and bindings in memory and never touches the network.
//! Credentials are derived deterministically from the binding ID so tests
//! can predict them.

use crate::error::{ExecutorError, ExecutorResult};
use crate::traits::Executor;
use crate::types::{BasicCred, ClusterDetails, CreateRequest};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// External address reported for every mock cluster (RFC 5737 TEST-NET-2).
pub const MOCK_EXTERNAL_IP: &str = "198.51.100.42";

/// Cluster-internal address reported for every mock cluster.
pub const MOCK_CLUSTER_IP: &str = "10.10.33.44";

/// Database name reported for every mock cluster.
pub const MOCK_DATABASE: &str = "userdb";

/// Password issued for every mock binding.
pub const MOCK_PASSWORD: &str = "WaltSentMe";

#[derive(Default)]
struct MockState {
    instances: HashMap<String, ClusterDetails>,
    /// Keyed by (instance ID, binding ID).
    bindings: HashMap<(String, String), BasicCred>,
}

/// In-memory [`Executor`] for development and tests.
#[derive(Default)]
pub struct MockExecutor {
    state: RwLock<MockState>,
}

impl MockExecutor {
    /// Create an empty mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Username the mock issues for `bind_id`.
    pub fn username_for(bind_id: &str) -> String {
        let digest = Sha256::digest(bind_id.as_bytes());
        format!("user_{}", hex::encode(&digest[..16]))
    }

    /// Number of live bindings on `instance_id`.
    pub async fn binding_count(&self, instance_id: &str) -> usize {
        let state = self.state.read().await;
        state
            .bindings
            .keys()
            .filter(|(inst, _)| inst == instance_id)
            .count()
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn create_cluster(&self, req: &CreateRequest) -> ExecutorResult<()> {
        let mut state = self.state.write().await;
        state.instances.insert(
            req.instance_id.clone(),
            ClusterDetails {
                name: req.cluster_name.clone(),
                cluster_name: req.cluster_name.clone(),
                cluster_ip: MOCK_CLUSTER_IP.to_string(),
                external_ip: MOCK_EXTERNAL_IP.to_string(),
                database: MOCK_DATABASE.to_string(),
            },
        );
        debug!(instance_id = %req.instance_id, "Mock cluster created");
        Ok(())
    }

    async fn delete_cluster(&self, instance_id: &str) -> ExecutorResult<()> {
        let mut state = self.state.write().await;
        if !state.instances.contains_key(instance_id) {
            return Err(ExecutorError::InstanceNotFound(instance_id.to_string()));
        }
        if state.bindings.keys().any(|(inst, _)| inst == instance_id) {
            return Err(ExecutorError::BindingsRemain(instance_id.to_string()));
        }
        state.instances.remove(instance_id);
        debug!(instance_id = %instance_id, "Mock cluster deleted");
        Ok(())
    }

    async fn create_binding(
        &self,
        instance_id: &str,
        bind_id: &str,
        _app_id: Option<&str>,
    ) -> ExecutorResult<BasicCred> {
        let mut state = self.state.write().await;
        if !state.instances.contains_key(instance_id) {
            return Err(ExecutorError::InstanceNotFound(instance_id.to_string()));
        }
        let cred = state
            .bindings
            .entry((instance_id.to_string(), bind_id.to_string()))
            .or_insert_with(|| BasicCred {
                username: Self::username_for(bind_id),
                password: MOCK_PASSWORD.to_string(),
            })
            .clone();
        Ok(cred)
    }

    async fn delete_binding(&self, instance_id: &str, bind_id: &str) -> ExecutorResult<()> {
        let mut state = self.state.write().await;
        state
            .bindings
            .remove(&(instance_id.to_string(), bind_id.to_string()));
        Ok(())
    }

    async fn cluster_detail(&self, instance_id: &str) -> ExecutorResult<ClusterDetails> {
        let state = self.state.read().await;
        state
            .instances
            .get(instance_id)
            .cloned()
            .ok_or_else(|| ExecutorError::InstanceNotFound(instance_id.to_string()))
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}
