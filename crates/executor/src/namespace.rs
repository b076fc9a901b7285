//! Instance namespace lookup.
//!
//! Clusters are created with a label carrying the instance ID. The
//! cluster-management API needs the namespace for every call, so the
//! namespace is found once through a label-selector listing and cached.

use crate::error::{ExecutorError, ExecutorResult};
use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Finds the namespaces of clusters matching a label selector.
#[async_trait]
pub trait ClusterLookup: Send + Sync {
    /// Namespaces of every matching cluster, in listing order.
    async fn namespaces_for_selector(&self, selector: &str) -> ExecutorResult<Vec<String>>;
}

/// [`ClusterLookup`] backed by the orchestration platform's `pgclusters` resources.
pub struct KubeClusterLookup {
    client: Client,
    resource: ApiResource,
}

impl KubeClusterLookup {
    pub fn new(client: Client) -> Self {
        let gvk = GroupVersionKind::gvk("crunchydata.com", "v1", "Pgcluster");
        Self {
            client,
            resource: ApiResource::from_gvk_with_plural(&gvk, "pgclusters"),
        }
    }
}

#[async_trait]
impl ClusterLookup for KubeClusterLookup {
    async fn namespaces_for_selector(&self, selector: &str) -> ExecutorResult<Vec<String>> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &self.resource);
        let list = api
            .list(&ListParams::default().labels(selector))
            .await
            .map_err(|e| ExecutorError::TransportFailure(format!("listing pgclusters: {e}")))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|obj| obj.metadata.namespace)
            .collect())
    }
}

/// Create a kube client from an optional kubeconfig path.
///
/// Falls back to in-cluster (or ambient) configuration when no path is given.
pub async fn kube_client(kubeconfig: Option<&Path>) -> ExecutorResult<Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| ExecutorError::Config(format!("failed to read kubeconfig: {e}")))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| ExecutorError::Config(format!("failed to load kubeconfig: {e}")))?
        }
        None => Config::infer()
            .await
            .map_err(|e| ExecutorError::Config(format!("failed to infer kube config: {e}")))?,
    };

    Client::try_from(config)
        .map_err(|e| ExecutorError::Config(format!("failed to create kube client: {e}")))
}

/// Memoizing instance ID to namespace resolver.
///
/// Entries are never refreshed or removed; an instance does not move
/// between namespaces.
pub struct NamespaceLocator {
    lookup: Arc<dyn ClusterLookup>,
    label_key: String,
    cache: RwLock<HashMap<String, String>>,
}

impl NamespaceLocator {
    pub fn new(lookup: Arc<dyn ClusterLookup>, label_key: impl Into<String>) -> Self {
        Self {
            lookup,
            label_key: label_key.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Label selector matching the cluster created for `instance_id`.
    pub fn selector(&self, instance_id: &str) -> String {
        format!("{}={}", self.label_key, instance_id)
    }

    /// Resolve the namespace hosting `instance_id`.
    pub async fn resolve(&self, instance_id: &str) -> ExecutorResult<String> {
        if let Some(ns) = self.cache.read().await.get(instance_id) {
            return Ok(ns.clone());
        }

        let selector = self.selector(instance_id);
        debug!(selector = %selector, "Looking up cluster namespace");

        let namespaces = self.lookup.namespaces_for_selector(&selector).await?;
        let ns = match namespaces.as_slice() {
            [] => {
                return Err(ExecutorError::InstanceNotFound(format!(
                    "no cluster matches selector {selector}"
                )));
            }
            [only] => only.clone(),
            [first, ..] => {
                warn!(
                    instance_id = %instance_id,
                    matches = namespaces.len(),
                    "Multiple clusters for instance, using first"
                );
                first.clone()
            }
        };

        self.cache
            .write()
            .await
            .insert(instance_id.to_string(), ns.clone());
        Ok(ns)
    }

    /// Number of cached entries.
    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}
