//! Cluster executors for the osbridge service broker.
//!
//! This crate provides:
//! - The [`Executor`] trait the broker drives and its error taxonomy
//! - An in-memory mock backend for development and tests
//! - A remote backend speaking to the cluster-management API over mutual TLS
//! - The instance namespace locator used by the remote backend

pub mod backends;
pub mod error;
pub mod messages;
pub mod namespace;
pub mod tls;
pub mod traits;
pub mod types;

pub use backends::{
    mock::MockExecutor,
    remote::{RemoteExecutor, RemoteSettings},
};
pub use error::{ExecutorError, ExecutorResult};
pub use namespace::{ClusterLookup, KubeClusterLookup, NamespaceLocator, kube_client};
pub use tls::{CertPaths, HttpClientSource};
pub use traits::Executor;
pub use types::{BasicCred, ClusterDetails, CreateRequest};

use osbridge_core::config::ExecutorConfig;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Create an executor from configuration.
pub async fn from_config(config: &ExecutorConfig) -> ExecutorResult<Arc<dyn Executor>> {
    config.validate().map_err(ExecutorError::Config)?;

    match config {
        ExecutorConfig::Mock => Ok(Arc::new(MockExecutor::new())),
        ExecutorConfig::Remote {
            apiserver_url,
            client_version,
            username,
            password,
            request_timeout_secs,
            insecure_skip_verify,
            instance_label_key,
            kubeconfig,
        } => {
            let apiserver_url = Url::parse(apiserver_url)
                .map_err(|e| ExecutorError::Config(format!("invalid apiserver_url: {e}")))?;
            let client = kube_client(kubeconfig.as_deref()).await?;

            let settings = RemoteSettings {
                apiserver_url,
                client_version: client_version.clone(),
                username: username.clone(),
                password: password.clone(),
                request_timeout: Duration::from_secs(*request_timeout_secs),
                instance_label_key: instance_label_key.clone(),
            };
            let http = HttpClientSource::Mtls {
                paths: CertPaths::well_known(),
                insecure_skip_verify: *insecure_skip_verify,
            };
            let executor =
                RemoteExecutor::new(settings, http, Arc::new(KubeClusterLookup::new(client)))
                    .await?;
            Ok(Arc::new(executor))
        }
    }
}
