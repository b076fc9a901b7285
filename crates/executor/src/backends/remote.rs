//! Executor backed by the cluster-management API.
//!
//! Every call is a single JSON `POST` with basic credentials over mutual TLS.
//! Responses use the `{status, results}` envelope and only a status code of
//! `ok` counts as success, whatever the HTTP status.

use crate::error::{ExecutorError, ExecutorResult};
use crate::messages::{
    ALL_CLUSTERS, CreateClusterRequest, CreateUserRequest, DeleteClusterRequest,
    DeleteUserRequest, Envelope, ShowClusterDetail, ShowClusterRequest, ShowUserDetail,
    ShowUserRequest,
};
use crate::namespace::{ClusterLookup, NamespaceLocator};
use crate::tls::HttpClientSource;
use crate::traits::Executor;
use crate::types::{BasicCred, ClusterDetails, CreateRequest};
use async_trait::async_trait;
use osbridge_core::{binding_username, is_binding_username, resolve_plan};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Length of passwords generated for binding users.
const BINDING_PASSWORD_LENGTH: u32 = 16;

/// Connection settings for the cluster-management API.
#[derive(Clone)]
pub struct RemoteSettings {
    pub apiserver_url: Url,
    pub client_version: String,
    pub username: String,
    pub password: String,
    pub request_timeout: Duration,
    pub instance_label_key: String,
}

impl std::fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("apiserver_url", &self.apiserver_url.as_str())
            .field("client_version", &self.client_version)
            .field("username", &self.username)
            .field("request_timeout", &self.request_timeout)
            .field("instance_label_key", &self.instance_label_key)
            .finish_non_exhaustive()
    }
}

/// [`Executor`] talking to the cluster-management API.
pub struct RemoteExecutor {
    base_url: Url,
    client_version: String,
    username: String,
    password: String,
    request_timeout: Duration,
    http: HttpClientSource,
    locator: NamespaceLocator,
}

impl RemoteExecutor {
    /// Create a remote executor.
    ///
    /// Builds one client up front so missing or broken certificate material
    /// fails at startup instead of on the first request.
    pub async fn new(
        settings: RemoteSettings,
        http: HttpClientSource,
        lookup: Arc<dyn ClusterLookup>,
    ) -> ExecutorResult<Self> {
        http.client().await?;

        let mut base_url = settings.apiserver_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!(
            apiserver_url = %base_url,
            client_version = %settings.client_version,
            "Remote executor configured"
        );

        Ok(Self {
            base_url,
            client_version: settings.client_version,
            username: settings.username,
            password: settings.password,
            request_timeout: settings.request_timeout,
            http,
            locator: NamespaceLocator::new(lookup, settings.instance_label_key),
        })
    }

    /// The namespace locator shared by every operation.
    pub fn locator(&self) -> &NamespaceLocator {
        &self.locator
    }

    fn endpoint(&self, path: &str) -> ExecutorResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ExecutorError::Config(format!("invalid endpoint {path}: {e}")))
    }

    /// POST `body` to `path` and decode the response envelope.
    async fn post<B, T>(&self, path: &str, body: &B) -> ExecutorResult<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let client = self.http.client().await?;
        let url = self.endpoint(path)?;
        debug!(url = %url, "Calling cluster-management API");

        let response = client
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ExecutorError::TransportFailure(format!("{path}: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %path, "Cluster-management API rejected credentials");
            return Err(ExecutorError::AuthenticationFailed);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecutorError::DownstreamRejected(format!(
                "{path} returned {status}: {body}"
            )));
        }

        response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ExecutorError::TransportFailure(format!("decoding {path} response: {e}")))
    }

    /// Every user secret on the clusters matching `selector`.
    async fn show_users(
        &self,
        namespace: &str,
        selector: &str,
    ) -> ExecutorResult<Vec<ShowUserDetail>> {
        let req = ShowUserRequest {
            cluster_name: ALL_CLUSTERS.to_string(),
            selector: selector.to_string(),
            namespace: namespace.to_string(),
            client_version: self.client_version.clone(),
            expired: String::new(),
        };
        self.post::<_, ShowUserDetail>("usershow", &req)
            .await?
            .into_results("show user")
    }
}

#[async_trait]
impl Executor for RemoteExecutor {
    async fn create_cluster(&self, req: &CreateRequest) -> ExecutorResult<()> {
        let selector = self.locator.selector(&req.instance_id);
        info!(
            instance_id = %req.instance_id,
            namespace = %req.namespace,
            label = %selector,
            "Creating cluster"
        );

        let body = CreateClusterRequest {
            cluster_name: req.cluster_name.clone(),
            namespace: req.namespace.clone(),
            selector,
            client_version: self.client_version.clone(),
            plan_attributes: resolve_plan(&req.plan_id),
        };
        let results = self
            .post::<_, serde_json::Value>("clusters", &body)
            .await?
            .into_results("create cluster")?;
        for result in results {
            debug!(result = %result, "Create cluster result");
        }
        Ok(())
    }

    async fn delete_cluster(&self, instance_id: &str) -> ExecutorResult<()> {
        let namespace = self.locator.resolve(instance_id).await?;
        let selector = self.locator.selector(instance_id);

        // Refuse before anything destructive happens.
        let users = self.show_users(&namespace, &selector).await?;
        let remaining = users
            .iter()
            .flat_map(|detail| detail.secrets.iter())
            .filter(|secret| is_binding_username(&secret.username))
            .count();
        if remaining > 0 {
            warn!(
                instance_id = %instance_id,
                remaining = remaining,
                "Refusing to delete cluster with live bindings"
            );
            return Err(ExecutorError::BindingsRemain(instance_id.to_string()));
        }

        info!(instance_id = %instance_id, namespace = %namespace, "Deleting cluster");
        let body = DeleteClusterRequest {
            cluster_name: ALL_CLUSTERS.to_string(),
            selector,
            namespace,
            client_version: self.client_version.clone(),
            delete_data: false,
            delete_backups: false,
        };
        self.post::<_, serde_json::Value>("clustersdelete", &body)
            .await?
            .into_results("delete cluster")?;
        Ok(())
    }

    async fn create_binding(
        &self,
        instance_id: &str,
        bind_id: &str,
        app_id: Option<&str>,
    ) -> ExecutorResult<BasicCred> {
        let username = binding_username(bind_id)?;
        let namespace = self.locator.resolve(instance_id).await?;
        let selector = self.locator.selector(instance_id);
        info!(
            instance_id = %instance_id,
            binding_id = %bind_id,
            app_id = app_id.unwrap_or_default(),
            "Creating binding user"
        );

        let body = CreateUserRequest {
            name: username.clone(),
            namespace: namespace.clone(),
            selector: selector.clone(),
            managed_user: true,
            client_version: self.client_version.clone(),
            password_length: BINDING_PASSWORD_LENGTH,
        };
        // A repeated bind finds the user already present; the lookup below decides.
        let created = self
            .post::<_, serde_json::Value>("usercreate", &body)
            .await?
            .into_results("create user");
        if let Err(err) = created {
            warn!(username = %username, error = %err, "Create user not acknowledged");
        }

        let users = self.show_users(&namespace, &selector).await?;
        users
            .into_iter()
            .flat_map(|detail| detail.secrets)
            .find(|secret| secret.username == username)
            .map(|secret| BasicCred {
                username: secret.username,
                password: secret.password,
            })
            .ok_or_else(|| {
                ExecutorError::CredentialNotFound(format!(
                    "user {username} missing from cluster secrets"
                ))
            })
    }

    async fn delete_binding(&self, instance_id: &str, bind_id: &str) -> ExecutorResult<()> {
        let username = binding_username(bind_id)?;
        let namespace = self.locator.resolve(instance_id).await?;
        info!(instance_id = %instance_id, binding_id = %bind_id, "Deleting binding user");

        let body = DeleteUserRequest {
            username,
            selector: self.locator.selector(instance_id),
            namespace,
            client_version: self.client_version.clone(),
        };
        self.post::<_, serde_json::Value>("usersdelete", &body)
            .await?
            .into_results("delete user")?;
        Ok(())
    }

    async fn cluster_detail(&self, instance_id: &str) -> ExecutorResult<ClusterDetails> {
        let namespace = self.locator.resolve(instance_id).await?;
        let body = ShowClusterRequest {
            cluster_name: ALL_CLUSTERS.to_string(),
            selector: self.locator.selector(instance_id),
            namespace,
            client_version: self.client_version.clone(),
        };
        let mut results = self
            .post::<_, ShowClusterDetail>("showclusters", &body)
            .await?
            .into_results("show cluster")?;

        let detail = match results.len() {
            0 => return Err(ExecutorError::InstanceNotFound(instance_id.to_string())),
            1 => results.remove(0),
            n => {
                return Err(ExecutorError::ShapeMismatch(format!(
                    "expected one cluster for instance {instance_id}, got {n}"
                )));
            }
        };

        let [svc] = <[_; 1]>::try_from(detail.services).map_err(|services: Vec<_>| {
            ExecutorError::ShapeMismatch(format!(
                "expected one service for instance {instance_id}, got {}",
                services.len()
            ))
        })?;

        Ok(ClusterDetails {
            name: svc.name,
            cluster_name: svc.cluster_name,
            cluster_ip: svc.cluster_ip,
            external_ip: svc.external_ip,
            database: detail.database,
        })
    }

    fn kind(&self) -> &'static str {
        "remote"
    }
}
