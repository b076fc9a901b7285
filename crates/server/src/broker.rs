//! OSB verb semantics on top of a cluster executor.
//!
//! The broker keeps no per-instance state of its own. Provision and
//! deprovision are serialized broker-wide; bind and unbind run freely and
//! race with them on whatever the executor reports.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::osb::{BindCredentials, BindRequest, ProvisionParameters, ProvisionRequest, UpdateRequest};
use osbridge_core::{Catalog, DATABASE_PORT, DATABASE_URI_SCHEME};
use osbridge_executor::{BasicCred, ClusterDetails, CreateRequest, Executor, ExecutorError};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Result of a mutating verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationOutcome {
    /// Report the operation as accepted rather than finished.
    pub is_async: bool,
}

/// The broker protocol bridge.
pub struct Broker {
    executor: Arc<dyn Executor>,
    catalog: Catalog,
    async_enabled: bool,
    debug_credentials: bool,
    provision_lock: Mutex<()>,
}

impl Broker {
    pub fn new(executor: Arc<dyn Executor>, service_id: &str, async_enabled: bool) -> Self {
        Self {
            executor,
            catalog: Catalog::build(service_id),
            async_enabled,
            debug_credentials: false,
            provision_lock: Mutex::new(()),
        }
    }

    /// Log issued credentials at debug level.
    pub fn with_debug_credentials(mut self, enabled: bool) -> Self {
        self.debug_credentials = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    fn outcome(&self, accepts_incomplete: bool) -> OperationOutcome {
        OperationOutcome {
            is_async: accepts_incomplete && self.async_enabled,
        }
    }

    /// Create the cluster for a new service instance.
    pub async fn provision(
        &self,
        instance_id: &str,
        req: &ProvisionRequest,
        accepts_incomplete: bool,
    ) -> ApiResult<OperationOutcome> {
        observe("provision", async {
            let params = ProvisionParameters::extract(req.parameters.as_ref())?;

            let _guard = self.provision_lock.lock().await;
            info!(
                instance_id = %instance_id,
                plan_id = %req.plan_id,
                cluster_name = %params.cluster_name,
                namespace = %params.namespace,
                "Provisioning instance"
            );
            self.executor
                .create_cluster(&CreateRequest {
                    instance_id: instance_id.to_string(),
                    cluster_name: params.cluster_name,
                    namespace: params.namespace,
                    plan_id: req.plan_id.clone(),
                })
                .await?;

            Ok(self.outcome(accepts_incomplete))
        })
        .await
    }

    /// Delete the cluster behind a service instance.
    ///
    /// An instance that is already gone counts as deprovisioned.
    pub async fn deprovision(
        &self,
        instance_id: &str,
        accepts_incomplete: bool,
    ) -> ApiResult<OperationOutcome> {
        observe("deprovision", async {
            let _guard = self.provision_lock.lock().await;
            info!(instance_id = %instance_id, "Deprovisioning instance");
            match self.executor.delete_cluster(instance_id).await {
                Ok(()) => Ok(self.outcome(accepts_incomplete)),
                Err(ExecutorError::InstanceNotFound(_)) => {
                    info!(instance_id = %instance_id, "Instance already gone");
                    Ok(OperationOutcome { is_async: false })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Plan changes are not supported; accepted as a no-op.
    pub async fn update(
        &self,
        instance_id: &str,
        req: &UpdateRequest,
        accepts_incomplete: bool,
    ) -> ApiResult<OperationOutcome> {
        observe("update", async {
            debug!(
                instance_id = %instance_id,
                plan_id = ?req.plan_id,
                "Update requested, nothing to do"
            );
            Ok(self.outcome(accepts_incomplete))
        })
        .await
    }

    /// Issue credentials for an application.
    pub async fn bind(
        &self,
        instance_id: &str,
        binding_id: &str,
        req: &BindRequest,
    ) -> ApiResult<BindCredentials> {
        observe("bind", async {
            info!(instance_id = %instance_id, binding_id = %binding_id, "Binding");
            let details = self.executor.cluster_detail(instance_id).await?;
            // Checked before the user exists so a bad address leaves nothing behind.
            let base = connection_base(details.advertised_host(), &details.database)?;
            let cred = self
                .executor
                .create_binding(instance_id, binding_id, req.app_id())
                .await?;

            let credentials = build_credentials(&details, base, cred)?;
            if self.debug_credentials {
                debug!(
                    binding_id = %binding_id,
                    username = %credentials.username,
                    password = %credentials.password,
                    "Issued credentials"
                );
            }
            Ok(credentials)
        })
        .await
    }

    /// Remove a binding's credentials. Never fails.
    pub async fn unbind(&self, instance_id: &str, binding_id: &str) -> ApiResult<()> {
        observe("unbind", async {
            info!(instance_id = %instance_id, binding_id = %binding_id, "Unbinding");
            if let Err(e) = self.executor.delete_binding(instance_id, binding_id).await {
                warn!(
                    instance_id = %instance_id,
                    binding_id = %binding_id,
                    error = %e,
                    "Unbind failed, reporting success"
                );
            }
            Ok(())
        })
        .await
    }

    /// Operation polling is not implemented; always reports nothing.
    pub async fn last_operation(&self, instance_id: &str) -> ApiResult<()> {
        observe("last_operation", async {
            debug!(instance_id = %instance_id, "Last operation polled");
            Ok(())
        })
        .await
    }
}

fn invalid_uri(what: &str) -> ApiError {
    ApiError::Internal(format!("cannot build connection URI: {what}"))
}

/// `postgresql://host:5432/db`, with IPv6 literals bracketed.
fn connection_base(host: &str, database: &str) -> ApiResult<Url> {
    if host.is_empty() {
        return Err(
            ExecutorError::ShapeMismatch("cluster advertises no service address".into()).into(),
        );
    }
    let authority = match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) => format!("[{ip}]"),
        _ => host.to_string(),
    };

    let mut uri = Url::parse(&format!("{DATABASE_URI_SCHEME}://{authority}:{DATABASE_PORT}/"))
        .map_err(|e| invalid_uri(&format!("host {host:?}: {e}")))?;
    uri.set_path(database);
    Ok(uri)
}

/// Assemble the credential document for a binding.
///
/// User info is percent-encoded into `base`.
fn build_credentials(
    details: &ClusterDetails,
    mut base: Url,
    cred: BasicCred,
) -> ApiResult<BindCredentials> {
    base.set_username(&cred.username)
        .map_err(|()| invalid_uri("username"))?;
    base.set_password(Some(&cred.password))
        .map_err(|()| invalid_uri("password"))?;

    Ok(BindCredentials {
        username: cred.username,
        password: cred.password,
        db_port: DATABASE_PORT,
        db_name: details.database.clone(),
        db_host: details.advertised_host().to_string(),
        internal_host: details.cluster_ip.clone(),
        uri: base.to_string(),
    })
}

/// Run one verb and record its metrics.
async fn observe<T, F>(verb: &str, fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.code(),
    };
    metrics::record_request(verb, outcome, start.elapsed());
    result
}
