//! Wire messages of the cluster-management API.

use crate::error::{ExecutorError, ExecutorResult};
use osbridge_core::PlanConfig;
use serde::{Deserialize, Serialize};

/// Status code the API uses for success.
pub const STATUS_OK: &str = "ok";

/// Cluster name meaning "every cluster matching the selector".
pub const ALL_CLUSTERS: &str = "all";

/// Application-level status carried by every response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OK
    }
}

/// Response envelope `{status, results}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Status,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the results, rejecting any status other than ok.
    ///
    /// An HTTP 200 is not enough; the payload status decides.
    pub fn into_results(self, operation: &str) -> ExecutorResult<Vec<T>> {
        if self.status.is_ok() {
            Ok(self.results)
        } else {
            Err(ExecutorError::DownstreamRejected(format!(
                "{operation}: {}",
                self.status.msg
            )))
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub cluster_name: String,
    pub namespace: String,
    /// Label applied to the created cluster.
    pub selector: String,
    pub client_version: String,
    pub plan_attributes: PlanConfig,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteClusterRequest {
    pub cluster_name: String,
    pub selector: String,
    pub namespace: String,
    pub client_version: String,
    pub delete_data: bool,
    pub delete_backups: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowClusterRequest {
    pub cluster_name: String,
    pub selector: String,
    pub namespace: String,
    pub client_version: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowClusterDetail {
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub services: Vec<ShowClusterService>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowClusterService {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default, rename = "clusterIP")]
    pub cluster_ip: String,
    #[serde(default, rename = "externalIP")]
    pub external_ip: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Username to create.
    pub name: String,
    pub namespace: String,
    pub selector: String,
    pub managed_user: bool,
    pub client_version: String,
    pub password_length: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub cluster_name: String,
    pub selector: String,
    pub namespace: String,
    pub client_version: String,
    /// Only list users expiring within this many days; empty lists all.
    pub expired: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserDetail {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub secrets: Vec<UserSecret>,
}

#[derive(Clone, Deserialize)]
pub struct UserSecret {
    #[serde(default)]
    pub name: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for UserSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSecret")
            .field("name", &self.name)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub username: String,
    pub selector: String,
    pub namespace: String,
    pub client_version: String,
}
