//! Values exchanged between the broker and an executor.

use std::fmt;

/// Everything needed to create a cluster for a service instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRequest {
    pub instance_id: String,
    pub cluster_name: String,
    pub namespace: String,
    /// Catalog plan ID; sizing is resolved by the executor.
    pub plan_id: String,
}

/// Addressing information for a provisioned cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterDetails {
    /// Service name.
    pub name: String,
    pub cluster_name: String,
    pub cluster_ip: String,
    /// Empty when the cluster is not published outside the platform.
    pub external_ip: String,
    pub database: String,
}

impl ClusterDetails {
    /// Host handed to applications: the external address when published,
    /// otherwise the cluster-internal one.
    pub fn advertised_host(&self) -> &str {
        if self.external_ip.is_empty() {
            &self.cluster_ip
        } else {
            &self.external_ip
        }
    }
}

/// Username and password pair issued for a binding.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCred {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCred")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
