//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    /// SECURITY: When enabled, ensure this endpoint is network-restricted
    /// to authorized Prometheus scraper IPs only at the infrastructure level.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Log generated binding credentials (default: false).
    /// Never enable outside of development clusters.
    #[serde(default)]
    pub debug_credentials: bool,
}

fn default_bind() -> String {
    "0.0.0.0:8443".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
            debug_credentials: false,
        }
    }
}

/// Broker behaviour configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Service ID published in the catalog.
    /// A random one is generated at startup when unset, which makes the
    /// catalog unstable across restarts. Set it in production.
    #[serde(default)]
    pub service_id: Option<String>,
    /// Report provision/deprovision/update as asynchronous when the platform
    /// sends `accepts_incomplete=true` (default: false).
    #[serde(default)]
    pub async_enabled: bool,
}

impl BrokerConfig {
    /// Validate broker configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(id) = &self.service_id
            && id.trim().is_empty()
        {
            return Err("broker.service_id must not be empty when set".to_string());
        }
        Ok(())
    }
}

/// Cluster executor configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExecutorConfig {
    /// In-memory executor for development and tests.
    #[default]
    Mock,
    /// Cluster-management API reached over mutual TLS.
    Remote {
        /// Base URL of the cluster-management API (e.g., "https://pgo-apiserver:8443").
        apiserver_url: String,
        /// Client version sent with every request.
        #[serde(default = "default_client_version")]
        client_version: String,
        /// Basic-auth username for the cluster-management API.
        username: String,
        /// Basic-auth password for the cluster-management API.
        /// WARNING: Prefer OSBRIDGE_EXECUTOR__PASSWORD over storing it in config files.
        password: String,
        /// Per-request deadline in seconds.
        #[serde(default = "default_request_timeout_secs")]
        request_timeout_secs: u64,
        /// Skip server certificate verification (development only).
        #[serde(default)]
        insecure_skip_verify: bool,
        /// Label key that tags clusters with the instance ID they were provisioned for.
        #[serde(default = "default_instance_label_key")]
        instance_label_key: String,
        /// Kubeconfig used for cluster lookups. In-cluster config is used when unset.
        #[serde(default)]
        kubeconfig: Option<PathBuf>,
    },
}

fn default_client_version() -> String {
    "4.0.1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Default label key for instance lookups.
pub fn default_instance_label_key() -> String {
    "pgo-osb-instance".to_string()
}

impl ExecutorConfig {
    /// Validate executor configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Mock => Ok(()),
            Self::Remote {
                apiserver_url,
                username,
                request_timeout_secs,
                instance_label_key,
                ..
            } => {
                if !(apiserver_url.starts_with("https://") || apiserver_url.starts_with("http://"))
                {
                    return Err(format!(
                        "executor.apiserver_url must be an http(s) URL, got {apiserver_url:?}"
                    ));
                }
                if username.is_empty() {
                    return Err("executor.username must not be empty".to_string());
                }
                if *request_timeout_secs == 0 {
                    return Err("executor.request_timeout_secs must be greater than 0".to_string());
                }
                if instance_label_key.is_empty() || instance_label_key.contains('=') {
                    return Err(format!(
                        "executor.instance_label_key is not a valid label key: {instance_label_key:?}"
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Inbound authentication configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Accept every request (development only).
    #[default]
    None,
    /// Static HTTP basic credentials shared with the platform.
    Basic {
        username: String,
        /// WARNING: Prefer OSBRIDGE_AUTH__PASSWORD over storing it in config files.
        password: String,
    },
    /// Bearer tokens validated through the orchestration platform's TokenReview API.
    TokenReview,
}

impl AuthConfig {
    /// Validate authentication configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Basic { username, password } if username.is_empty() || password.is_empty() => {
                Err("auth.username and auth.password are required for basic auth".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Broker behaviour.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Cluster executor.
    #[serde(default)]
    pub executor: ExecutorConfig,
    /// Inbound authentication.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses the mock executor, no authentication and a
    /// fixed service ID.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            broker: BrokerConfig {
                service_id: Some("4be12541-2945-4101-8a33-79ac0ad58750".to_string()),
                async_enabled: false,
            },
            executor: ExecutorConfig::Mock,
            auth: AuthConfig::None,
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.broker.validate()?;
        self.executor.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}
