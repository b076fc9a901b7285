//! Mutual-TLS client construction for the cluster-management API.
//!
//! The certificate material is mounted into the container and may be rotated
//! underneath a running process, so it is read again for every operation.

use crate::error::{ExecutorError, ExecutorResult};
use reqwest::{Certificate, Client, Identity};
use std::path::{Path, PathBuf};

/// Directory holding the mounted certificate material.
pub const CERT_DIR: &str = "/opt/apiserver-keys";

/// Locations of the CA bundle and client key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertPaths {
    pub ca_cert: PathBuf,
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
}

impl CertPaths {
    /// The fixed, well-known mount locations.
    pub fn well_known() -> Self {
        Self::in_dir(CERT_DIR)
    }

    /// `ca.crt`, `client.crt` and `client.key` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            ca_cert: dir.join("ca.crt"),
            client_cert: dir.join("client.crt"),
            client_key: dir.join("client.key"),
        }
    }
}

/// Where the executor gets its HTTP client from.
#[derive(Clone, Debug)]
pub enum HttpClientSource {
    /// Build a fresh mTLS client from the material on disk for every call.
    Mtls {
        paths: CertPaths,
        insecure_skip_verify: bool,
    },
    /// Reuse a prebuilt client.
    Fixed(Client),
}

impl HttpClientSource {
    /// Get a client for one operation.
    pub async fn client(&self) -> ExecutorResult<Client> {
        match self {
            Self::Mtls {
                paths,
                insecure_skip_verify,
            } => build_mtls_client(paths, *insecure_skip_verify).await,
            Self::Fixed(client) => Ok(client.clone()),
        }
    }
}

async fn read_material(path: &Path) -> ExecutorResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ExecutorError::Config(format!("loading {}: {e}", path.display())))
}

/// Build a client presenting the client certificate and trusting only the CA bundle.
pub async fn build_mtls_client(
    paths: &CertPaths,
    insecure_skip_verify: bool,
) -> ExecutorResult<Client> {
    let ca_pem = read_material(&paths.ca_cert).await?;
    let cert_pem = read_material(&paths.client_cert).await?;
    let key_pem = read_material(&paths.client_key).await?;

    let ca = Certificate::from_pem(&ca_pem)
        .map_err(|e| ExecutorError::Config(format!("invalid CA certificate: {e}")))?;

    let mut identity_pem = cert_pem;
    identity_pem.push(b'\n');
    identity_pem.extend_from_slice(&key_pem);
    let identity = Identity::from_pem(&identity_pem)
        .map_err(|e| ExecutorError::Config(format!("invalid client key pair: {e}")))?;

    Client::builder()
        .use_rustls_tls()
        .add_root_certificate(ca)
        .identity(identity)
        .danger_accept_invalid_certs(insecure_skip_verify)
        .build()
        .map_err(|e| ExecutorError::Config(format!("failed to build HTTP client: {e}")))
}
