//! Executor error types.

use thiserror::Error;

/// Failures surfaced by a cluster executor.
///
/// The variants form the taxonomy the broker reacts to: `InstanceNotFound`
/// is recoverable during deprovision, everything else is terminal for the
/// verb that hit it.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    #[error("instance {0} still has bindings")]
    BindingsRemain(String),

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("unexpected response shape: {0}")]
    ShapeMismatch(String),

    #[error("request rejected: {0}")]
    DownstreamRejected(String),

    #[error("could not authenticate with the cluster-management API")]
    AuthenticationFailed,

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ExecutorError {
    /// Stable snake_case name of the variant, used for error codes and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::InstanceNotFound(_) => "instance_not_found",
            Self::BindingsRemain(_) => "bindings_remain",
            Self::CredentialNotFound(_) => "credential_not_found",
            Self::ShapeMismatch(_) => "shape_mismatch",
            Self::DownstreamRejected(_) => "downstream_rejected",
            Self::AuthenticationFailed => "authentication_failed",
            Self::TransportFailure(_) => "transport_failure",
            Self::Config(_) => "config",
        }
    }
}

impl From<osbridge_core::Error> for ExecutorError {
    fn from(err: osbridge_core::Error) -> Self {
        match err {
            osbridge_core::Error::InvalidIdentifier(msg) => Self::InvalidIdentifier(msg),
        }
    }
}

/// Result type for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
