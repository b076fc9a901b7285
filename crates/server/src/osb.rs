//! Open Service Broker v2 request and response bodies.

use crate::error::{ApiError, ApiResult};
use osbridge_core::catalog::{PARAM_CLUSTER_NAME, PARAM_NAMESPACE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `accepts_incomplete` query parameter shared by the mutating verbs.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct AsyncQuery {
    #[serde(default)]
    pub accepts_incomplete: bool,
}

/// Body of `PUT /v2/service_instances/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct ProvisionRequest {
    pub service_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub organization_guid: Option<String>,
    #[serde(default)]
    pub space_guid: Option<String>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub context: Option<Value>,
}

/// Required provisioning parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionParameters {
    pub cluster_name: String,
    pub namespace: String,
}

impl ProvisionParameters {
    /// Pull the required parameters out of a provision request.
    ///
    /// Missing, empty and non-string values are all rejected; `CLUSTERNAME`
    /// is checked before `NAMESPACE`.
    pub fn extract(parameters: Option<&Map<String, Value>>) -> ApiResult<Self> {
        let cluster_name = required_string(parameters, PARAM_CLUSTER_NAME)?;
        let namespace = required_string(parameters, PARAM_NAMESPACE)?;
        Ok(Self {
            cluster_name,
            namespace,
        })
    }
}

fn required_string(parameters: Option<&Map<String, Value>>, key: &str) -> ApiResult<String> {
    match parameters.and_then(|p| p.get(key)) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ApiError::MissingParameter(key.to_string())),
    }
}

/// Body of `PATCH /v2/service_instances/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateRequest {
    pub service_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

/// Bind resource of a bind request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BindResource {
    #[serde(default)]
    pub app_guid: Option<String>,
}

/// Body of `PUT /v2/service_instances/{id}/service_bindings/{binding_id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct BindRequest {
    pub service_id: String,
    pub plan_id: String,
    /// Deprecated top-level form of `bind_resource.app_guid`.
    #[serde(default)]
    pub app_guid: Option<String>,
    #[serde(default)]
    pub bind_resource: Option<BindResource>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

impl BindRequest {
    /// Application the binding is for, if the platform said.
    pub fn app_id(&self) -> Option<&str> {
        self.bind_resource
            .as_ref()
            .and_then(|r| r.app_guid.as_deref())
            .or(self.app_guid.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Credentials handed to a bound application.
#[derive(Clone, Serialize)]
pub struct BindCredentials {
    pub username: String,
    pub password: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_host: String,
    pub internal_host: String,
    pub uri: String,
}

impl std::fmt::Debug for BindCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindCredentials")
            .field("username", &self.username)
            .field("db_port", &self.db_port)
            .field("db_name", &self.db_name)
            .field("db_host", &self.db_host)
            .field("internal_host", &self.internal_host)
            .finish_non_exhaustive()
    }
}

/// Bind response body.
#[derive(Debug, Serialize)]
pub struct BindResponse {
    pub credentials: BindCredentials,
}

/// Empty JSON object used by the verbs that return no data.
#[derive(Debug, Default, Serialize)]
pub struct EmptyResponse {}
