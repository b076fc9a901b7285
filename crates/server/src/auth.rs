//! Request tracing and authentication middleware.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use k8s_openapi::api::authentication::v1::{TokenReview, TokenReviewSpec, TokenReviewStatus};
use kube::{Api, Client};
use osbridge_core::config::AuthConfig;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{Instrument, debug};
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and potential log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    /// The value is sanitized: truncated to MAX_TRACE_ID_LEN characters and non-printable characters removed.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    /// Get the trace ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an authenticated platform.
#[derive(Clone, Debug)]
pub struct AuthenticatedCaller {
    pub username: String,
}

/// Validates bearer tokens.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Return the username the token belongs to.
    async fn validate(&self, token: &str) -> ApiResult<String>;
}

/// [`TokenValidator`] backed by the orchestration platform's TokenReview API.
pub struct KubeTokenReviewer {
    client: Client,
}

impl KubeTokenReviewer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenValidator for KubeTokenReviewer {
    async fn validate(&self, token: &str) -> ApiResult<String> {
        let api: Api<TokenReview> = Api::all(self.client.clone());
        let review = TokenReview {
            metadata: Default::default(),
            spec: TokenReviewSpec {
                token: Some(token.to_string()),
                audiences: None,
            },
            status: None,
        };

        let result = api
            .create(&Default::default(), &review)
            .await
            .map_err(|e| ApiError::Internal(format!("TokenReview API error: {e}")))?;
        let status = result
            .status
            .ok_or_else(|| ApiError::Internal("TokenReview returned no status".into()))?;

        reviewed_username(&status)
    }
}

/// Username from a TokenReview status, if the token was accepted.
fn reviewed_username(status: &TokenReviewStatus) -> ApiResult<String> {
    if !status.authenticated.unwrap_or(false) {
        let msg = status
            .error
            .as_deref()
            .unwrap_or("token authentication failed");
        return Err(ApiError::Unauthorized(msg.to_string()));
    }

    status
        .user
        .as_ref()
        .and_then(|user| user.username.clone())
        .ok_or_else(|| ApiError::Internal("TokenReview authenticated but no username".into()))
}

/// Inbound authentication policy.
#[derive(Clone)]
pub enum Authenticator {
    /// Accept everything.
    None,
    /// Static basic credentials, kept as digests.
    Basic {
        username: [u8; 32],
        password: [u8; 32],
    },
    /// Bearer tokens checked by a validator.
    Token(Arc<dyn TokenValidator>),
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl Authenticator {
    /// Build an authenticator from configuration.
    ///
    /// `kube` is only consulted for TokenReview authentication.
    pub fn from_config(config: &AuthConfig, kube: Option<Client>) -> ApiResult<Self> {
        match config {
            AuthConfig::None => Ok(Self::None),
            AuthConfig::Basic { username, password } => Ok(Self::basic(username, password)),
            AuthConfig::TokenReview => {
                let client = kube.ok_or_else(|| {
                    ApiError::Internal("token_review auth requires a kube client".into())
                })?;
                Ok(Self::Token(Arc::new(KubeTokenReviewer::new(client))))
            }
        }
    }

    pub fn basic(username: &str, password: &str) -> Self {
        Self::Basic {
            username: digest(username),
            password: digest(password),
        }
    }

    /// Authenticate a request from its Authorization header.
    pub async fn authenticate(&self, authorization: Option<&str>) -> ApiResult<AuthenticatedCaller> {
        match self {
            Self::None => Ok(AuthenticatedCaller {
                username: "anonymous".to_string(),
            }),
            Self::Basic { username, password } => {
                let (user, pass) = authorization
                    .and_then(parse_basic)
                    .ok_or_else(|| ApiError::Unauthorized("basic credentials required".into()))?;
                // Compare digests so timing does not depend on the secret.
                if digest(&user) == *username && digest(&pass) == *password {
                    Ok(AuthenticatedCaller { username: user })
                } else {
                    Err(ApiError::Unauthorized("invalid credentials".into()))
                }
            }
            Self::Token(validator) => {
                let token = authorization
                    .and_then(parse_bearer)
                    .ok_or_else(|| ApiError::Unauthorized("bearer token required".into()))?;
                let username = validator.validate(token).await?;
                Ok(AuthenticatedCaller { username })
            }
        }
    }
}

/// Extract bearer token from an Authorization header value.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn parse_bearer(value: &str) -> Option<&str> {
    if value.len() >= 7 && value[..7].eq_ignore_ascii_case("bearer ") {
        Some(value[7..].trim()).filter(|t| !t.is_empty())
    } else {
        None
    }
}

/// Decode `Basic base64(user:pass)`.
fn parse_basic(value: &str) -> Option<(String, String)> {
    if value.len() < 6 || !value[..6].eq_ignore_ascii_case("basic ") {
        return None;
    }
    let decoded = STANDARD.decode(value[6..].trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Extract trace ID from X-Trace-Id header or generate a new one.
fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Assign a trace ID and run the request inside a span carrying it.
pub async fn trace_middleware(mut req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(&req);
    let span = tracing::info_span!("request", trace_id = %trace_id);
    req.extensions_mut().insert(trace_id);

    next.run(req).instrument(span).await
}

/// Authentication middleware for the broker API.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let caller = state.auth.authenticate(authorization).await?;
    debug!(caller = %caller.username, "Request authenticated");
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
