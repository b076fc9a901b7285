//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use osbridge_core::config::AppConfig;
use osbridge_executor::{Executor, MockExecutor};
use osbridge_server::{AppState, Authenticator, Broker, create_router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Service ID the test catalog is built with.
#[allow(dead_code)]
pub const SERVICE_ID: &str = "4be12541-2945-4101-8a33-79ac0ad58750";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
}

#[allow(dead_code)]
impl TestServer {
    /// Test server over a fresh mock executor with no authentication.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// Send a request and return status and parsed JSON body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_auth(method, uri, body, None).await
    }

    /// Like [`Self::request`], with an Authorization header value.
    pub async fn request_with_auth(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };
        let (status, bytes) = self.send(builder.body(body).unwrap()).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Send a raw request and return status and body bytes.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}

/// Builder for [`TestServer`].
#[allow(dead_code)]
pub struct TestServerBuilder {
    config: AppConfig,
    executor: Arc<dyn Executor>,
    auth: Authenticator,
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self {
            config: AppConfig::for_testing(),
            executor: Arc::new(MockExecutor::new()),
            auth: Authenticator::None,
        }
    }
}

#[allow(dead_code)]
impl TestServerBuilder {
    pub fn async_enabled(mut self, enabled: bool) -> Self {
        self.config.broker.async_enabled = enabled;
        self
    }

    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        self.config.server.metrics_enabled = enabled;
        self
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn auth(mut self, auth: Authenticator) -> Self {
        self.auth = auth;
        self
    }

    pub fn build(self) -> TestServer {
        osbridge_server::metrics::register_metrics();

        let service_id = self
            .config
            .broker
            .service_id
            .clone()
            .unwrap_or_else(|| SERVICE_ID.to_string());
        let broker = Broker::new(self.executor, &service_id, self.config.broker.async_enabled);
        let state = AppState::new(self.config, broker, self.auth);
        let router = create_router(state.clone());

        TestServer { router, state }
    }
}
