//! Open Service Broker HTTP front end.
//!
//! This crate provides the broker-facing surface:
//! - OSB v2 catalog, instance and binding endpoints
//! - Inbound authentication (none, basic, TokenReview)
//! - The protocol bridge translating verbs into executor calls
//! - Prometheus metrics and a liveness probe

pub mod auth;
pub mod broker;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod osb;
pub mod routes;
pub mod state;

pub use auth::{Authenticator, TraceId};
pub use broker::{Broker, OperationOutcome};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
