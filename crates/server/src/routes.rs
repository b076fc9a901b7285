//! Route configuration.

use crate::auth::{auth_middleware, trace_middleware};
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, put};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let broker_routes = Router::new()
        .route("/v2/catalog", get(handlers::get_catalog))
        .route(
            "/v2/service_instances/{instance_id}",
            put(handlers::provision)
                .patch(handlers::update)
                .delete(handlers::deprovision),
        )
        .route(
            "/v2/service_instances/{instance_id}/last_operation",
            get(handlers::last_operation),
        )
        .route(
            "/v2/service_instances/{instance_id}/service_bindings/{binding_id}",
            put(handlers::bind).delete(handlers::unbind),
        )
        // Only matched routes are authenticated; unknown paths still 404.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Health check (intentionally unauthenticated for kubelet probes)
    let mut router = Router::new()
        .merge(broker_routes)
        .route("/healthz", get(handlers::health_check));

    // SECURITY: When enabled, this endpoint MUST be network-restricted
    // to authorized Prometheus scraper IPs only.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    // Order of execution: TraceLayer -> trace id span -> (auth) -> handler
    router
        .layer(middleware::from_fn(trace_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
