//! HTTP surface for health monitoring and operator recovery.
//!
//! # Responsibilities
//! - `GET /ai/health`: SystemHealth JSON, polled by the monitoring widget
//! - `POST /ai/reset`: force-clear all breaker/tracker state (Bearer-guarded)
//!
//! # Design Decisions
//! - The gateway does not own a listener; the embedding application mounts
//!   this router wherever it serves HTTP
//! - Health is read-only and unauthenticated; reset mutates and requires the
//!   configured API key

pub mod auth;
pub mod handlers;

use crate::config::MonitoringConfig;
use crate::health::SystemHealthAggregator;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use self::auth::bearer_auth_middleware;
use self::handlers::{get_system_health, reset_system};

/// State injected into API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub aggregator: Arc<SystemHealthAggregator>,
    pub api_key: String,
}

/// Build the gateway's API router.
pub fn router(aggregator: Arc<SystemHealthAggregator>, config: &MonitoringConfig) -> Router {
    let state = ApiState {
        aggregator,
        api_key: config.api_key.clone(),
    };

    let protected = Router::new()
        .route("/ai/reset", post(reset_system))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_middleware,
        ));

    Router::new()
        .route("/ai/health", get(get_system_health))
        .merge(protected)
        .with_state(state)
}
