//! Health check HTTP route handlers
//!
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/live` - Liveness probe with version
//! - `GET /health/ready` - Readiness check (relational store and object store)
//!
//! Health paths take precedence over object keys of the same name.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::storage::ObjectStore;

/// Status of an individual dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

/// Result of a single dependency check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub name: &'static str,
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceHealth {
    fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: None,
            details: None,
        }
    }

    fn unhealthy(name: &'static str, error: impl Into<String>) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: None,
            error: Some(error.into()),
            details: None,
        }
    }
}

/// Aggregated readiness response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: ServiceStatus,
    pub services: Vec<ServiceHealth>,
    pub version: &'static str,
}

impl HealthCheckResponse {
    fn from_services(services: Vec<ServiceHealth>) -> Self {
        let status = if services
            .iter()
            .all(|s| s.status == ServiceStatus::Healthy)
        {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Shared state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    pub pool: SqlitePool,
    pub object_store: Option<Arc<dyn ObjectStore>>,
}

impl HealthState {
    pub fn new(pool: SqlitePool, object_store: Option<Arc<dyn ObjectStore>>) -> Self {
        Self { pool, object_store }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(simple_health))
        .route("/health/live", get(liveness_probe))
        .route("/health/ready", get(readiness_probe))
        .with_state(state)
}

/// Simple health check - always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness probe; does not touch dependencies
async fn liveness_probe() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe
///
/// # Response
/// - 200 OK when the database answers and an object store is bound
/// - 503 Service Unavailable otherwise
async fn readiness_probe(State(state): State<HealthState>) -> impl IntoResponse {
    let database = check_database(&state.pool).await;

    let object_store = match &state.object_store {
        Some(store) => {
            let mut health = ServiceHealth::healthy("object_store", Duration::ZERO);
            health.response_time_ms = None;
            health.details = Some(serde_json::json!({ "backend": store.backend_name() }));
            health
        }
        None => ServiceHealth::unhealthy("object_store", "object storage not configured"),
    };

    let response = HealthCheckResponse::from_services(vec![database, object_store]);
    let status_code = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

async fn check_database(pool: &SqlitePool) -> ServiceHealth {
    let start = Instant::now();
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => ServiceHealth::healthy("database", start.elapsed()),
        Err(e) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            ServiceHealth::unhealthy("database", e.to_string())
        }
    }
}
