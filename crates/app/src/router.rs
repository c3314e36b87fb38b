use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use domain_radar_dns::AvailabilityChecker;
use domain_radar_storage::Database;

use crate::{domains, platforms, status, telemetry};

pub const SERVICE_MESSAGE: &str = "Domain Radar API";

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    storage: Database,
    checker: AvailabilityChecker,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database, checker: AvailabilityChecker) -> Self {
        Self {
            metrics,
            storage,
            checker,
            clock: Arc::new(Utc::now),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn storage(&self) -> &Database {
        &self.storage
    }

    pub fn checker(&self) -> &AvailabilityChecker {
        &self.checker
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api", get(root))
        .route("/api/", get(root))
        .route("/api/check-domain", post(domains::check_domain))
        .route("/api/domain-history", get(domains::history))
        .route(
            "/api/platforms",
            get(platforms::list).post(platforms::create),
        )
        .route(
            "/api/platforms/:id",
            put(platforms::update).delete(platforms::delete),
        )
        .route("/api/status", get(status::list).post(status::create))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": SERVICE_MESSAGE }))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> Response {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use axum::http::Request;
    use domain_radar_dns::{DnsProbe, LookupError, RecordQuery};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Probe that reports A records for hosts listed as taken and NXDOMAIN otherwise.
    pub struct StaticProbe {
        pub taken: Vec<&'static str>,
    }

    #[async_trait]
    impl DnsProbe for StaticProbe {
        async fn probe(&self, host: &str, _query: RecordQuery) -> Result<(), LookupError> {
            if self.taken.contains(&host) {
                Ok(())
            } else {
                Err(LookupError::NxDomain)
            }
        }
    }

    pub async fn setup_state(taken: Vec<&'static str>) -> AppState {
        let metrics = telemetry::init_metrics();
        let database = Database::connect("sqlite::memory:?cache=shared")
            .await
            .expect("connect");
        database.run_migrations().await.expect("migrations");

        let checker = AvailabilityChecker::new(Arc::new(StaticProbe { taken }))
            .with_deadline(Duration::from_millis(200));
        AppState::new(metrics, database, checker)
    }

    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("handler should respond");
        let status = response.status();
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        let bytes = collected.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }
}
