use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, TextEncoder, register_histogram_vec,
    register_int_counter_vec, register_int_gauge,
};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};

pub static TOOL_CALLS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "moon_banking_tool_calls_total",
        "Tool invocations by tool and outcome",
        &["tool", "outcome"]
    )
    .unwrap()
});

pub static CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "moon_banking_tool_call_duration_ms",
        "Wall time of a tool invocation in milliseconds",
        &["tool"],
        vec![10.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 30_000.0]
    )
    .unwrap()
});

pub static INFLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("moon_banking_inflight_calls", "Tool invocations in flight").unwrap()
});

/// Holds the in-flight gauge up for the lifetime of one call.
pub struct InflightGuard;

impl InflightGuard {
    pub fn new() -> Self {
        INFLIGHT.inc();
        InflightGuard
    }
}

impl Default for InflightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        INFLIGHT.dec();
    }
}

/// Record one finished invocation. `outcome` is `ok` or an error kind.
pub fn record_call(tool: &str, outcome: &str, elapsed: Duration) {
    TOOL_CALLS.with_label_values(&[tool, outcome]).inc();
    CALL_DURATION
        .with_label_values(&[tool])
        .observe(elapsed.as_secs_f64() * 1000.0);
}

#[derive(Clone, Debug)]
pub struct MetricsServerConfig {
    pub addr: SocketAddr,
    pub auth_token: Option<String>,
}

#[derive(Clone)]
struct MetricsState {
    auth_token: Option<String>,
}

pub fn router(auth_token: Option<String>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetricsState { auth_token })
}

pub async fn spawn_metrics_server(config: MetricsServerConfig) {
    let MetricsServerConfig { addr, auth_token } = config;
    let app = router(auth_token);

    tokio::spawn(async move {
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!(%addr, "metrics server starting");
                if let Err(err) = axum::serve(listener, app.into_make_service()).await {
                    error!(%addr, %err, "metrics server terminated");
                }
            }
            Err(err) => {
                error!(%addr, %err, "failed to bind metrics listener");
            }
        }
    });
}

async fn metrics_handler(
    State(state): State<MetricsState>,
    headers: HeaderMap,
) -> axum::response::Response {
    if let Some(token) = &state.auth_token {
        if !is_authorized(headers.get(http::header::AUTHORIZATION), token) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buf = Vec::new();
    if let Err(err) = encoder.encode(&families, &mut buf) {
        error!(%err, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response();
    }

    let content_type = HeaderValue::from_str(encoder.format_type())
        .unwrap_or(HeaderValue::from_static("text/plain"));
    ([(http::header::CONTENT_TYPE, content_type)], buf).into_response()
}

fn is_authorized(header: Option<&HeaderValue>, token: &str) -> bool {
    match header.and_then(|value| value.to_str().ok()) {
        Some(value) => value
            .strip_prefix("Bearer ")
            .map(|presented| presented.trim() == token)
            .unwrap_or(false),
        None => false,
    }
}
