// Copyright 2026 TruCite Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for the TruCite runtime.
//!
//! Every POST path that any client iteration has ever used (`/verify`,
//! `/score`, `/api/score`, `/truth-score`, `/api/evaluate`) routes to the
//! same verify handler, so front-ends built against older backends keep
//! resolving. CORS is wide open: the page calling this API is served from
//! another origin.

use crate::events::{self, TruCiteEvent};
use crate::policy;
use crate::protocol::{self, VerifyRequest, CANDIDATE_PATHS};
use crate::server::{self, SharedState};
use axum::extract::{MatchedPath, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<SharedState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/", get(status_page))
        .route("/health", get(health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/events", get(events_sse));

    for path in CANDIDATE_PATHS {
        app = app.route(path, post(handle_verify));
    }

    app.layer(cors).with_state(state)
}

/// Start the REST API server on the given port.
pub async fn start(port: u16, state: Arc<SharedState>) -> anyhow::Result<()> {
    let app = router(Arc::clone(&state));
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("TruCite API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    state.event_bus.emit(TruCiteEvent::RuntimeStarted {
        version: env!("CARGO_PKG_VERSION").to_string(),
        http_port: port,
    });
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

/// Serve the embedded status page.
async fn status_page() -> impl IntoResponse {
    Html(include_str!("status.html"))
}

async fn health() -> Json<Value> {
    let mut routes = vec!["/", "/health"];
    routes.extend(CANDIDATE_PATHS.iter().copied());
    routes.extend(["/api/v1/status", "/api/v1/events"]);
    Json(serde_json::json!({
        "service": "TruCite Backend",
        "status": "ok",
        "time_utc": Utc::now().to_rfc3339(),
        "routes": routes,
    }))
}

/// Runtime status for dashboards.
async fn handle_status(State(state): State<Arc<SharedState>>) -> Json<Value> {
    let uptime_s = state.started_at.elapsed().as_secs_f64();

    Json(serde_json::json!({
        "running": true,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_s": uptime_s as u64,
        "uptime_seconds": uptime_s,
        "policy_version": policy::POLICY_VERSION,
        "policy_hash": policy::policy_hash(),
        "policy_modes": ["standard", "strict", "permissive"],
        "evidence_source": state.evidence.name(),
        "audit_enabled": state.audit.is_some(),
    }))
}

/// The verify handler behind every candidate POST path.
async fn handle_verify(
    State(state): State<Arc<SharedState>>,
    path: MatchedPath,
    Json(body): Json<Value>,
) -> Response {
    let request: VerifyRequest = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                server::E_INVALID_PARAMS,
                &format!("invalid request body: {e}"),
            );
        }
    };

    if request.text.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            server::E_EMPTY_TEXT,
            "text must be non-empty",
        );
    }

    match server::run_verify(&state, &request, path.as_str()).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            server::E_INTERNAL,
            &format!("{e:#}"),
        ),
    }
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(protocol::error_body(code, message))).into_response()
}

/// SSE query parameters.
#[derive(serde::Deserialize, Default)]
struct EventsParams {
    event_id: Option<String>,
}

/// Server-Sent Events endpoint for real-time event streaming.
///
/// Subscribes to the global event bus and streams events as SSE.
/// Optionally filters to one verification via `?event_id=...`.
async fn events_sse(
    Query(params): Query<EventsParams>,
    State(state): State<Arc<SharedState>>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.event_bus.subscribe();
    let id_filter = params.event_id;

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    // Filter by event id if specified
                    if let Some(ref id) = id_filter {
                        if !events::event_matches_id(&event, id) {
                            continue;
                        }
                    }
                    if let Ok(json) = serde_json::to_string(&event) {
                        yield Ok(Event::default().data(json));
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                    // Missed some events due to slow consumer — continue
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(axum::response::sse::KeepAlive::default())
}
