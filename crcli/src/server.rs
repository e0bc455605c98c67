//! HTTP API
//!
//! - `GET  /api/v1/3d-secure/lookup?pan=` - range containing a PAN
//! - `POST /api/v1/3d-secure/pres` - bulk ingest of a PRes message
//! - `GET  /api/v1/3d-secure/index/stats` - published index metrics
//!
//! Directory calls block (store I/O), so handlers hop onto the blocking pool.

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cardrange::{pan, PResMessage, RangeDirectory};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type AppState = Arc<RangeDirectory>;

#[derive(Debug, Deserialize)]
struct LookupParams {
    pan: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn router(dir: AppState) -> Router {
    Router::new()
        .route("/api/v1/3d-secure/lookup", get(handle_lookup))
        .route("/api/v1/3d-secure/pres", post(handle_pres))
        .route("/api/v1/3d-secure/index/stats", get(handle_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(dir)
}

pub async fn run(dir: AppState, listen: SocketAddr) -> anyhow::Result<()> {
    let app = router(dir);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;

    info!(address = %listen, "Server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Handle GET /api/v1/3d-secure/lookup
async fn handle_lookup(
    State(dir): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Some(raw) = params.pan else {
        return error_response(StatusCode::BAD_REQUEST, "missing required parameter: pan");
    };
    let Some(pan) = pan::parse_strict(&raw) else {
        return error_response(StatusCode::BAD_REQUEST, format!("PAN must be an integer, got {:?}", raw));
    };

    let result = tokio::task::spawn_blocking(move || dir.lookups().by_pan(Some(pan))).await;
    match result {
        Ok(Ok(Some(range))) => (StatusCode::OK, Json(range)).into_response(),
        Ok(Ok(None)) => StatusCode::NOT_FOUND.into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "Lookup failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Lookup task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "lookup task failed")
        }
    }
}

/// Handle POST /api/v1/3d-secure/pres
async fn handle_pres(State(dir): State<AppState>, Json(message): Json<PResMessage>) -> Response {
    let result = tokio::task::spawn_blocking(move || dir.ranges().process_pres(&message)).await;
    match result {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!(error = %e, "Ingest task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "ingest task failed")
        }
    }
}

/// Handle GET /api/v1/3d-secure/index/stats
async fn handle_stats(State(dir): State<AppState>) -> impl IntoResponse {
    Json(dir.index_stats())
}
