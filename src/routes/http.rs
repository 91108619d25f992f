// GET handlers: version, gateway list, per-gateway view and charts

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use super::AppState;
use crate::models::ChartSeries;
use crate::pipeline::{GatewayPipelines, GatewayView};
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/gateways: ids of the monitored gateways.
pub(super) async fn list_gateways(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "gateways": state.gateways.ids() }))
}

fn lookup(state: &AppState, id: &str) -> Result<Arc<GatewayPipelines>, StatusCode> {
    state.gateways.get(id).ok_or(StatusCode::NOT_FOUND)
}

/// GET /api/gateways/{id}: device context plus both charts.
pub(super) async fn gateway_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GatewayView>, StatusCode> {
    Ok(Json(lookup(&state, &id)?.view()))
}

pub(super) async fn throughput(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<ChartSeries>>, StatusCode> {
    Ok(Json(lookup(&state, &id)?.throughput.latest()))
}

pub(super) async fn liveness(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<ChartSeries>>, StatusCode> {
    Ok(Json(lookup(&state, &id)?.liveness.latest()))
}
