// HTTP + WebSocket routes serving published charts to the renderer

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::GatewayRegistry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) gateways: Arc<GatewayRegistry>,
    pub(crate) ws_clients: Arc<AtomicUsize>,
}

pub fn app(gateways: Arc<GatewayRegistry>, ws_clients: Arc<AtomicUsize>) -> Router {
    let state = AppState {
        gateways,
        ws_clients,
    };
    Router::new()
        .route("/", get(|| async { "Gateway telemetry" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/gateways", get(http::list_gateways)) // GET /api/gateways
        .route("/api/gateways/{id}", get(http::gateway_view)) // GET /api/gateways/{id}
        .route("/api/gateways/{id}/throughput", get(http::throughput)) // GET .../throughput
        .route("/api/gateways/{id}/liveness", get(http::liveness)) // GET .../liveness
        .route("/ws/gateways/{id}", get(ws::ws_gateway)) // WS /ws/gateways/{id}
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
