// WebSocket stream: pushes the full gateway view on connect and after publishes.
// Publishes that land before the next send are coalesced into one view.

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::time::{Duration, Instant, timeout};

use super::AppState;
use crate::pipeline::GatewayPipelines;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the WS client count on drop (connect = +1, drop = -1).
struct WsClientGuard(Arc<AtomicUsize>);

impl Drop for WsClientGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

pub(super) async fn ws_gateway(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Some(gateway) = state.gateways.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let conn_count = state.ws_clients.clone();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_gateway(socket, gateway, conn_count).await {
            tracing::info!("Gateway stream error: {}", e);
        }
    })
}

async fn send_view(socket: &mut WebSocket, gateway: &GatewayPipelines) -> anyhow::Result<bool> {
    let json = serde_json::to_string(&gateway.view())?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_gateway(
    mut socket: WebSocket,
    gateway: Arc<GatewayPipelines>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let _guard = WsClientGuard(conn_count);
    tracing::info!(gateway_id = gateway.id(), "Client connected to gateway stream");

    let mut throughput_rx = gateway.throughput.subscribe();
    let mut liveness_rx = gateway.liveness.subscribe();
    let mut device_rx = gateway.subscribe_device();

    if !send_view(&mut socket, &gateway).await? {
        return Ok(());
    }

    let mut ping_interval =
        tokio::time::interval_at(Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        let changed = tokio::select! {
            r = throughput_rx.changed() => r.is_ok(),
            r = liveness_rx.changed() => r.is_ok(),
            r = device_rx.changed() => r.is_ok(),
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
                continue;
            }
        };
        if !changed {
            break;
        }
        // The view below reads all three, so every pending change is covered by it.
        throughput_rx.mark_unchanged();
        liveness_rx.mark_unchanged();
        device_rx.mark_unchanged();
        if !send_view(&mut socket, &gateway).await? {
            break;
        }
    }
    Ok(())
}
