use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::any,
};
use tracing::{debug, info, warn};

use crate::{playout::ChannelSink, server::AppState};

/// Every path on the listener port accepts a listener connection.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(websocket_handler))
        .route("/{*path}", any(websocket_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Attaches the socket as the active session and forwards encoded chunks
/// until either side goes away.
///
/// The engine writes into a bounded queue; this task is the only consumer.
/// Closing the sink (pre-emption, shutdown) drops the sender, so the queue
/// drains and the loop ends.
pub async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let engine = &state.engine;
    let (sink, rx) = ChannelSink::new(engine.config().write_queue_capacity);
    let sink = Arc::new(sink);

    let session_id = match engine.attach(sink.clone()) {
        Ok(id) => id,
        Err(e) => {
            warn!("Rejecting listener: {}", e);
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    info!("Listener connected: session={}", session_id);

    loop {
        tokio::select! {
            chunk = rx.recv_async() => {
                let Ok(chunk) = chunk else {
                    debug!("Sink closed: session={}", session_id);
                    break;
                };
                if let Err(e) = socket.send(Message::Binary(chunk)).await {
                    warn!("Socket send error: session={} err={}", session_id, e);
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error: session={} err={}", session_id, e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    if engine.detach_session(&session_id) {
        info!("Listener disconnected: session={}", session_id);
    }
    drop(sink);
    let _ = socket.send(Message::Close(None)).await;
}
