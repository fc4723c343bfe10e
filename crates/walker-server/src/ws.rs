//! WebSocket endpoint driving the browser visualization.

use crate::api::AppState;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::Session;
use axum::extract::{
    ws::{Message, WebSocket, WebSocketUpgrade},
    State,
};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};

/// Axum handler for WebSocket upgrade at `/ws`
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

/// Answer each text frame with exactly one reply, in order
///
/// Frames that are not valid JSON messages get an `error` reply; binary,
/// ping and pong frames are ignored.
pub async fn serve_socket(websocket: WebSocket, state: AppState) {
    info!("New WebSocket connection");

    let (mut sender, mut receiver) = websocket.split();

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by client");
                break;
            }
            Ok(_) => continue,
            Err(err) => {
                error!("WebSocket error: {err}");
                break;
            }
        };

        debug!("WS -> server: {}", text);
        let reply = reply_to(&state.session, &text);

        let json_text = match serde_json::to_string(&reply) {
            Ok(text) => text,
            Err(err) => {
                warn!("Failed to serialize reply: {err}");
                continue;
            }
        };

        if sender.send(Message::Text(json_text)).await.is_err() {
            info!("WebSocket closed (send failed)");
            break;
        }
    }

    info!("WebSocket connection closed");
}

/// Parse one text frame and answer it
pub fn reply_to(session: &Session, text: &str) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(request) => session.handle(request),
        Err(err) => {
            warn!("Failed to parse JSON request: {err}");
            ServerMessage::Error {
                message: format!("invalid message: {}", err),
            }
        }
    }
}
