use axum::extract::ws::WebSocket;
use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::handlers;
use crate::session::{ServerMessage, TranslationPanel};
use crate::state::AppState;

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = state.generate_client_uid();
    info!("New WebSocket connection: {}", client_uid);

    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let (view_tx, mut view_rx) = mpsc::unbounded_channel();

    let panel = TranslationPanel::new(state.translator.clone(), view_tx);
    state.sessions.insert(client_uid.clone(), panel.clone());

    // Panel snapshots and protocol errors share one writer.
    let views = {
        let outbound_tx = outbound_tx.clone();
        tokio::spawn(async move {
            while let Some(view) = view_rx.recv().await {
                if outbound_tx.send(ServerMessage::PanelState(view)).is_err() {
                    break;
                }
            }
        })
    };

    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                warn!("Failed to send message: {}", e);
                break;
            }
        }
    });

    panel.publish().await;

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = handlers::handle_message(&panel, &client_uid, &text).await {
                    warn!("Rejected message from {}: {}", client_uid, e);
                    let _ = outbound_tx.send(ServerMessage::Error {
                        message: e.to_string(),
                    });
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup. A translation still in flight finishes on its own and its
    // snapshot goes nowhere.
    panel.cancel().await;
    state.sessions.remove(&client_uid);
    views.abort();
    writer.abort();

    info!("Cleaned up client {}", client_uid);
}
