//! WebSocket connection lifecycle management.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::{extract::State, response::IntoResponse};
use futures::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::mpsc;

use crate::game::Player;
use crate::http::routes::AppState;
use crate::room::manager::{Outbox, RoomError, RoomManager};
use crate::util::id::new_player_id;
use crate::ws::protocol::{ClientMessage, ServerMessage, Welcome, JOIN_REJECTED_TEXT};

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.rooms))
}

async fn handle_socket(socket: WebSocket, rooms: RoomManager) {
    let player_id = new_player_id();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward queued server events onto the socket.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(%err, "failed to encode server message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    tracing::debug!(player = %player_id, "ws connected");
    let _ = tx.send(ServerMessage::Welcome(Welcome { player_id: player_id.clone() }));

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => dispatch(&rooms, &player_id, &tx, msg),
                Err(err) => {
                    let _ = tx.send(ServerMessage::Error(format!("Bad message: {err}")));
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    rooms.remove_player(&player_id);
    writer.abort();
    tracing::debug!(player = %player_id, "ws closed");
}

fn dispatch(rooms: &RoomManager, player_id: &str, outbox: &Outbox, msg: ClientMessage) {
    match msg {
        ClientMessage::JoinGame(join) => {
            let player = Player::new(player_id, display_name(&join.player_name));
            let code = join.room_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
            let result = match code {
                None => rooms.create_room(player, outbox.clone()).map(drop),
                Some(code) => rooms.join_room(code, player, outbox.clone()).map(drop),
            };
            if let Err(err) = result {
                tracing::debug!(player = %player_id, ?code, %err, "join rejected");
                let text = match err {
                    RoomError::NotFound | RoomError::Full => JOIN_REJECTED_TEXT.to_string(),
                    other => other.to_string(),
                };
                let _ = outbox.send(ServerMessage::Error(text));
            }
        }
        ClientMessage::FlipCard(flip) => {
            if let Err(err) = rooms.flip(&flip.room_code, player_id, flip.card_index) {
                tracing::debug!(player = %player_id, room = %flip.room_code, card = flip.card_index, %err, "flip rejected");
                let _ = outbox.send(ServerMessage::Error(err.to_string()));
            }
        }
    }
}

/// Players who leave the name blank get a generated one.
fn display_name(requested: &str) -> String {
    let name = requested.trim();
    if name.is_empty() {
        format!("Spieler {}", rand::thread_rng().gen_range(0..100))
    } else {
        name.to_string()
    }
}
