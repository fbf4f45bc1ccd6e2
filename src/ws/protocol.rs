//! Wire messages exchanged over the game socket.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}` with
//! camelCase event names, mirroring the event-emitter style the browser
//! client is written against.

use serde::{Deserialize, Serialize};

use crate::game::{Card, Game, Outcome, Player};

/// Text shown to a player who just found a pair.
pub const PAIR_FOUND_TEXT: &str = "Paar gefunden!";
/// Reply to a join that names an unknown or full room.
pub const JOIN_REJECTED_TEXT: &str = "Der Raum ist voll oder existiert nicht.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinGame(JoinGame),
    FlipCard(FlipCard),
}

/// An empty or missing `room_code` asks for a new room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGame {
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub room_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipCard {
    pub card_index: usize,
    pub room_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Welcome(Welcome),
    RoomCreated(String),
    GameStarted(RoomSnapshot),
    UpdateGameState(RoomSnapshot),
    LockBoard(bool),
    EffectMessage(Effect),
    GameEnded(RoomSnapshot),
    PlayerLeft(RoomSnapshot),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub text: String,
    pub style: String,
}

impl Effect {
    pub fn pair_found() -> Self {
        Self { text: PAIR_FOUND_TEXT.to_string(), style: String::new() }
    }
}

/// Full public view of a room, sent with every state broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_code: String,
    pub players: Vec<Player>,
    pub cards: Vec<Card>,
    pub total_pairs: usize,
    pub current_player_index: usize,
    pub flipped_cards: Vec<usize>,
    pub lock_board: bool,
    pub matches_found: usize,
    pub outcome: Option<Outcome>,
}

impl RoomSnapshot {
    pub fn capture(room_code: &str, game: &Game) -> Self {
        Self {
            room_code: room_code.to_string(),
            players: game.players().to_vec(),
            cards: game.cards().to_vec(),
            total_pairs: game.total_pairs(),
            current_player_index: game.current_player_index(),
            flipped_cards: game.pending_flips(),
            lock_board: game.is_board_locked(),
            matches_found: game.matches_found(),
            outcome: game.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn client_events_parse_from_envelope() {
        let raw = r#"{"event":"joinGame","data":{"playerName":"Anna","roomCode":""}}"#;
        let ClientMessage::JoinGame(join) = serde_json::from_str(raw).unwrap() else {
            panic!("expected joinGame");
        };
        assert_eq!(join.player_name, "Anna");
        assert_eq!(join.room_code.as_deref(), Some(""));

        let raw = r#"{"event":"joinGame","data":{}}"#;
        let ClientMessage::JoinGame(join) = serde_json::from_str(raw).unwrap() else {
            panic!("expected joinGame");
        };
        assert!(join.room_code.is_none());

        let raw = r#"{"event":"flipCard","data":{"cardIndex":3,"roomCode":"AB12CD"}}"#;
        let ClientMessage::FlipCard(flip) = serde_json::from_str(raw).unwrap() else {
            panic!("expected flipCard");
        };
        assert_eq!(flip.card_index, 3);
        assert_eq!(flip.room_code, "AB12CD");
    }

    #[test]
    fn unknown_event_is_an_error() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"event":"cheat","data":{}}"#).is_err());
    }

    #[test]
    fn room_snapshot_uses_client_field_names() {
        let mut game = Game::with_cards(Player::new("p1", "Anna"), vec![Card::face_down("a"), Card::face_down("a")]).unwrap();
        game.add_player(Player::new("p2", "Ben")).unwrap();
        game.flip("p1", 0).unwrap();

        let msg = ServerMessage::UpdateGameState(RoomSnapshot::capture("AB12CD", &game));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "updateGameState",
                "data": {
                    "roomCode": "AB12CD",
                    "players": [
                        {"id": "p1", "name": "Anna", "score": 0},
                        {"id": "p2", "name": "Ben", "score": 0}
                    ],
                    "cards": [
                        {"image": "a", "isFlipped": true, "isMatched": false},
                        {"image": "a", "isFlipped": false, "isMatched": false}
                    ],
                    "totalPairs": 1,
                    "currentPlayerIndex": 0,
                    "flippedCards": [0],
                    "lockBoard": false,
                    "matchesFound": 0,
                    "outcome": null
                }
            })
        );
    }

    #[test]
    fn scalar_events_and_outcome_shape() {
        assert_eq!(
            serde_json::to_value(ServerMessage::LockBoard(true)).unwrap(),
            json!({"event": "lockBoard", "data": true})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::RoomCreated("XYZ123".into())).unwrap(),
            json!({"event": "roomCreated", "data": "XYZ123"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::EffectMessage(Effect::pair_found())).unwrap(),
            json!({"event": "effectMessage", "data": {"text": "Paar gefunden!", "style": ""}})
        );
        assert_eq!(
            serde_json::to_value(Outcome::Winner { player_id: "p1".into(), name: "Anna".into() }).unwrap(),
            json!({"result": "winner", "playerId": "p1", "name": "Anna"})
        );
        assert_eq!(serde_json::to_value(Outcome::Draw).unwrap(), json!({"result": "draw"}));
    }
}
