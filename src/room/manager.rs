//! Registry of rooms and task orchestration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::game::{FlipOutcome, Game, GameError, Player};
use crate::util::id::{new_room_code, normalize_room_code};
use crate::ws::protocol::{Effect, RoomSnapshot, ServerMessage};

/// Outbound queue of one connection.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone, Copy)]
pub struct RoomSettings {
    pub total_pairs: usize,
    /// How long a mismatched pair stays face up.
    pub flip_back_delay: Duration,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self { total_pairs: 12, flip_back_delay: Duration::from_millis(1500) }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,
    #[error("room full")]
    Full,
    #[error(transparent)]
    Game(#[from] GameError),
}

struct RoomSlot {
    code: String,
    state: Mutex<RoomState>,
}

struct RoomState {
    game: Game,
    members: HashMap<String, Outbox>,
    /// Pending flip-back of a mismatched pair.
    resolver: Option<JoinHandle<()>>,
}

impl RoomState {
    fn snapshot(&self, code: &str) -> RoomSnapshot {
        RoomSnapshot::capture(code, &self.game)
    }

    fn broadcast(&self, msg: &ServerMessage) {
        for (player_id, tx) in &self.members {
            if tx.send(msg.clone()).is_err() {
                tracing::debug!(%player_id, "dropping message for closed connection");
            }
        }
    }

    fn send_to(&self, player_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.members.get(player_id) {
            if tx.send(msg).is_err() {
                tracing::debug!(%player_id, "dropping message for closed connection");
            }
        }
    }

    fn cancel_resolver(&mut self) {
        if let Some(task) = self.resolver.take() {
            task.abort();
        }
    }
}

#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<DashMap<String, Arc<RoomSlot>>>,
    settings: RoomSettings,
}

impl RoomManager {
    pub fn new(settings: RoomSettings) -> Self {
        Self { rooms: Arc::new(DashMap::new()), settings }
    }

    /// Open a room with `host` in the first seat and a freshly dealt deck.
    /// The host receives `roomCreated` with the code.
    pub fn create_room(&self, host: Player, outbox: Outbox) -> Result<String, RoomError> {
        let host_id = host.id.clone();
        let game = Game::new(host, self.settings.total_pairs, &mut rand::thread_rng())?;
        loop {
            let code = new_room_code();
            if let Entry::Vacant(slot) = self.rooms.entry(code.clone()) {
                let state = RoomState { game, members: HashMap::from([(host_id.clone(), outbox)]), resolver: None };
                state.send_to(&host_id, ServerMessage::RoomCreated(code.clone()));
                slot.insert(Arc::new(RoomSlot { code: code.clone(), state: Mutex::new(state) }));
                tracing::info!(room = %code, host = %host_id, "room created");
                return Ok(code);
            }
        }
    }

    /// Take the second seat and start the game for both players.
    pub fn join_room(&self, code: &str, player: Player, outbox: Outbox) -> Result<RoomSnapshot, RoomError> {
        let slot = self.slot(code)?;
        let mut state = slot.state.lock();
        let player_id = player.id.clone();
        state.game.add_player(player).map_err(|err| match err {
            GameError::NoFreeSeat => RoomError::Full,
            other => RoomError::Game(other),
        })?;
        state.members.insert(player_id.clone(), outbox);

        let snapshot = state.snapshot(&slot.code);
        state.broadcast(&ServerMessage::GameStarted(snapshot.clone()));
        tracing::info!(room = %slot.code, player = %player_id, "player joined, game started");
        Ok(snapshot)
    }

    /// Apply one flip and push the resulting events to the room.
    pub fn flip(&self, code: &str, player_id: &str, card_index: usize) -> Result<FlipOutcome, RoomError> {
        let slot = self.slot(code)?;
        let mut state = slot.state.lock();
        let outcome = state.game.flip(player_id, card_index)?;
        state.broadcast(&ServerMessage::UpdateGameState(state.snapshot(&slot.code)));

        match &outcome {
            FlipOutcome::Revealed => {}
            FlipOutcome::Matched => {
                state.broadcast(&ServerMessage::LockBoard(true));
                state.send_to(player_id, ServerMessage::EffectMessage(Effect::pair_found()));
                state.broadcast(&ServerMessage::UpdateGameState(state.snapshot(&slot.code)));
                state.broadcast(&ServerMessage::LockBoard(false));
            }
            FlipOutcome::Mismatched => {
                state.broadcast(&ServerMessage::LockBoard(true));
                state.resolver = Some(self.schedule_flip_back(slot.code.clone()));
            }
            FlipOutcome::GameOver(result) => {
                state.broadcast(&ServerMessage::LockBoard(true));
                state.send_to(player_id, ServerMessage::EffectMessage(Effect::pair_found()));
                state.broadcast(&ServerMessage::GameEnded(state.snapshot(&slot.code)));
                tracing::info!(room = %slot.code, ?result, "game finished");
                drop(state);
                self.destroy(&slot.code);
            }
        }
        Ok(outcome)
    }

    fn schedule_flip_back(&self, code: String) -> JoinHandle<()> {
        let rooms = self.clone();
        let delay = self.settings.flip_back_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            rooms.flip_back(&code);
        })
    }

    /// Turn a mismatched pair face down again and hand the turn over.
    fn flip_back(&self, code: &str) {
        let Ok(slot) = self.slot(code) else { return };
        let mut state = slot.state.lock();
        state.resolver = None;
        match state.game.settle_mismatch() {
            Ok((first, second)) => {
                tracing::debug!(room = %slot.code, first, second, "mismatch settled");
                state.broadcast(&ServerMessage::UpdateGameState(state.snapshot(&slot.code)));
                state.broadcast(&ServerMessage::LockBoard(false));
            }
            Err(err) => tracing::debug!(room = %slot.code, %err, "flip-back skipped"),
        }
    }

    /// Remove a disconnected player from every room they sit in.
    /// Empty rooms are destroyed; anyone left behind gets `playerLeft`.
    pub fn remove_player(&self, player_id: &str) {
        let codes: Vec<String> = self
            .rooms
            .iter()
            .filter(|entry| entry.value().state.lock().game.has_player(player_id))
            .map(|entry| entry.key().clone())
            .collect();

        for code in codes {
            let Ok(slot) = self.slot(&code) else { continue };
            let mut state = slot.state.lock();
            if state.game.remove_player(player_id).is_none() {
                continue;
            }
            state.members.remove(player_id);
            state.cancel_resolver();
            tracing::info!(room = %code, player = %player_id, "player left");

            if state.game.is_empty() {
                drop(state);
                self.destroy(&code);
            } else {
                state.broadcast(&ServerMessage::PlayerLeft(state.snapshot(&code)));
            }
        }
    }

    fn destroy(&self, code: &str) {
        if let Some((_, slot)) = self.rooms.remove(code) {
            slot.state.lock().cancel_resolver();
            tracing::info!(room = %code, "room closed");
        }
    }

    pub fn snapshot(&self, code: &str) -> Option<RoomSnapshot> {
        let slot = self.slot(code).ok()?;
        let state = slot.state.lock();
        Some(state.snapshot(&slot.code))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn slot(&self, code: &str) -> Result<Arc<RoomSlot>, RoomError> {
        self.rooms
            .get(&normalize_room_code(code))
            .map(|entry| entry.value().clone())
            .ok_or(RoomError::NotFound)
    }
}
