//! Turn engine: per-room state machine for flips, matching and scoring.
//!
//! ```text
//! WaitingForPlayer -> InProgress -> Resolving -> InProgress | Finished
//! ```
//!
//! A room sits in `WaitingForPlayer` until the second player takes a seat.
//! Every legal flip reveals one card. The second card of a turn is evaluated
//! right away: a match scores and keeps the turn, a mismatch parks the game in
//! `Resolving` until [`Game::settle_mismatch`] turns both cards back and hands
//! the turn over. Losing a player mid-game moves the room to `Abandoned`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::deck::{build_deck, Card};

/// Seats per room.
pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), score: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForPlayer,
    InProgress,
    /// Two unequal cards are face up; the board is locked until they settle.
    Resolving { first: usize, second: usize },
    Finished,
    Abandoned,
}

/// What a legal flip did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipOutcome {
    /// First card of the turn is face up.
    Revealed,
    /// Pair found; the same player continues.
    Matched,
    /// Pair differs; the game waits in `Resolving`.
    Mismatched,
    /// Last pair found.
    GameOver(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Outcome {
    #[serde(rename_all = "camelCase")]
    Winner { player_id: String, name: String },
    Draw,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("board is locked")]
    BoardLocked,
    #[error("card {0} is already revealed")]
    CardAlreadyRevealed(usize),
    #[error("there is no card {0}")]
    InvalidCard(usize),
    #[error("game is not in progress")]
    GameNotActive,
    #[error("no free seat")]
    NoFreeSeat,
    #[error("already seated in this room")]
    AlreadySeated,
    #[error("pair count {0} is outside 1..=45")]
    InvalidPairCount(usize),
    #[error("nothing to resolve")]
    NothingToResolve,
}

#[derive(Debug, Clone)]
pub struct Game {
    players: Vec<Player>,
    cards: Vec<Card>,
    total_pairs: usize,
    current: usize,
    /// First card of the current turn while `InProgress`.
    pending: Option<usize>,
    matches_found: usize,
    phase: Phase,
}

impl Game {
    /// Deal a fresh random deck for `host`.
    pub fn new<R: Rng + ?Sized>(host: Player, total_pairs: usize, rng: &mut R) -> Result<Self, GameError> {
        let cards = build_deck(total_pairs, rng)?;
        Self::with_cards(host, cards)
    }

    /// Start a game over a fixed card layout. The layout must hold at least
    /// one pair and an even number of cards.
    pub fn with_cards(host: Player, cards: Vec<Card>) -> Result<Self, GameError> {
        if cards.is_empty() || cards.len() % 2 != 0 {
            return Err(GameError::InvalidPairCount(cards.len() / 2));
        }
        Ok(Self {
            players: vec![host],
            total_pairs: cards.len() / 2,
            cards,
            current: 0,
            pending: None,
            matches_found: 0,
            phase: Phase::WaitingForPlayer,
        })
    }

    /// Seat the second player. The game starts once both seats are taken.
    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.phase != Phase::WaitingForPlayer || self.players.len() >= MAX_PLAYERS {
            return Err(GameError::NoFreeSeat);
        }
        if self.has_player(&player.id) {
            return Err(GameError::AlreadySeated);
        }
        self.players.push(player);
        if self.players.len() == MAX_PLAYERS {
            self.phase = Phase::InProgress;
        }
        Ok(())
    }

    /// Drop every seat held by `player_id`. A running game is abandoned;
    /// nobody wins it.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == player_id)?;
        let removed = self.players.remove(idx);
        self.players.retain(|p| p.id != player_id);
        if matches!(self.phase, Phase::InProgress | Phase::Resolving { .. }) {
            self.phase = Phase::Abandoned;
        }
        if self.current >= self.players.len() {
            self.current = 0;
        }
        Some(removed)
    }

    pub fn flip(&mut self, player_id: &str, card_index: usize) -> Result<FlipOutcome, GameError> {
        match self.phase {
            Phase::InProgress => {}
            Phase::Resolving { .. } => return Err(GameError::BoardLocked),
            Phase::WaitingForPlayer | Phase::Finished | Phase::Abandoned => {
                return Err(GameError::GameNotActive)
            }
        }
        if self.players.get(self.current).map(|p| p.id.as_str()) != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }
        let card = self.cards.get_mut(card_index).ok_or(GameError::InvalidCard(card_index))?;
        if card.is_revealed() {
            return Err(GameError::CardAlreadyRevealed(card_index));
        }
        card.is_flipped = true;

        let Some(first) = self.pending.take() else {
            self.pending = Some(card_index);
            return Ok(FlipOutcome::Revealed);
        };
        let second = card_index;

        if self.cards[first].image != self.cards[second].image {
            self.phase = Phase::Resolving { first, second };
            return Ok(FlipOutcome::Mismatched);
        }

        for idx in [first, second] {
            self.cards[idx].is_matched = true;
        }
        self.players[self.current].score += 1;
        self.matches_found += 1;

        if self.matches_found == self.total_pairs {
            self.phase = Phase::Finished;
            return Ok(FlipOutcome::GameOver(self.decide()));
        }
        Ok(FlipOutcome::Matched)
    }

    /// Turn a mismatched pair face down and pass the turn on.
    pub fn settle_mismatch(&mut self) -> Result<(usize, usize), GameError> {
        let Phase::Resolving { first, second } = self.phase else {
            return Err(GameError::NothingToResolve);
        };
        for idx in [first, second] {
            self.cards[idx].is_flipped = false;
        }
        self.current = (self.current + 1) % self.players.len().max(1);
        self.phase = Phase::InProgress;
        Ok((first, second))
    }

    /// Final result, once every pair is found.
    pub fn outcome(&self) -> Option<Outcome> {
        (self.phase == Phase::Finished).then(|| self.decide())
    }

    fn decide(&self) -> Outcome {
        let best = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        let mut leaders = self.players.iter().filter(|p| p.score == best);
        match (leaders.next(), leaders.next()) {
            (Some(winner), None) => Outcome::Winner { player_id: winner.id.clone(), name: winner.name.clone() },
            _ => Outcome::Draw,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    pub fn matches_found(&self) -> usize {
        self.matches_found
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_player_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    pub fn is_board_locked(&self) -> bool {
        matches!(self.phase, Phase::Resolving { .. })
    }

    /// Face-up cards awaiting evaluation, in flip order.
    pub fn pending_flips(&self) -> Vec<usize> {
        match (self.phase, self.pending) {
            (Phase::Resolving { first, second }, _) => vec![first, second],
            (_, Some(first)) => vec![first],
            _ => Vec::new(),
        }
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
