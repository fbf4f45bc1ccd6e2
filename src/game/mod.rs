//! Card deck and the turn engine that drives a single room's game.

pub mod deck;
pub mod engine;

pub use deck::Card;
pub use engine::{FlipOutcome, Game, GameError, Outcome, Phase, Player};
