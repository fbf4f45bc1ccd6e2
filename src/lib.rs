//! Two-player online memory: rooms, turn engine and the socket server.

pub mod config;
pub mod game;
pub mod http;
pub mod room;
pub mod telemetry;
pub mod util;
pub mod ws;
