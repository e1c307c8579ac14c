//! Core Chain Reaction rules: board representation, cascade resolution and
//! the match state machine.

mod board;
pub mod cascade;
mod player;
mod state;

pub use board::{Board, Cell, Coord};
pub use cascade::{apply_move, Trace, Transfer};
pub use player::{Player, MAX_PLAYERS, MIN_PLAYERS};
pub use state::{MatchPhase, MatchState};
