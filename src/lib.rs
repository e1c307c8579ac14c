//! # Chain Reaction
//!
//! Rules engine and bot opponents for the Chain Reaction orb game: players
//! drop orbs on a grid, full cells explode into their neighbours and capture
//! them, and the last player with orbs on the board wins.
//!
//! ## Modules
//!
//! - [`game`]: Board, cascade resolution, turn order and elimination
//! - [`ai`]: Bot trait and the random, greedy and minimax bots
//! - [`engine`]: Handle-based facade for presentation layers
//! - [`arena`]: Headless bot-versus-bot matches and win tallies
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod arena;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
