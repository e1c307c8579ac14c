use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest supported player count.
pub const MIN_PLAYERS: usize = 2;
/// Largest supported player count.
pub const MAX_PLAYERS: usize = 5;

/// A seat at the table, identified by its index in `[0, player_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Player(pub u8);

impl Player {
    pub fn new(index: usize) -> Self {
        Player(index as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat after this one, wrapping around `player_count`.
    pub fn next(self, player_count: usize) -> Player {
        Player::new((self.index() + 1) % player_count)
    }

    /// Iterate over every seat of a match with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = Player> {
        (0..player_count).map(Player::new)
    }

    /// Get player name for display (1-based, as shown to people).
    pub fn name(self) -> String {
        format!("Player {}", self.index() + 1)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}
