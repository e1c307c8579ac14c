use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::agent::Bot;
use crate::game::{Coord, MatchState, Player};

/// A bot that selects uniformly at random from legal cells.
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new() -> Self {
        RandomBot {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic sequence of choices, for reproducible matches.
    pub fn with_seed(seed: u64) -> Self {
        RandomBot {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot for RandomBot {
    fn choose_move(&mut self, state: &MatchState, player: Player) -> Option<Coord> {
        let moves = state.board().legal_moves(player);
        if moves.is_empty() {
            return None;
        }
        Some(moves[self.rng.random_range(0..moves.len())])
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn clone_bot(&self) -> Box<dyn Bot> {
        Box::new(RandomBot {
            rng: self.rng.clone(),
        })
    }
}
