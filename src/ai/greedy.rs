use std::sync::Arc;

use super::agent::Bot;
use super::eval::{Heuristic, MaterialHeuristic};
use crate::game::{Coord, MatchState, Player};

/// One-ply bot: plays every legal cell on a scratch copy and keeps the best
/// evaluation. Ties go to the first cell in row-major order.
pub struct GreedyBot {
    heuristic: Arc<dyn Heuristic>,
}

impl GreedyBot {
    pub fn new() -> Self {
        GreedyBot {
            heuristic: Arc::new(MaterialHeuristic::default()),
        }
    }

    pub fn with_heuristic(heuristic: Box<dyn Heuristic>) -> Self {
        GreedyBot {
            heuristic: Arc::from(heuristic),
        }
    }
}

impl Default for GreedyBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot for GreedyBot {
    fn choose_move(&mut self, state: &MatchState, player: Player) -> Option<Coord> {
        let root = state.scratch_for(player);
        let mut best: Option<(Coord, f64)> = None;

        for at in root.legal_moves() {
            let mut child = root.clone();
            if child.submit_move(player, at).is_err() {
                continue;
            }
            let score = self.heuristic.evaluate(&child, player);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((at, score));
            }
        }

        best.map(|(at, _)| at)
    }

    fn name(&self) -> &str {
        "Greedy"
    }

    fn clone_bot(&self) -> Box<dyn Bot> {
        Box::new(GreedyBot {
            heuristic: Arc::clone(&self.heuristic),
        })
    }
}
