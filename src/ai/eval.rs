use crate::game::{MatchState, Player};

/// Score assigned to a decided match, before any depth adjustment.
pub const WIN_SCORE: f64 = 1_000_000.0;

/// Trait for evaluating a position from one player's perspective.
pub trait Heuristic: Send + Sync {
    fn evaluate(&self, state: &MatchState, player: Player) -> f64;
}

/// Material balance against the strongest surviving opponent:
/// `cells(me) - max cells(other) + orb_weight * (orbs(me) - max orbs(other))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialHeuristic {
    pub orb_weight: f64,
}

impl MaterialHeuristic {
    pub fn new(orb_weight: f64) -> Self {
        MaterialHeuristic { orb_weight }
    }
}

impl Default for MaterialHeuristic {
    fn default() -> Self {
        MaterialHeuristic::new(0.5)
    }
}

impl Heuristic for MaterialHeuristic {
    fn evaluate(&self, state: &MatchState, player: Player) -> f64 {
        match state.winner() {
            Some(winner) if winner == player => return WIN_SCORE,
            Some(_) => return -WIN_SCORE,
            None if state.is_eliminated(player) => return -WIN_SCORE,
            None => {}
        }

        let board = state.board();
        let (best_cells, best_orbs) = state
            .alive_players()
            .filter(|&p| p != player)
            .fold((0usize, 0u32), |(cells, orbs), p| {
                (cells.max(board.owned_cells(p)), orbs.max(board.orbs_of(p)))
            });

        let cells = board.owned_cells(player) as f64 - best_cells as f64;
        let orbs = board.orbs_of(player) as f64 - best_orbs as f64;
        cells + self.orb_weight * orbs
    }
}
