//! Depth-limited paranoid minimax.
//!
//! With more than two players the searcher assumes every opponent plays to
//! minimise the searcher's evaluation, as one coalition. That keeps the tree
//! two-valued so alpha-beta applies, at the price of pessimism: it is an
//! approximation of multiplayer play, not an equilibrium.

use std::sync::Arc;

use rayon::prelude::*;

use super::agent::Bot;
use super::eval::{Heuristic, MaterialHeuristic, WIN_SCORE};
use crate::game::{Coord, MatchState, Player};

pub const DEFAULT_DEPTH: usize = 3;

/// Alpha-beta search over simulated matches.
pub struct MinimaxBot {
    depth: usize,
    parallel: bool,
    heuristic: Arc<dyn Heuristic>,
}

impl MinimaxBot {
    pub fn new(depth: usize) -> Self {
        MinimaxBot::with_heuristic(depth, Box::new(MaterialHeuristic::default()))
    }

    pub fn with_heuristic(depth: usize, heuristic: Box<dyn Heuristic>) -> Self {
        MinimaxBot {
            depth: depth.max(1),
            parallel: false,
            heuristic: Arc::from(heuristic),
        }
    }

    /// Search root moves on the rayon pool instead of sequentially.
    pub fn parallel_root(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn best_move(&self, state: &MatchState, me: Player) -> Option<Coord> {
        let root = state.scratch_for(me);
        let moves = root.legal_moves();
        if moves.len() <= 1 {
            return moves.first().copied();
        }

        let children: Vec<(Coord, MatchState)> = moves
            .into_iter()
            .filter_map(|at| {
                let mut child = root.clone();
                child.submit_move(me, at).ok().map(|_| (at, child))
            })
            .collect();

        let mut best: Option<(Coord, f64)> = None;
        if self.parallel {
            // Each root child gets a full window; the argmax is unaffected.
            let scores: Vec<f64> = children
                .par_iter()
                .map(|(_, child)| {
                    self.search(child, me, self.depth - 1, f64::NEG_INFINITY, f64::INFINITY)
                })
                .collect();
            for ((at, _), score) in children.iter().zip(scores) {
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((*at, score));
                }
            }
        } else {
            let mut alpha = f64::NEG_INFINITY;
            for (at, child) in &children {
                let score = self.search(child, me, self.depth - 1, alpha, f64::INFINITY);
                if best.is_none_or(|(_, top)| score > top) {
                    best = Some((*at, score));
                }
                alpha = alpha.max(score);
            }
        }

        tracing::trace!(%me, best = ?best, depth = self.depth, "minimax root");
        best.map(|(at, _)| at)
    }

    fn search(
        &self,
        state: &MatchState,
        me: Player,
        depth: usize,
        mut alpha: f64,
        mut beta: f64,
    ) -> f64 {
        if let Some(winner) = state.winner() {
            // Prefer quick wins and slow losses.
            let score = WIN_SCORE + depth as f64;
            return if winner == me { score } else { -score };
        }
        if depth == 0 || state.is_eliminated(me) {
            return self.heuristic.evaluate(state, me);
        }

        let mover = state.current_player();
        let moves = state.legal_moves();
        if moves.is_empty() {
            return self.heuristic.evaluate(state, me);
        }

        if mover == me {
            let mut best = f64::NEG_INFINITY;
            for at in moves {
                let mut child = state.clone();
                if child.submit_move(mover, at).is_err() {
                    continue;
                }
                let score = self.search(&child, me, depth - 1, alpha, beta);
                best = best.max(score);
                alpha = alpha.max(score);
                if alpha >= beta {
                    break;
                }
            }
            best
        } else {
            let mut worst = f64::INFINITY;
            for at in moves {
                let mut child = state.clone();
                if child.submit_move(mover, at).is_err() {
                    continue;
                }
                let score = self.search(&child, me, depth - 1, alpha, beta);
                worst = worst.min(score);
                beta = beta.min(score);
                if alpha >= beta {
                    break;
                }
            }
            worst
        }
    }
}

impl Bot for MinimaxBot {
    fn choose_move(&mut self, state: &MatchState, player: Player) -> Option<Coord> {
        self.best_move(state, player)
    }

    fn name(&self) -> &str {
        "Minimax"
    }

    fn clone_bot(&self) -> Box<dyn Bot> {
        Box::new(MinimaxBot {
            depth: self.depth,
            parallel: self.parallel,
            heuristic: Arc::clone(&self.heuristic),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GreedyBot, RandomBot};
    use crate::game::{Board, Cell};

    fn c(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    /// Player 1 holds a loaded corner at (0,0); player 0 owns (0,1) only.
    fn exposed_position() -> MatchState {
        let mut board = Board::new(3, 3);
        board.set(c(0, 0), Cell::owned(Player(1), 1));
        board.set(c(0, 1), Cell::owned(Player(0), 1));
        MatchState::from_board(board, 2, Player(0), 4)
    }

    fn survives_every_reply(state: &MatchState, at: Coord) -> bool {
        let mut after = state.clone();
        after.submit_move(Player(0), at).unwrap();
        after.legal_moves().into_iter().all(|reply| {
            let mut next = after.clone();
            next.submit_move(Player(1), reply).unwrap();
            !next.is_eliminated(Player(0))
        })
    }

    #[test]
    fn selects_legal_move() {
        let state = MatchState::new(2, 4, 4);
        let mut bot = MinimaxBot::new(3);
        let at = bot.choose_move(&state, Player(0)).unwrap();
        assert!(state.is_move_valid(at.row, at.col, Player(0)));
    }

    #[test]
    fn takes_winning_capture() {
        let mut board = Board::new(3, 3);
        board.set(c(0, 0), Cell::owned(Player(0), 1));
        board.set(c(0, 1), Cell::owned(Player(1), 1));
        board.set(c(2, 2), Cell::owned(Player(0), 1));
        let state = MatchState::from_board(board, 2, Player(0), 4);

        let mut bot = MinimaxBot::new(3);
        assert_eq!(bot.choose_move(&state, Player(0)), Some(c(0, 0)));
    }

    #[test]
    fn avoids_handing_opponent_a_winning_cascade() {
        let state = exposed_position();
        // (1,0) and (2,2) leave the same material after one ply, but only
        // the far corner survives player 1's corner explosion.
        assert!(!survives_every_reply(&state, c(1, 0)));
        assert!(survives_every_reply(&state, c(2, 2)));

        for depth in [2, 3] {
            let mut bot = MinimaxBot::new(depth);
            let at = bot.choose_move(&state, Player(0)).unwrap();
            assert!(
                survives_every_reply(&state, at),
                "depth {depth} chose losing move {at}"
            );
        }
    }

    #[test]
    fn parallel_root_matches_sequential() {
        let mut board = Board::new(4, 4);
        board.set(c(0, 0), Cell::owned(Player(1), 1));
        board.set(c(1, 1), Cell::owned(Player(0), 2));
        board.set(c(2, 3), Cell::owned(Player(1), 2));
        board.set(c(3, 0), Cell::owned(Player(0), 1));
        let state = MatchState::from_board(board, 2, Player(0), 8);

        let mut sequential = MinimaxBot::new(3);
        let mut parallel = MinimaxBot::new(3).parallel_root(true);
        assert_eq!(
            sequential.choose_move(&state, Player(0)),
            parallel.choose_move(&state, Player(0))
        );
    }

    #[test]
    fn skips_eliminated_players_in_three_player_search() {
        // Player 2 is already out; the search must only simulate players 0 and 1.
        let mut board = Board::new(3, 3);
        board.set(c(0, 0), Cell::owned(Player(0), 1));
        board.set(c(2, 2), Cell::owned(Player(1), 1));
        let state = MatchState::from_board(board, 3, Player(0), 7);
        assert!(state.is_eliminated(Player(2)));

        let mut bot = MinimaxBot::new(3);
        let at = bot.choose_move(&state, Player(0)).unwrap();
        assert!(state.is_move_valid(at.row, at.col, Player(0)));
    }

    #[test]
    fn single_legal_move_is_returned() {
        let mut board = Board::new(2, 2);
        board.set(c(0, 0), Cell::owned(Player(1), 1));
        board.set(c(0, 1), Cell::owned(Player(1), 1));
        board.set(c(1, 0), Cell::owned(Player(1), 1));
        board.set(c(1, 1), Cell::owned(Player(0), 1));
        let state = MatchState::from_board(board, 2, Player(0), 4);
        let mut bot = MinimaxBot::new(4);
        assert_eq!(bot.choose_move(&state, Player(0)), Some(c(1, 1)));
    }

    #[test]
    fn beats_random_agent() {
        let games = 10;
        let mut minimax_wins = 0;

        for game in 0..games {
            let minimax_seat = Player::new(game % 2);
            let mut minimax = MinimaxBot::new(2);
            let mut random = RandomBot::with_seed(100 + game as u64);
            let mut state = MatchState::new(2, 3, 4);

            while !state.is_decided() {
                let player = state.current_player();
                let at = if player == minimax_seat {
                    minimax.choose_move(&state, player)
                } else {
                    random.choose_move(&state, player)
                }
                .unwrap();
                state.submit_move(player, at).unwrap();
            }

            if state.winner() == Some(minimax_seat) {
                minimax_wins += 1;
            }
        }

        assert!(
            minimax_wins >= 7,
            "Minimax should beat random, got {minimax_wins}/{games}"
        );
    }

    #[test]
    fn holds_its_own_against_greedy() {
        let mut minimax = MinimaxBot::new(2);
        let mut greedy = GreedyBot::new();
        let mut state = MatchState::new(2, 3, 3);
        let mut turns = 0;

        while !state.is_decided() {
            let player = state.current_player();
            let at = if player == Player(0) {
                minimax.choose_move(&state, player)
            } else {
                greedy.choose_move(&state, player)
            }
            .unwrap();
            state.submit_move(player, at).unwrap();
            turns += 1;
            assert!(turns < 500, "match did not finish");
        }

        assert!(state.winner().is_some());
    }

    #[test]
    fn name_is_minimax() {
        let bot = MinimaxBot::new(3);
        assert_eq!(bot.name(), "Minimax");
        assert_eq!(bot.clone_bot().name(), "Minimax");
    }
}
