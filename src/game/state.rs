use serde::{Deserialize, Serialize};

use super::cascade::{self, Trace, DEFAULT_ITERATION_FACTOR};
use super::player::{MAX_PLAYERS, MIN_PLAYERS};
use super::{Board, Coord, Player};
use crate::error::MoveError;

/// Lifecycle of a match. `Decided` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    InProgress,
    Decided(Player),
}

/// Board plus turn order, elimination and winner bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    board: Board,
    player_count: usize,
    current_player: Player,
    alive: Vec<bool>,
    winner: Option<Player>,
    move_number: usize,
    iteration_factor: usize,
}

impl MatchState {
    /// Create a fresh match: empty board, everyone alive, player 0 to move.
    ///
    /// # Panics
    ///
    /// Panics if `player_count` is outside 2..=5, the board is smaller than 2x2,
    /// or the board has fewer cells than players.
    pub fn new(player_count: usize, rows: usize, cols: usize) -> Self {
        assert!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count),
            "player count must be in {MIN_PLAYERS}..={MAX_PLAYERS}, got {player_count}"
        );
        assert!(
            rows * cols >= player_count,
            "a {rows}x{cols} board cannot seat {player_count} players"
        );
        MatchState {
            board: Board::new(rows, cols),
            player_count,
            current_player: Player(0),
            alive: vec![true; player_count],
            winner: None,
            move_number: 0,
            iteration_factor: DEFAULT_ITERATION_FACTOR,
        }
    }

    /// Override the cascade explosion budget (`rows * cols * factor`).
    pub fn with_iteration_factor(mut self, factor: usize) -> Self {
        self.iteration_factor = factor.max(1);
        self
    }

    /// Reset to the initial state with new dimensions.
    pub fn start(&mut self, player_count: usize, rows: usize, cols: usize) {
        let factor = self.iteration_factor;
        *self = MatchState::new(player_count, rows, cols).with_iteration_factor(factor);
    }

    /// Rebuild a match around an existing board, as if `move_number` moves had
    /// been played and `to_move` is next. Seats owning nothing are eliminated
    /// when every player has already moved.
    pub fn from_board(
        board: Board,
        player_count: usize,
        to_move: Player,
        move_number: usize,
    ) -> Self {
        let mut state = MatchState::new(player_count, board.rows(), board.cols());
        state.board = board;
        state.current_player = to_move;
        state.move_number = move_number;
        state.refresh_alive();
        state.settle_winner();
        state
    }

    /// Scratch copy with `player` to move, for bots asked out of turn.
    pub(crate) fn scratch_for(&self, player: Player) -> MatchState {
        let mut scratch = self.clone();
        scratch.current_player = player;
        scratch
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Owned copy of the board for callers that outlive this state.
    pub fn board_snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn move_number(&self) -> usize {
        self.move_number
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn phase(&self) -> MatchPhase {
        match self.winner {
            Some(winner) => MatchPhase::Decided(winner),
            None => MatchPhase::InProgress,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Unknown seats count as eliminated.
    pub fn is_eliminated(&self, player: Player) -> bool {
        !self.alive.get(player.index()).copied().unwrap_or(false)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = Player> + '_ {
        Player::all(self.player_count).filter(|&p| !self.is_eliminated(p))
    }

    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    /// Orbs currently owned by `player`.
    pub fn score(&self, player: Player) -> u32 {
        self.board.orbs_of(player)
    }

    pub fn is_move_valid(&self, row: usize, col: usize, player: Player) -> bool {
        self.board
            .cell(row, col)
            .is_ok_and(|cell| cell.accepts(player))
    }

    /// Cells the player to move may choose, row-major. Empty once decided.
    pub fn legal_moves(&self) -> Vec<Coord> {
        if self.is_decided() {
            return Vec::new();
        }
        self.board.legal_moves(self.current_player)
    }

    /// Play `player`'s orb at `at`, resolve the cascade and advance the turn.
    pub fn submit_move(&mut self, player: Player, at: Coord) -> Result<Trace, MoveError> {
        if player.index() >= self.player_count {
            return Err(MoveError::UnknownPlayer(player));
        }
        if let Some(winner) = self.winner {
            return Err(MoveError::GameOver { winner });
        }
        if player != self.current_player {
            return Err(MoveError::NotYourTurn {
                expected: self.current_player,
                got: player,
            });
        }

        let cap = cascade::iteration_cap(&self.board, self.iteration_factor);
        let trace = cascade::apply_move_capped(&mut self.board, player, at, cap)?;

        self.move_number += 1;
        self.refresh_alive();
        if !self.settle_winner() {
            self.advance_turn();
        }

        tracing::trace!(
            %player,
            %at,
            move_number = self.move_number,
            transfers = trace.len(),
            waves = trace.waves(),
            winner = ?self.winner,
            "move resolved"
        );
        Ok(trace)
    }

    /// Eliminate every seat that owns nothing once each player has had a placement.
    fn refresh_alive(&mut self) {
        if self.move_number <= self.player_count {
            return;
        }
        for player in Player::all(self.player_count) {
            if self.alive[player.index()] && self.board.owned_cells(player) == 0 {
                self.alive[player.index()] = false;
                tracing::trace!(%player, move_number = self.move_number, "player eliminated");
            }
        }
    }

    /// Record the winner if exactly one seat survives.
    fn settle_winner(&mut self) -> bool {
        if self.alive_count() != 1 {
            return false;
        }
        let winner = self.alive_players().next();
        self.winner = winner;
        true
    }

    fn advance_turn(&mut self) {
        let mut next = self.current_player;
        for _ in 0..self.player_count {
            next = next.next(self.player_count);
            if !self.is_eliminated(next) {
                self.current_player = next;
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn c(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    #[test]
    fn test_initial_state() {
        let state = MatchState::new(3, 4, 5);
        assert_eq!(state.current_player(), Player(0));
        assert_eq!(state.move_number(), 0);
        assert_eq!(state.winner(), None);
        assert_eq!(state.phase(), MatchPhase::InProgress);
        assert_eq!(state.alive_count(), 3);
        assert_eq!(state.legal_moves().len(), 20);
    }

    #[test]
    fn test_turns_rotate() {
        let mut state = MatchState::new(3, 3, 3);
        state.submit_move(Player(0), c(0, 0)).unwrap();
        assert_eq!(state.current_player(), Player(1));
        state.submit_move(Player(1), c(1, 1)).unwrap();
        assert_eq!(state.current_player(), Player(2));
        state.submit_move(Player(2), c(2, 2)).unwrap();
        assert_eq!(state.current_player(), Player(0));
        assert_eq!(state.move_number(), 3);
    }

    #[test]
    fn test_not_your_turn() {
        let mut state = MatchState::new(2, 3, 3);
        assert_eq!(
            state.submit_move(Player(1), c(0, 0)),
            Err(MoveError::NotYourTurn {
                expected: Player(0),
                got: Player(1)
            })
        );
        assert_eq!(state.move_number(), 0);
    }

    #[test]
    fn test_unknown_player() {
        let mut state = MatchState::new(2, 3, 3);
        assert_eq!(
            state.submit_move(Player(4), c(0, 0)),
            Err(MoveError::UnknownPlayer(Player(4)))
        );
        assert!(state.is_eliminated(Player(4)));
    }

    #[test]
    fn test_illegal_move_keeps_turn() {
        let mut state = MatchState::new(2, 3, 3);
        state.submit_move(Player(0), c(0, 0)).unwrap();
        assert!(matches!(
            state.submit_move(Player(1), c(0, 0)),
            Err(MoveError::IllegalMove { .. })
        ));
        assert_eq!(state.current_player(), Player(1));
        assert_eq!(state.move_number(), 1);
        assert!(!state.is_move_valid(0, 0, Player(1)));
        assert!(state.is_move_valid(0, 0, Player(0)));
        assert!(!state.is_move_valid(7, 0, Player(0)));
    }

    #[test]
    fn test_no_elimination_before_everyone_moved() {
        // After move 1 player 1 owns nothing but has not had a turn yet.
        let mut state = MatchState::new(2, 3, 3);
        state.submit_move(Player(0), c(0, 0)).unwrap();
        assert!(!state.is_eliminated(Player(1)));
        assert_eq!(state.current_player(), Player(1));
    }

    #[test]
    fn test_two_player_capture_decides_match() {
        let mut state = MatchState::new(2, 3, 3);
        state.submit_move(Player(0), c(0, 0)).unwrap();
        state.submit_move(Player(1), c(0, 1)).unwrap();
        // Corner explodes into (0,1) and captures player 1's only cell.
        let trace = state.submit_move(Player(0), c(0, 0)).unwrap();

        assert_eq!(trace.len(), 2);
        assert!(state.is_eliminated(Player(1)));
        assert_eq!(state.winner(), Some(Player(0)));
        assert_eq!(state.phase(), MatchPhase::Decided(Player(0)));
        assert_eq!(
            state.submit_move(Player(0), c(2, 2)),
            Err(MoveError::GameOver { winner: Player(0) })
        );
        assert!(state.legal_moves().is_empty());
    }

    #[test]
    fn test_partial_capture_keeps_player_alive() {
        let mut state = MatchState::new(2, 3, 3);
        state.submit_move(Player(0), c(0, 1)).unwrap();
        state.submit_move(Player(1), c(0, 0)).unwrap();
        state.submit_move(Player(0), c(2, 2)).unwrap();
        // Player 1 fills the corner; it explodes into (0,1) and (1,0).
        let trace = state.submit_move(Player(1), c(0, 0)).unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(state.board().owned_cells(Player(0)), 1);
        assert!(!state.is_decided());

        state.submit_move(Player(0), c(2, 1)).unwrap();
        state.submit_move(Player(1), c(1, 1)).unwrap();
        assert!(!state.is_decided());
        assert_eq!(state.current_player(), Player(0));
    }

    #[test]
    fn test_player_zero_eliminated_after_move_three() {
        let mut state = MatchState::new(2, 3, 3);
        state.submit_move(Player(0), c(0, 1)).unwrap();
        state.submit_move(Player(1), c(0, 0)).unwrap();
        state.submit_move(Player(0), c(0, 1)).unwrap();
        assert!(!state.is_eliminated(Player(0)));

        // The corner explosion takes (0,1), which then explodes as well.
        let trace = state.submit_move(Player(1), c(0, 0)).unwrap();
        assert!(trace.halted());
        assert_eq!(state.board().owned_cells(Player(0)), 0);
        assert!(state.is_eliminated(Player(0)));
        assert_eq!(state.winner(), Some(Player(1)));
        assert_eq!(state.current_player(), Player(1));
    }

    #[test]
    fn test_turn_skips_eliminated_player() {
        // Player 1 has been wiped out; players 0 and 2 alternate.
        let mut board = Board::new(4, 4);
        board.set(c(0, 0), Cell::owned(Player(0), 1));
        board.set(c(3, 3), Cell::owned(Player(2), 1));
        let mut state = MatchState::from_board(board, 3, Player(0), 6);
        assert!(state.is_eliminated(Player(1)));
        assert!(!state.is_decided());

        let order: Vec<Player> = [c(1, 1), c(2, 2), c(1, 2), c(2, 1)]
            .into_iter()
            .map(|at| {
                let player = state.current_player();
                state.submit_move(player, at).unwrap();
                player
            })
            .collect();
        assert_eq!(order, vec![Player(0), Player(2), Player(0), Player(2)]);
        assert_eq!(state.current_player(), Player(0));
    }

    #[test]
    #[should_panic(expected = "cannot seat 5 players")]
    fn test_board_smaller_than_player_count_panics() {
        MatchState::new(5, 2, 2);
    }

    #[test]
    fn test_every_seat_gets_a_cell_when_board_is_full() {
        // Four players on four cells: each first placement still has a free cell.
        let mut state = MatchState::new(4, 2, 2);
        for (seat, at) in [c(0, 0), c(0, 1), c(1, 0), c(1, 1)].into_iter().enumerate() {
            let player = state.current_player();
            assert_eq!(player, Player::new(seat));
            assert!(!state.legal_moves().is_empty());
            state.submit_move(player, at).unwrap();
        }
        assert_eq!(state.alive_count(), 4);
        assert_eq!(state.legal_moves(), vec![c(0, 0)]);
    }

    #[test]
    fn test_start_resets() {
        let mut state = MatchState::new(2, 3, 3);
        state.submit_move(Player(0), c(1, 1)).unwrap();
        state.start(4, 5, 6);
        assert_eq!(state.player_count(), 4);
        assert_eq!(state.move_number(), 0);
        assert_eq!(state.board().rows(), 5);
        assert_eq!(state.board().total_orbs(), 0);
        assert_eq!(state.current_player(), Player(0));
    }

    #[test]
    fn test_random_matches_reach_a_winner_with_monotone_elimination() {
        let mut rng = StdRng::seed_from_u64(11);
        for game in 0..40 {
            let players = 2 + game % 4;
            let mut state = MatchState::new(players, 3 + game % 3, 3 + game % 4);
            let mut eliminated: Vec<Player> = Vec::new();

            while !state.is_decided() {
                assert!(state.move_number() < 2_000, "match did not finish");
                let moves = state.legal_moves();
                assert!(!moves.is_empty());
                let at = moves[rng.random_range(0..moves.len())];
                let player = state.current_player();
                assert!(!state.is_eliminated(player));
                state.submit_move(player, at).unwrap();

                for &gone in &eliminated {
                    assert!(state.is_eliminated(gone), "{gone} came back");
                }
                eliminated = Player::all(players)
                    .filter(|&p| state.is_eliminated(p))
                    .collect();
            }

            let winner = state.winner().unwrap();
            assert_eq!(state.alive_count(), 1);
            assert!(state.board().owned_cells(winner) > 0);
        }
    }
}
