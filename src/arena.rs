//! Bot-only matches played through the [`Engine`] facade, and a win tally.

use serde::Serialize;

use crate::engine::{Engine, MatchId, MatchSetup};
use crate::error::EngineError;
use crate::game::{Board, Coord, Player};

/// A match is abandoned after this many moves per cell.
const MOVES_PER_CELL_LIMIT: usize = 100;

/// What happened on one move, for progress reporting.
pub struct MoveEvent<'a> {
    pub move_number: usize,
    pub player: Player,
    pub at: Coord,
    pub transfers: usize,
    pub waves: u32,
    pub board: &'a Board,
}

/// Summary of one finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub winner: Player,
    pub moves: usize,
    /// Transfers across all moves.
    pub transfers: usize,
    /// Largest number of waves produced by a single move.
    pub longest_cascade: u32,
}

/// Play a match between bots from start to finish. Every seat must be a bot.
pub fn play_match(
    engine: &mut Engine,
    setup: MatchSetup,
    mut on_move: impl FnMut(&MoveEvent<'_>),
) -> Result<MatchRecord, EngineError> {
    if let Some(human) =
        Player::all(setup.player_count).find(|p| !setup.bots.iter().any(|(seat, _)| seat == p))
    {
        return Err(EngineError::InvalidSetup(format!(
            "{human} has no bot; arena matches are bot-only"
        )));
    }

    let limit = setup.rows * setup.cols * MOVES_PER_CELL_LIMIT;
    let id = engine.start_match(setup)?;
    let result = run_to_completion(engine, id, limit, &mut on_move);
    engine.end_match(id);
    result
}

fn run_to_completion(
    engine: &mut Engine,
    id: MatchId,
    limit: usize,
    on_move: &mut impl FnMut(&MoveEvent<'_>),
) -> Result<MatchRecord, EngineError> {
    let mut record = MatchRecord {
        winner: Player(0),
        moves: 0,
        transfers: 0,
        longest_cascade: 0,
    };

    loop {
        let state = engine.state(id).ok_or(EngineError::MatchNotFound(id))?;
        if let Some(winner) = state.winner() {
            record.winner = winner;
            return Ok(record);
        }
        if record.moves >= limit {
            return Err(EngineError::MoveLimit { id, limit });
        }

        let player = state.current_player();
        let at = engine.try_bot_move(id, player)?;
        let trace = engine.try_submit_move(id, at.row, at.col, player)?;
        let (transfers, waves) = (trace.len(), trace.waves());

        record.moves += 1;
        record.transfers += transfers;
        record.longest_cascade = record.longest_cascade.max(waves);

        if let Some(board) = engine.board(id) {
            on_move(&MoveEvent {
                move_number: record.moves,
                player,
                at,
                transfers,
                waves,
                board,
            });
        }
    }
}

/// Win counts over a series of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    wins: Vec<usize>,
    matches: usize,
    total_moves: usize,
}

impl Tally {
    pub fn new(player_count: usize) -> Self {
        Tally {
            wins: vec![0; player_count],
            matches: 0,
            total_moves: 0,
        }
    }

    pub fn record(&mut self, record: &MatchRecord) {
        let seat = record.winner.index();
        if seat >= self.wins.len() {
            self.wins.resize(seat + 1, 0);
        }
        self.wins[seat] += 1;
        self.matches += 1;
        self.total_moves += record.moves;
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn wins(&self, player: Player) -> usize {
        self.wins.get(player.index()).copied().unwrap_or(0)
    }

    pub fn win_rate(&self, player: Player) -> f32 {
        if self.matches == 0 {
            return 0.0;
        }
        self.wins(player) as f32 / self.matches as f32
    }

    pub fn average_length(&self) -> f32 {
        if self.matches == 0 {
            return 0.0;
        }
        self.total_moves as f32 / self.matches as f32
    }
}
