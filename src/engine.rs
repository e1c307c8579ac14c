//! Entry point for presentation layers: matches are addressed by an opaque
//! [`MatchId`] and every call takes and returns plain values.
//!
//! Calls for one match must be serialized by the caller. Bot searches can be
//! moved to a worker thread with [`Engine::bot_task`], which works on a
//! private snapshot.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai::{Bot, BotKind, BotSettings};
use crate::config::AppConfig;
use crate::error::EngineError;
use crate::game::cascade::DEFAULT_ITERATION_FACTOR;
use crate::game::{Board, Coord, MatchState, Player, Trace, Transfer, MAX_PLAYERS, MIN_PLAYERS};

/// Handle to a running match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId(u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything needed to start a match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSetup {
    pub player_count: usize,
    pub rows: usize,
    pub cols: usize,
    /// Bot-controlled seats. Seats not listed are driven by the caller.
    pub bots: Vec<(Player, BotKind)>,
    pub settings: BotSettings,
    pub iteration_factor: usize,
}

impl MatchSetup {
    pub fn new(player_count: usize, rows: usize, cols: usize) -> Self {
        MatchSetup {
            player_count,
            rows,
            cols,
            bots: Vec::new(),
            settings: BotSettings::default(),
            iteration_factor: DEFAULT_ITERATION_FACTOR,
        }
    }

    pub fn with_bot(mut self, player: Player, kind: BotKind) -> Self {
        self.bots.retain(|(seat, _)| *seat != player);
        self.bots.push((player, kind));
        self
    }

    pub fn with_settings(mut self, settings: BotSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build a setup from the `[board]`, `[players]`, `[search]` and `[cascade]` sections.
    pub fn from_config(config: &AppConfig) -> Self {
        let bots = config
            .players
            .seats
            .iter()
            .enumerate()
            .filter_map(|(i, seat)| seat.bot().map(|kind| (Player::new(i), kind)))
            .collect();
        MatchSetup {
            player_count: config.players.seats.len(),
            rows: config.board.rows,
            cols: config.board.cols,
            bots,
            settings: config.search.clone(),
            iteration_factor: config.cascade.iteration_factor,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(EngineError::InvalidSetup(format!(
                "player count must be in {MIN_PLAYERS}..={MAX_PLAYERS}, got {}",
                self.player_count
            )));
        }
        if self.rows < 2 || self.cols < 2 {
            return Err(EngineError::InvalidSetup(format!(
                "board must be at least 2x2, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows * self.cols < self.player_count {
            return Err(EngineError::InvalidSetup(format!(
                "a {}x{} board cannot seat {} players",
                self.rows, self.cols, self.player_count
            )));
        }
        if let Some((seat, _)) = self
            .bots
            .iter()
            .find(|(seat, _)| seat.index() >= self.player_count)
        {
            return Err(EngineError::InvalidSetup(format!(
                "bot seat {seat} is outside a {}-player match",
                self.player_count
            )));
        }
        Ok(())
    }
}

struct Match {
    state: MatchState,
    bots: HashMap<Player, Box<dyn Bot>>,
    last_trace: Trace,
    aborted: bool,
}

/// A detached bot search: a snapshot of the match plus its own copy of the bot.
pub struct BotTask {
    state: MatchState,
    player: Player,
    bot: Box<dyn Bot>,
}

impl BotTask {
    /// Run the search. The answer still has to be submitted through the engine.
    pub fn run(mut self) -> Option<Coord> {
        self.bot.choose_move(&self.state, self.player)
    }

    pub fn player(&self) -> Player {
        self.player
    }
}

/// Owns every live match.
#[derive(Default)]
pub struct Engine {
    matches: HashMap<MatchId, Match>,
    next_id: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a match: empty board, everyone alive, player 0 to move.
    pub fn start_match(&mut self, setup: MatchSetup) -> Result<MatchId, EngineError> {
        setup.validate()?;
        let id = MatchId(self.next_id);
        self.next_id += 1;

        let state = MatchState::new(setup.player_count, setup.rows, setup.cols)
            .with_iteration_factor(setup.iteration_factor);
        let bots = setup
            .bots
            .iter()
            .map(|&(seat, kind)| (seat, kind.build(&setup.settings)))
            .collect();

        tracing::info!(
            match_id = %id,
            players = setup.player_count,
            rows = setup.rows,
            cols = setup.cols,
            bots = ?setup.bots,
            "match started"
        );
        self.matches.insert(
            id,
            Match {
                state,
                bots,
                last_trace: Trace::default(),
                aborted: false,
            },
        );
        Ok(id)
    }

    /// Release a match. Returns false if the handle was unknown.
    pub fn end_match(&mut self, id: MatchId) -> bool {
        let existed = self.matches.remove(&id).is_some();
        if existed {
            tracing::info!(match_id = %id, "match ended");
        }
        existed
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Submit a move, reporting only success. Refusals are logged.
    pub fn submit_move(&mut self, id: MatchId, row: usize, col: usize, player: Player) -> bool {
        match self.try_submit_move(id, row, col, player) {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(match_id = %id, %player, row, col, error = %err, "move refused");
                false
            }
        }
    }

    /// Submit a move and return its trace. Engine defects abort the match.
    pub fn try_submit_move(
        &mut self,
        id: MatchId,
        row: usize,
        col: usize,
        player: Player,
    ) -> Result<&Trace, EngineError> {
        let game = self
            .matches
            .get_mut(&id)
            .ok_or(EngineError::MatchNotFound(id))?;
        if game.aborted {
            return Err(EngineError::MatchAborted(id));
        }

        let at = Coord::new(row, col);
        let alive_before = game.state.alive_count();
        match game.state.submit_move(player, at) {
            Ok(trace) => {
                tracing::debug!(
                    match_id = %id,
                    %player,
                    %at,
                    transfers = trace.len(),
                    waves = trace.waves(),
                    "move applied"
                );
                if game.state.alive_count() < alive_before {
                    let out: Vec<Player> = Player::all(game.state.player_count())
                        .filter(|&p| game.state.is_eliminated(p))
                        .collect();
                    tracing::info!(match_id = %id, eliminated = ?out, "elimination");
                }
                if let Some(winner) = game.state.winner() {
                    tracing::info!(
                        match_id = %id,
                        %winner,
                        moves = game.state.move_number(),
                        "match decided"
                    );
                }
                game.last_trace = trace;
                Ok(&game.last_trace)
            }
            Err(err) if err.is_defect() => {
                tracing::error!(match_id = %id, error = %err, "engine defect, aborting match");
                game.aborted = true;
                game.last_trace = Trace::default();
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Transfers of the last accepted move; empty if it caused no explosion.
    pub fn last_trace(&self, id: MatchId) -> &[Transfer] {
        self.matches
            .get(&id)
            .map_or(&[], |game| game.last_trace.transfers())
    }

    /// Snapshot in the `owner,orbs;...|...` text format; empty for unknown handles.
    pub fn board_snapshot(&self, id: MatchId) -> String {
        self.matches
            .get(&id)
            .map(|game| game.state.board().to_string())
            .unwrap_or_default()
    }

    pub fn board(&self, id: MatchId) -> Option<&Board> {
        self.matches.get(&id).map(|game| game.state.board())
    }

    pub fn state(&self, id: MatchId) -> Option<&MatchState> {
        self.matches.get(&id).map(|game| &game.state)
    }

    /// Winner index, or -1 while undecided (or for unknown handles).
    pub fn winner(&self, id: MatchId) -> i32 {
        self.matches
            .get(&id)
            .and_then(|game| game.state.winner())
            .map_or(-1, |p| p.index() as i32)
    }

    pub fn current_player(&self, id: MatchId) -> Option<Player> {
        self.matches.get(&id).map(|game| game.state.current_player())
    }

    pub fn is_eliminated(&self, id: MatchId, player: Player) -> bool {
        self.matches
            .get(&id)
            .is_some_and(|game| game.state.is_eliminated(player))
    }

    pub fn is_aborted(&self, id: MatchId) -> bool {
        self.matches.get(&id).is_some_and(|game| game.aborted)
    }

    pub fn is_bot_controlled(&self, id: MatchId, player: Player) -> bool {
        self.matches
            .get(&id)
            .is_some_and(|game| game.bots.contains_key(&player))
    }

    pub fn score(&self, id: MatchId, player: Player) -> u32 {
        self.matches
            .get(&id)
            .map_or(0, |game| game.state.score(player))
    }

    /// Ask the seat's bot for a move. `None` if the seat is not a bot or has no move.
    pub fn bot_move(&mut self, id: MatchId, player: Player) -> Option<Coord> {
        match self.try_bot_move(id, player) {
            Ok(at) => Some(at),
            Err(err) => {
                tracing::warn!(match_id = %id, %player, error = %err, "no bot move");
                None
            }
        }
    }

    pub fn try_bot_move(&mut self, id: MatchId, player: Player) -> Result<Coord, EngineError> {
        let game = self
            .matches
            .get_mut(&id)
            .ok_or(EngineError::MatchNotFound(id))?;
        let bot = game
            .bots
            .get_mut(&player)
            .ok_or(EngineError::NotABot(player))?;
        let at = bot
            .choose_move(&game.state, player)
            .ok_or(EngineError::NoLegalMove(player))?;
        tracing::info!(match_id = %id, %player, bot = bot.name(), %at, "bot chose move");
        Ok(at)
    }

    /// Detach a bot search so it can run off the caller's thread.
    pub fn bot_task(&self, id: MatchId, player: Player) -> Result<BotTask, EngineError> {
        let game = self.matches.get(&id).ok_or(EngineError::MatchNotFound(id))?;
        let bot = game.bots.get(&player).ok_or(EngineError::NotABot(player))?;
        Ok(BotTask {
            state: game.state.clone(),
            player,
            bot: bot.clone_bot(),
        })
    }
}
