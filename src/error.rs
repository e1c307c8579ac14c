use std::path::PathBuf;

use crate::engine::MatchId;
use crate::game::Player;

/// Reasons a move can be refused or fail to resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("cell ({row}, {col}) is owned by {owner}")]
    IllegalMove { row: usize, col: usize, owner: Player },

    #[error("it is {expected}'s turn, not {got}'s")]
    NotYourTurn { expected: Player, got: Player },

    #[error("match is already decided (winner {winner})")]
    GameOver { winner: Player },

    #[error("{0} is not seated in this match")]
    UnknownPlayer(Player),

    #[error("cascade did not settle within {cap} explosions")]
    CascadeOverflow { cap: usize },
}

impl MoveError {
    /// Errors that indicate a broken caller or engine rather than a refused move.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            MoveError::OutOfBounds { .. } | MoveError::CascadeOverflow { .. }
        )
    }
}

/// Errors surfaced by the [`Engine`](crate::engine::Engine) facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no match with handle {0}")]
    MatchNotFound(MatchId),

    #[error("match {0} was aborted after an engine defect")]
    MatchAborted(MatchId),

    #[error("invalid match setup: {0}")]
    InvalidSetup(String),

    #[error("{0} is not bot-controlled")]
    NotABot(Player),

    #[error("{0} has no legal move")]
    NoLegalMove(Player),

    #[error("match {id} still undecided after {limit} moves")]
    MoveLimit { id: MatchId, limit: usize },

    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Errors decoding the textual board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed cell {text:?} at ({row}, {col})")]
    BadCell { row: usize, col: usize, text: String },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("snapshot is {rows}x{cols}, boards are at least 2x2")]
    TooSmall { rows: usize, cols: usize },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
