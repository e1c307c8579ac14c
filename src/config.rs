use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::{BotKind, BotSettings};
use crate::error::ConfigError;
use crate::game::cascade::DEFAULT_ITERATION_FACTOR;
use crate::game::{MAX_PLAYERS, MIN_PLAYERS};

/// Who sits in a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    Human,
    Random,
    Greedy,
    Minimax,
}

impl Seat {
    pub fn bot(self) -> Option<BotKind> {
        match self {
            Seat::Human => None,
            Seat::Random => Some(BotKind::Random),
            Seat::Greedy => Some(BotKind::Greedy),
            Seat::Minimax => Some(BotKind::Minimax),
        }
    }
}

impl Seat {
    /// Label shown to people: the bot level, or "Human".
    pub fn label(self) -> &'static str {
        self.bot().map_or("Human", BotKind::display_name)
    }
}

impl From<BotKind> for Seat {
    fn from(kind: BotKind) -> Self {
        match kind {
            BotKind::Random => Seat::Random,
            BotKind::Greedy => Seat::Greedy,
            BotKind::Minimax => Seat::Minimax,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bot() {
            Some(kind) => write!(f, "{kind}"),
            None => f.write_str("human"),
        }
    }
}

impl FromStr for Seat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("human") {
            return Ok(Seat::Human);
        }
        s.parse::<BotKind>().map(Seat::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig { rows: 12, cols: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayersConfig {
    /// One entry per player, in turn order.
    pub seats: Vec<Seat>,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        PlayersConfig {
            seats: vec![Seat::Human, Seat::Minimax],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Explosion budget per cell before a move is treated as runaway.
    pub iteration_factor: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        CascadeConfig {
            iteration_factor: DEFAULT_ITERATION_FACTOR,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub players: PlayersConfig,
    pub search: BotSettings,
    pub cascade: CascadeConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.rows < 2 {
            return Err(ConfigError::Validation("board.rows must be >= 2".into()));
        }
        if self.board.cols < 2 {
            return Err(ConfigError::Validation("board.cols must be >= 2".into()));
        }
        let seats = self.players.seats.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats) {
            return Err(ConfigError::Validation(format!(
                "players.seats must list {MIN_PLAYERS} to {MAX_PLAYERS} seats, got {seats}"
            )));
        }
        if self.board.rows * self.board.cols < seats {
            return Err(ConfigError::Validation(format!(
                "a {}x{} board cannot seat {seats} players",
                self.board.rows, self.board.cols
            )));
        }
        if self.search.depth == 0 || self.search.depth > 6 {
            return Err(ConfigError::Validation(
                "search.depth must be in [1, 6]".into(),
            ));
        }
        if self.search.orb_weight.is_nan() || self.search.orb_weight < 0.0 {
            return Err(ConfigError::Validation(
                "search.orb_weight must be >= 0".into(),
            ));
        }
        if self.cascade.iteration_factor == 0 {
            return Err(ConfigError::Validation(
                "cascade.iteration_factor must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).unwrap_or_default()
    }
}
