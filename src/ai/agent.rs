use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::minimax::DEFAULT_DEPTH;
use super::{GreedyBot, MaterialHeuristic, MinimaxBot, RandomBot};
use crate::game::{Coord, MatchState, Player};

/// Universal interface for all automated opponents.
pub trait Bot: Send {
    /// Pick a cell for `player` on the current board, or `None` when the
    /// player has nothing legal to play. Never mutates `state`.
    fn choose_move(&mut self, state: &MatchState, player: Player) -> Option<Coord>;

    /// Return the bot's display name.
    fn name(&self) -> &str;

    /// Clone the bot into a boxed trait object.
    fn clone_bot(&self) -> Box<dyn Bot>;
}

/// The three bot strengths, numbered as the start screen offers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    Random,
    Greedy,
    Minimax,
}

impl BotKind {
    pub const ALL: [BotKind; 3] = [BotKind::Random, BotKind::Greedy, BotKind::Minimax];

    /// Numeric id: 1 random, 2 greedy, 3 minimax. 0 means no bot.
    pub fn from_id(id: u8) -> Option<BotKind> {
        match id {
            1 => Some(BotKind::Random),
            2 => Some(BotKind::Greedy),
            3 => Some(BotKind::Minimax),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            BotKind::Random => 1,
            BotKind::Greedy => 2,
            BotKind::Minimax => 3,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BotKind::Random => "Level 1: Random Bot",
            BotKind::Greedy => "Level 2: Greedy Bot",
            BotKind::Minimax => "Level 3: Minimax Bot",
        }
    }

    /// Build a bot of this kind from search settings.
    pub fn build(self, settings: &BotSettings) -> Box<dyn Bot> {
        let heuristic = MaterialHeuristic::new(settings.orb_weight);
        match self {
            BotKind::Random => match settings.seed {
                Some(seed) => Box::new(RandomBot::with_seed(seed)),
                None => Box::new(RandomBot::new()),
            },
            BotKind::Greedy => Box::new(GreedyBot::with_heuristic(Box::new(heuristic))),
            BotKind::Minimax => Box::new(
                MinimaxBot::with_heuristic(settings.depth, Box::new(heuristic))
                    .parallel_root(settings.parallel_root),
            ),
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BotKind::Random => "random",
            BotKind::Greedy => "greedy",
            BotKind::Minimax => "minimax",
        })
    }
}

impl FromStr for BotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "1" => Ok(BotKind::Random),
            "greedy" | "2" => Ok(BotKind::Greedy),
            "minimax" | "3" => Ok(BotKind::Minimax),
            other => Err(format!(
                "unknown bot '{other}' (expected 'random', 'greedy' or 'minimax')"
            )),
        }
    }
}

/// Tuning shared by every bot a match creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Minimax lookahead in plies.
    pub depth: usize,
    /// Weight of the orb differential relative to the cell differential.
    pub orb_weight: f64,
    /// Search root moves on the rayon pool.
    pub parallel_root: bool,
    /// Fixed seed for the random bot; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for BotSettings {
    fn default() -> Self {
        BotSettings {
            depth: DEFAULT_DEPTH,
            orb_weight: 0.5,
            parallel_root: true,
            seed: None,
        }
    }
}
