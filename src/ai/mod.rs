//! Automated opponents: a shared [`Bot`] trait and three strategies of
//! increasing strength.

mod agent;
pub mod eval;
mod greedy;
pub mod minimax;
mod random;

pub use agent::{Bot, BotKind, BotSettings};
pub use eval::{Heuristic, MaterialHeuristic};
pub use greedy::GreedyBot;
pub use minimax::MinimaxBot;
pub use random::RandomBot;
