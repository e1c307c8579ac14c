//! Move resolution: place an orb, then explode every cell that reaches its
//! capacity until the board settles.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{Board, Cell, Coord, Player};
use crate::error::MoveError;

/// Explosions allowed per cell before a resolution is declared runaway.
pub const DEFAULT_ITERATION_FACTOR: usize = 64;

/// One orb moving from an exploding cell into a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Coord,
    pub to: Coord,
    /// The player whose move set off the cascade; the receiving cell now belongs to them.
    pub player: Player,
    /// Explosion wave, starting at 0 for the cell the orb was placed on.
    pub wave: u32,
}

/// Ordered record of every transfer produced by one move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    transfers: Vec<Transfer>,
    halted: bool,
}

impl Trace {
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    /// Number of explosion waves in the trace.
    pub fn waves(&self) -> u32 {
        self.transfers.last().map_or(0, |t| t.wave + 1)
    }

    /// Transfers belonging to one wave. Waves are contiguous in the trace.
    pub fn wave(&self, wave: u32) -> &[Transfer] {
        let start = self.transfers.partition_point(|t| t.wave < wave);
        let end = self.transfers.partition_point(|t| t.wave <= wave);
        &self.transfers[start..end]
    }

    /// Number of cells that exploded.
    pub fn explosions(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for t in &self.transfers {
            if last != Some((t.from, t.wave)) {
                count += 1;
                last = Some((t.from, t.wave));
            }
        }
        count
    }

    /// True when resolution stopped early because the mover captured every
    /// opponent orb. Cells may remain at or above capacity in that case.
    pub fn halted(&self) -> bool {
        self.halted
    }
}

/// Explosion budget for a board: `rows * cols * factor`.
pub fn iteration_cap(board: &Board, factor: usize) -> usize {
    board.rows() * board.cols() * factor.max(1)
}

/// Place one orb for `player` at `at` and resolve the resulting cascade with
/// the default explosion budget.
pub fn apply_move(board: &mut Board, player: Player, at: Coord) -> Result<Trace, MoveError> {
    let cap = iteration_cap(board, DEFAULT_ITERATION_FACTOR);
    apply_move_capped(board, player, at, cap)
}

/// Like [`apply_move`] with an explicit explosion budget.
///
/// Cells are processed breadth-first. A cell is queued once when it reaches
/// capacity and keeps accumulating orbs until it is popped; an exploding cell
/// sends one orb to each neighbor and keeps any surplus, so the board's orb
/// total grows by exactly one per move.
pub fn apply_move_capped(
    board: &mut Board,
    player: Player,
    at: Coord,
    cap: usize,
) -> Result<Trace, MoveError> {
    let at = board.coord(at.row, at.col)?;
    let target = board.get(at);
    if let Some(owner) = target.owner.filter(|&owner| owner != player) {
        return Err(MoveError::IllegalMove {
            row: at.row,
            col: at.col,
            owner,
        });
    }

    let mut trace = Trace::default();
    let mut opponent_orbs = board.total_orbs() - board.orbs_of(player);
    let contested = opponent_orbs > 0;

    let placed_capacity = board.capacity(at);
    let placed = board.cell_mut(at);
    placed.owner = Some(player);
    placed.orbs += 1;
    if placed.orbs < placed_capacity {
        return Ok(trace);
    }

    let cols = board.cols();
    let flag = move |c: Coord| c.row * cols + c.col;
    let mut pending = vec![false; board.rows() * cols];
    let mut queue = VecDeque::new();
    pending[flag(at)] = true;
    queue.push_back((at, 0u32));

    let mut explosions = 0;
    while let Some((cell_at, wave)) = queue.pop_front() {
        pending[flag(cell_at)] = false;
        let capacity = board.capacity(cell_at);
        let cell = board.get(cell_at);
        if cell.orbs < capacity {
            continue;
        }

        explosions += 1;
        if explosions > cap {
            return Err(MoveError::CascadeOverflow { cap });
        }

        let left = cell.orbs - capacity;
        board.set(
            cell_at,
            if left == 0 {
                Cell::EMPTY
            } else {
                Cell::owned(player, left)
            },
        );
        if left >= capacity {
            pending[flag(cell_at)] = true;
            queue.push_back((cell_at, wave + 1));
        }

        let neighbors: Vec<Coord> = board.neighbors(cell_at).collect();
        for to in neighbors {
            trace.transfers.push(Transfer {
                from: cell_at,
                to,
                player,
                wave,
            });

            let to_capacity = board.capacity(to);
            let neighbor = board.cell_mut(to);
            if neighbor.owner.is_some_and(|owner| owner != player) {
                opponent_orbs -= neighbor.orbs;
            }
            neighbor.owner = Some(player);
            neighbor.orbs += 1;

            if neighbor.orbs >= to_capacity && !pending[flag(to)] {
                pending[flag(to)] = true;
                queue.push_back((to, wave + 1));
            }
        }

        if contested && opponent_orbs == 0 && !queue.is_empty() {
            trace.halted = true;
            break;
        }
    }

    tracing::trace!(
        %player,
        %at,
        explosions,
        transfers = trace.len(),
        halted = trace.halted,
        "cascade resolved"
    );
    Ok(trace)
}
