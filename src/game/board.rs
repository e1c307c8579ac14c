use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Player;
use crate::error::{MoveError, SnapshotError};

/// Neighbor offsets in resolution order: up, right, down, left.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// A grid position. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub owner: Option<Player>,
    pub orbs: u32,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        owner: None,
        orbs: 0,
    };

    pub fn owned(player: Player, orbs: u32) -> Self {
        Cell {
            owner: Some(player),
            orbs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
    }

    /// A player may place here if the cell is empty or already theirs.
    pub fn accepts(&self, player: Player) -> bool {
        self.owner.is_none_or(|owner| owner == player)
    }
}

/// Fixed-size rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is below 2; smaller grids would contain
    /// cells with fewer than two neighbors.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(
            rows >= 2 && cols >= 2,
            "board must be at least 2x2, got {rows}x{cols}"
        );
        Board {
            rows,
            cols,
            cells: vec![Cell::EMPTY; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Bounds-checked conversion of raw indices into a [`Coord`].
    pub fn coord(&self, row: usize, col: usize) -> Result<Coord, MoveError> {
        if self.contains(row, col) {
            Ok(Coord::new(row, col))
        } else {
            Err(MoveError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    #[inline]
    fn index(&self, at: Coord) -> usize {
        at.row * self.cols + at.col
    }

    /// Number of in-bounds orthogonal neighbors: 2 in corners, 3 on edges, 4 inside.
    #[inline]
    pub fn capacity(&self, at: Coord) -> u32 {
        let edge_rows = (at.row == 0) as u32 + (at.row == self.rows - 1) as u32;
        let edge_cols = (at.col == 0) as u32 + (at.col == self.cols - 1) as u32;
        4 - edge_rows - edge_cols
    }

    /// Get the cell at a position
    #[inline]
    pub fn get(&self, at: Coord) -> Cell {
        self.cells[self.index(at)]
    }

    /// Bounds-checked lookup by raw indices.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell, MoveError> {
        self.coord(row, col).map(|at| self.get(at))
    }

    /// Only the cascade engine writes cells outside of tests.
    #[inline]
    pub(crate) fn set(&mut self, at: Coord, cell: Cell) {
        let idx = self.index(at);
        self.cells[idx] = cell;
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, at: Coord) -> &mut Cell {
        let idx = self.index(at);
        &mut self.cells[idx]
    }

    /// In-bounds orthogonal neighbors in the fixed order up, right, down, left.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
            let row = at.row.checked_add_signed(dr)?;
            let col = at.col.checked_add_signed(dc)?;
            self.contains(row, col).then_some(Coord::new(row, col))
        })
    }

    /// Every position in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let cols = self.cols;
        (0..self.rows * cols).map(move |i| Coord::new(i / cols, i % cols))
    }

    /// Every cell paired with its position, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.coords().zip(self.cells.iter().copied())
    }

    pub fn is_legal(&self, at: Coord, player: Player) -> bool {
        self.get(at).accepts(player)
    }

    /// Cells `player` may place on, in row-major order.
    pub fn legal_moves(&self, player: Player) -> Vec<Coord> {
        self.iter()
            .filter(|(_, cell)| cell.accepts(player))
            .map(|(at, _)| at)
            .collect()
    }

    pub fn owned_cells(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.owner == Some(player))
            .count()
    }

    pub fn orbs_of(&self, player: Player) -> u32 {
        self.cells
            .iter()
            .filter(|cell| cell.owner == Some(player))
            .map(|cell| cell.orbs)
            .sum()
    }

    pub fn total_orbs(&self) -> u32 {
        self.cells.iter().map(|cell| cell.orbs).sum()
    }

    /// True when no cell holds its capacity or more.
    pub fn is_stable(&self) -> bool {
        self.iter().all(|(at, cell)| cell.orbs < self.capacity(at))
    }
}

/// Snapshot text: `owner,orbs` per cell, `;` between cells, `|` between rows,
/// owner `-1` for an empty cell.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(self.cols).enumerate() {
            if row > 0 {
                f.write_str("|")?;
            }
            for (col, cell) in chunk.iter().enumerate() {
                if col > 0 {
                    f.write_str(";")?;
                }
                let owner = cell.owner.map_or(-1, |p| p.index() as i32);
                write!(f, "{},{}", owner, cell.orbs)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = 0;
        let mut cols = None;
        let mut cells = Vec::new();

        for (row, line) in s.trim().split('|').enumerate() {
            let start = cells.len();
            for (col, field) in line.split(';').enumerate() {
                let cell = parse_cell(field).ok_or_else(|| SnapshotError::BadCell {
                    row,
                    col,
                    text: field.to_string(),
                })?;
                cells.push(cell);
            }
            let width = cells.len() - start;
            match cols {
                None => cols = Some(width),
                Some(expected) if expected != width => {
                    return Err(SnapshotError::RaggedRow {
                        row,
                        expected,
                        found: width,
                    });
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let cols = cols.unwrap_or(0);
        if rows < 2 || cols < 2 {
            return Err(SnapshotError::TooSmall { rows, cols });
        }
        Ok(Board { rows, cols, cells })
    }
}

fn parse_cell(field: &str) -> Option<Cell> {
    let (owner, orbs) = field.split_once(',')?;
    let owner: i32 = owner.trim().parse().ok()?;
    let orbs: u32 = orbs.trim().parse().ok()?;
    match (owner, orbs) {
        (-1, 0) => Some(Cell::EMPTY),
        (o, n) if (0..u8::MAX as i32).contains(&o) && n > 0 => {
            Some(Cell::owned(Player(o as u8), n))
        }
        _ => None,
    }
}
