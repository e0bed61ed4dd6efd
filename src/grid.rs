//! `Grid`: the 5×5 cell matrix of a muddle.
//!
//! Cells hold a lowercase letter or [`WILDCARD`] (`'-'`) for "not yet known".
//! A solved muddle is symmetric: row `r` read left to right equals column `r`
//! read top to bottom.

use crate::letter::{MuddleChar, GRID_SIZE, WILDCARD};
use std::fmt;

pub type Cells = [[char; GRID_SIZE]; GRID_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Cells,
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl Grid {
    /// A grid with every cell unknown.
    #[must_use]
    pub fn empty() -> Self {
        Self { cells: [[WILDCARD; GRID_SIZE]; GRID_SIZE] }
    }

    /// Wrap already-validated cells.
    #[must_use]
    pub fn from_cells(cells: Cells) -> Self {
        debug_assert!(
            cells.iter().flatten().all(|c| c.is_letter() || c.is_wildcard()),
            "grid cells must be a-z or '-'"
        );
        Self { cells }
    }

    #[must_use]
    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> char {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: char) {
        self.cells[row][col] = cell;
    }

    #[must_use]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.cells[row][col].is_letter()
    }

    /// Row `row` as a pattern string (letters and `'-'`).
    #[must_use]
    pub fn row_pattern(&self, row: usize) -> String {
        self.cells[row].iter().collect()
    }

    /// All rows as strings, top to bottom.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        (0..GRID_SIZE).map(|r| self.row_pattern(r)).collect()
    }

    /// Write `word` into row `row` and, mirrored, into column `row`.
    pub fn place_mirrored(&mut self, row: usize, word: &[char]) {
        debug_assert_eq!(word.len(), GRID_SIZE, "a row word fills the whole row");
        for (col, &letter) in word.iter().enumerate() {
            self.cells[row][col] = letter;
            self.cells[col][row] = letter;
        }
    }

    /// Restore every cell whose row and column are both at least `from` to its value in `start`.
    ///
    /// Cells above or left of that block were committed by earlier rows and stay as they are.
    pub fn reset_from(&mut self, from: usize, start: &Grid) {
        for r in from..GRID_SIZE {
            for c in from..GRID_SIZE {
                self.cells[r][c] = start.cells[r][c];
            }
        }
    }

    /// No wildcard cells left.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(MuddleChar::is_letter)
    }

    /// `grid[r][c] == grid[c][r]` everywhere.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        (0..GRID_SIZE).all(|r| (0..r).all(|c| self.cells[r][c] == self.cells[c][r]))
    }

    /// Filled letters in row-major order.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.cells.iter().flatten().copied().filter(MuddleChar::is_letter)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.to_ascii_uppercase())?;
            }
        }
        Ok(())
    }
}
