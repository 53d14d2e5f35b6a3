//! Single-letter refinement grid over a primary cell.
//!
//! Letters fill the 6-column layout row by row: `A`–`F` on the first row through
//! `Y`–`Z` on the last, leaving the final four cells of the fifth row without a
//! letter.

use super::{GridLayout, REFINEMENT_COLUMNS, REFINEMENT_ROWS};
use crate::domain::{Bounds, Letter, Point};

/// 6×5 letter grid laid over an arbitrary rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementGrid {
    layout: GridLayout,
}

impl RefinementGrid {
    #[must_use]
    pub const fn new(bounds: Bounds) -> Self {
        Self {
            layout: GridLayout::new(bounds, REFINEMENT_ROWS, REFINEMENT_COLUMNS),
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Center of the sub-cell for `letter`.
    #[must_use]
    pub fn position_for(&self, letter: Letter) -> Option<Point> {
        let (row, column) = Self::cell_of(letter);
        self.layout.cell_center(row, column)
    }

    /// Frame of the sub-cell for `letter`.
    #[must_use]
    pub fn frame_for(&self, letter: Letter) -> Option<Bounds> {
        let (row, column) = Self::cell_of(letter);
        self.layout.cell_frame(row, column)
    }

    /// Every addressable sub-cell center, `A` first.
    ///
    /// The iterator borrows the grid and may be recreated any number of times.
    pub fn all_positions(&self) -> impl Iterator<Item = (Letter, Point)> + '_ {
        Letter::all().filter_map(|letter| self.position_for(letter).map(|p| (letter, p)))
    }

    const fn cell_of(letter: Letter) -> (usize, usize) {
        (
            letter.index() / REFINEMENT_COLUMNS,
            letter.index() % REFINEMENT_COLUMNS,
        )
    }
}
