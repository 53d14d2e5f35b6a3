//! Grid coordinate math.
//!
//! A [`GridLayout`] subdivides a rectangle into a `rows × columns` matrix and maps
//! cell indices to cell frames and centers. Two instantiations exist:
//!
//! - the **primary grid**: 26×26 over the main display, addressed by a two-letter
//!   [`Label`] (row letter, then column letter);
//! - the **refinement grid** ([`RefinementGrid`]): 5 rows of 6 columns over the
//!   cell picked on the primary grid, addressed by a single letter.
//!
//! Cell edges are computed from the fraction `i / n` of the extent rather than by
//! accumulating a cell size, so neighbouring cells share bit-identical edges and
//! the frames tile the bounds with no gaps or overlaps.
//!
//! # Example
//!
//! ```rust
//! use keygrid::domain::Bounds;
//! use keygrid::grid::{GridLayout, Label};
//!
//! let grid = GridLayout::primary(Bounds::new(0.0, 0.0, 2600.0, 1300.0));
//! let label: Label = "MN".parse()?;
//! let frame = grid.frame_for(&label).unwrap();
//! assert_eq!(frame.x, 1300.0);
//! assert_eq!(frame.y, 600.0);
//! # Ok::<(), keygrid::KeygridError>(())
//! ```

mod refinement;

pub use refinement::RefinementGrid;

use crate::domain::{Bounds, KeygridError, Letter, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rows of the primary grid.
pub const PRIMARY_ROWS: usize = 26;

/// Columns of the primary grid.
pub const PRIMARY_COLUMNS: usize = 26;

/// Rows of the refinement grid. The grid is 6 wide by 5 high, filled row by
/// row: A–F, G–L, M–R, S–X, then Y–Z.
pub const REFINEMENT_ROWS: usize = 5;

/// Columns of the refinement grid.
pub const REFINEMENT_COLUMNS: usize = 6;

/// Two-letter address of a primary grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label {
    pub row: Letter,
    pub column: Letter,
}

impl Label {
    #[must_use]
    pub const fn new(row: Letter, column: Letter) -> Self {
        Self { row, column }
    }

    /// Label for the 0-based `(row, column)` pair, or `None` outside `0..26`.
    #[must_use]
    pub fn for_indices(row: usize, column: usize) -> Option<Self> {
        Some(Self::new(Letter::from_index(row)?, Letter::from_index(column)?))
    }
}

impl FromStr for Label {
    type Err = KeygridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(c), None) => Letter::from_char(r)
                .zip(Letter::from_char(c))
                .map(|(row, column)| Self::new(row, column))
                .ok_or_else(|| KeygridError::InvalidAddress(s.to_string())),
            _ => Err(KeygridError::InvalidAddress(s.to_string())),
        }
    }
}

impl TryFrom<String> for Label {
    type Error = KeygridError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

/// A rectangle subdivided into a fixed `rows × columns` matrix.
///
/// Also serves as the shape handed to the overlay renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub bounds: Bounds,
    pub rows: usize,
    pub columns: usize,
}

impl GridLayout {
    #[must_use]
    pub const fn new(bounds: Bounds, rows: usize, columns: usize) -> Self {
        Self {
            bounds,
            rows,
            columns,
        }
    }

    /// The 26×26 primary grid over `bounds`.
    #[must_use]
    pub const fn primary(bounds: Bounds) -> Self {
        Self::new(bounds, PRIMARY_ROWS, PRIMARY_COLUMNS)
    }

    /// Frame of the cell at `(row, column)`, or `None` when out of range.
    #[must_use]
    pub fn cell_frame(&self, row: usize, column: usize) -> Option<Bounds> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        let x0 = self.column_edge(column);
        let x1 = self.column_edge(column + 1);
        let y0 = self.row_edge(row);
        let y1 = self.row_edge(row + 1);
        Some(Bounds::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Center of the cell at `(row, column)`.
    #[must_use]
    pub fn cell_center(&self, row: usize, column: usize) -> Option<Point> {
        self.cell_frame(row, column).map(|frame| frame.center())
    }

    /// Label of the cell at `(row, column)`.
    #[must_use]
    pub fn label_for(&self, row: usize, column: usize) -> Option<Label> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Label::for_indices(row, column)
    }

    /// Center of the cell addressed by `label`.
    #[must_use]
    pub fn position_for(&self, label: &Label) -> Option<Point> {
        self.cell_center(label.row.index(), label.column.index())
    }

    /// Full frame of the cell addressed by `label`.
    #[must_use]
    pub fn frame_for(&self, label: &Label) -> Option<Bounds> {
        self.cell_frame(label.row.index(), label.column.index())
    }

    /// Parses `text` as a label and resolves its frame.
    ///
    /// # Errors
    ///
    /// Returns [`KeygridError::InvalidAddress`] if `text` is not two letters or the
    /// addressed cell lies outside this grid.
    pub fn resolve(&self, text: &str) -> crate::Result<(Label, Bounds)> {
        let label: Label = text.parse()?;
        let frame = self
            .frame_for(&label)
            .ok_or_else(|| KeygridError::InvalidAddress(text.to_string()))?;
        Ok((label, frame))
    }

    #[allow(clippy::cast_precision_loss)]
    fn column_edge(&self, i: usize) -> f64 {
        if i == self.columns {
            return self.bounds.max_x();
        }
        self.bounds.x + self.bounds.width * i as f64 / self.columns as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn row_edge(&self, i: usize) -> f64 {
        if i == self.rows {
            return self.bounds.max_y();
        }
        self.bounds.y + self.bounds.height * i as f64 / self.rows as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn screen() -> Bounds {
        Bounds::new(0.0, 0.0, 1728.0, 1117.0)
    }

    #[test]
    fn label_round_trips_indices() {
        let grid = GridLayout::primary(screen());
        for row in 0..PRIMARY_ROWS {
            for column in 0..PRIMARY_COLUMNS {
                let label = grid.label_for(row, column).unwrap();
                assert_eq!(label.row.index(), row);
                assert_eq!(label.column.index(), column);
                let parsed: Label = label.to_string().parse().unwrap();
                assert_eq!(parsed, label);
            }
        }
        assert!(grid.label_for(26, 0).is_none());
        assert!(grid.label_for(0, 26).is_none());
    }

    #[test]
    fn center_lies_inside_its_frame() {
        let grid = GridLayout::primary(screen());
        for row in 0..PRIMARY_ROWS {
            for column in 0..PRIMARY_COLUMNS {
                let label = grid.label_for(row, column).unwrap();
                let frame = grid.frame_for(&label).unwrap();
                let center = grid.position_for(&label).unwrap();
                assert!(frame.contains(center), "{label} center outside frame");
                assert_eq!(center, frame.center());
            }
        }
    }

    #[test]
    fn frames_have_equal_area_and_tile_bounds() {
        let bounds = Bounds::new(-1440.0, 200.0, 1440.0, 900.0);
        let grid = GridLayout::primary(bounds);
        let expected = bounds.area() / 676.0;

        let mut total = 0.0;
        for row in 0..PRIMARY_ROWS {
            for column in 0..PRIMARY_COLUMNS {
                let frame = grid.cell_frame(row, column).unwrap();
                assert!((frame.area() - expected).abs() < EPSILON);
                total += frame.area();

                if column + 1 < PRIMARY_COLUMNS {
                    let right = grid.cell_frame(row, column + 1).unwrap();
                    assert!((frame.max_x() - right.x).abs() < EPSILON);
                }
                if row + 1 < PRIMARY_ROWS {
                    let below = grid.cell_frame(row + 1, column).unwrap();
                    assert!((frame.max_y() - below.y).abs() < EPSILON);
                }
            }
        }
        assert!((total - bounds.area()).abs() < 1e-3);

        let last = grid.cell_frame(25, 25).unwrap();
        assert!((last.max_x() - bounds.max_x()).abs() < EPSILON);
        assert!((last.max_y() - bounds.max_y()).abs() < EPSILON);
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for text in ["", "A", "ABC", "A1", "é!", "  "] {
            assert!(text.parse::<Label>().is_err(), "{text:?} parsed");
        }
        assert_eq!("mn".parse::<Label>().unwrap().to_string(), "MN");
    }

    #[test]
    fn resolve_rejects_cells_outside_smaller_grid() {
        let grid = GridLayout::new(screen(), 4, 4);
        assert!(grid.resolve("BC").is_ok());
        assert!(matches!(
            grid.resolve("ZZ"),
            Err(KeygridError::InvalidAddress(_))
        ));
    }
}
