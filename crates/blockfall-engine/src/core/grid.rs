use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::placement::ActivePiece;

/// A single cell of a [`Grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty,
    Filled,
}

impl Cell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub fn is_filled(self) -> bool {
        self == Cell::Filled
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Filled => '#',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Empty),
            '#' => Some(Cell::Filled),
            _ => None,
        }
    }
}

/// A single row of a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    cells: Vec<Cell>,
}

impl GridRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; width],
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_filled())
    }

    #[must_use]
    pub fn has_filled(&self) -> bool {
        self.cells.iter().any(|c| c.is_filled())
    }
}

/// Error returned when a grid cannot be built from its text form.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridParseError {
    #[display("grid must have at least one row and one column")]
    Empty,
    #[display("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[display("invalid cell {ch:?} in row {row}")]
    InvalidCell { row: usize, ch: char },
}

/// Fixed-size rectangular array of cells.
///
/// Row `0` is the top of the board and `y` grows downward. The dimensions are
/// set at creation and never change: clearing rows removes and re-inserts rows
/// rather than resizing.
///
/// A `Grid` is used both for the settled cells of a session and for the render
/// grid handed to front-ends (see [`Grid::overlay`]).
///
/// # Serialization
///
/// Serialized as an array of row strings, `.` for empty and `#` for filled:
///
/// ```
/// use blockfall_engine::Grid;
///
/// let grid = Grid::from_rows(&["..#", "###"]).unwrap();
/// assert_eq!(grid.width(), 3);
/// assert_eq!(grid.height(), 2);
/// assert_eq!(grid.filled_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    rows: Vec<GridRow>,
}

impl Grid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            rows: vec![GridRow::empty(width); height],
        }
    }

    /// Builds a grid from row strings (`.` empty, `#` filled), top row first.
    pub fn from_rows<S>(rows: &[S]) -> Result<Self, GridParseError>
    where
        S: AsRef<str>,
    {
        let expected = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if expected == 0 {
            return Err(GridParseError::Empty);
        }
        let rows = rows
            .iter()
            .enumerate()
            .map(|(y, line)| {
                let cells = line
                    .as_ref()
                    .chars()
                    .map(|ch| Cell::from_char(ch).ok_or(GridParseError::InvalidCell { row: y, ch }))
                    .collect::<Result<Vec<_>, _>>()?;
                if cells.len() != expected {
                    return Err(GridParseError::RaggedRow {
                        row: y,
                        width: cells.len(),
                        expected,
                    });
                }
                Ok(GridRow { cells })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            width: expected,
            rows,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cell at the given coordinates, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)?.cells.get(x).copied()
    }

    /// Returns whether the cell at the given coordinates is filled.
    ///
    /// Coordinates outside the grid are never filled.
    #[must_use]
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(Cell::is_filled)
    }

    /// Sets a single cell. Coordinates outside the grid are ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.cells.get_mut(x)) {
            *slot = cell;
        }
    }

    /// Replaces the contents of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of range or `cells` does not match the grid width.
    pub fn replace_row(&mut self, y: usize, cells: Vec<Cell>) {
        assert_eq!(cells.len(), self.width, "row width mismatch");
        self.rows[y] = GridRow { cells };
    }

    pub fn rows(&self) -> impl Iterator<Item = &GridRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn row(&self, y: usize) -> Option<&GridRow> {
        self.rows.get(y)
    }

    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.iter().filter(|c| c.is_filled()).count())
            .sum()
    }

    /// Writes the piece's filled cells into this grid.
    ///
    /// Cells above the visible area (`y < 0`) are dropped.
    pub fn fill_piece(&mut self, piece: &ActivePiece) {
        for (x, y) in piece.cells() {
            if y >= 0 {
                self.set(x, y, Cell::Filled);
            }
        }
    }

    /// Returns a copy of this grid with the piece drawn on top.
    ///
    /// `self` is left untouched; this is the only grid front-ends ever see.
    #[must_use]
    pub fn overlay(&self, piece: &ActivePiece) -> Self {
        let mut grid = self.clone();
        grid.fill_piece(piece);
        grid
    }

    /// Removes full rows and returns how many were cleared.
    ///
    /// Rows are scanned top to bottom in a single pass. A full row is removed and
    /// an empty row is inserted at the top, shifting the rows above it down by
    /// one; the index just cleared is not examined again.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        for y in 0..self.rows.len() {
            if self.rows[y].is_full() {
                self.rows.remove(y);
                self.rows.insert(0, GridRow::empty(self.width));
                cleared += 1;
            }
        }
        cleared
    }
}

impl Serialize for Grid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(
            self.rows
                .iter()
                .map(|row| row.cells.iter().map(|c| c.as_char()).collect::<String>()),
        )
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Grid::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}
