use std::fmt;

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Largest extent of a catalog shape along either axis.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Enum representing the type of shape in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum ShapeKind {
    /// Square.
    O = 0,
    /// Bar.
    I = 1,
    /// T-shape.
    T = 2,
    /// J-shape.
    J = 3,
    /// L-shape.
    L = 4,
    /// S-shape.
    S = 5,
    /// Z-shape.
    Z = 6,
}

/// Uniform draw over the seven catalog kinds.
impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        ShapeKind::ALL[rng.random_range(0..ShapeKind::LEN)]
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    /// Every kind, in catalog order.
    pub const ALL: [ShapeKind; Self::LEN] = [
        ShapeKind::O,
        ShapeKind::I,
        ShapeKind::T,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::S,
        ShapeKind::Z,
    ];

    /// Returns the spawn orientation of this kind.
    #[must_use]
    pub fn shape(self) -> Shape {
        Shape::from_pattern(self, CATALOG[self as usize])
    }

    /// Returns the single character representation of this shape kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::I.as_char(), 'I');
    /// assert_eq!(ShapeKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ShapeKind::O => 'O',
            ShapeKind::I => 'I',
            ShapeKind::T => 'T',
            ShapeKind::J => 'J',
            ShapeKind::L => 'L',
            ShapeKind::S => 'S',
            ShapeKind::Z => 'Z',
        }
    }

    /// Parses a shape kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'O' => Some(ShapeKind::O),
            'I' => Some(ShapeKind::I),
            'T' => Some(ShapeKind::T),
            'J' => Some(ShapeKind::J),
            'L' => Some(ShapeKind::L),
            'S' => Some(ShapeKind::S),
            'Z' => Some(ShapeKind::Z),
            _ => None,
        }
    }
}

// `#` is a filled cell, `.` an empty one. Rows are listed top to bottom.
const CATALOG: [&[&str]; ShapeKind::LEN] = [
    &["##", "##"],
    &["####"],
    &[".#.", "###"],
    &["#..", "###"],
    &["..#", "###"],
    &[".##", "##."],
    &["##.", ".##"],
];

/// A rectangular binary matrix describing a piece.
///
/// Shapes are immutable: [`Shape::rotated_clockwise`] returns a new matrix and
/// no rotation index is stored, so the orientation is implied by the cells
/// themselves. Each row is kept as a bitmask where bit `x` marks column `x`.
///
/// # Example
///
/// ```
/// use blockfall_engine::ShapeKind;
///
/// let t = ShapeKind::T.shape();
/// assert_eq!((t.width(), t.height()), (3, 2));
///
/// let rotated = t.rotated_clockwise();
/// assert_eq!((rotated.width(), rotated.height()), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    kind: ShapeKind,
    width: usize,
    rows: ArrayVec<u8, MAX_SHAPE_SIZE>,
}

impl Shape {
    fn from_pattern(kind: ShapeKind, pattern: &[&str]) -> Self {
        let width = pattern.first().map_or(0, |line| line.len());
        let rows = pattern
            .iter()
            .map(|line| {
                line.bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'#')
                    .fold(0, |mask, (x, _)| mask | (1 << x))
            })
            .collect();
        Self { kind, width, rows }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the cell at column `x`, row `y` of the matrix is filled.
    ///
    /// Coordinates outside the matrix are reported as empty.
    #[must_use]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width && self.rows.get(y).is_some_and(|row| row & (1 << x) != 0)
    }

    /// Returns an iterator of `(x, y)` offsets of the filled cells, row by row.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height())
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_filled(x, y))
    }

    /// Rotates the matrix by 90° clockwise.
    ///
    /// For a shape of height `H` and width `W` the result has height `W` and
    /// width `H`, with `new[r][c] = old[H - 1 - c][r]`.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let height = self.height();
        let rows = (0..self.width)
            .map(|r| {
                (0..height)
                    .filter(|&c| self.is_filled(r, height - 1 - c))
                    .fold(0, |mask, c| mask | (1 << c))
            })
            .collect();
        Self {
            kind: self.kind,
            width: height,
            rows,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            if y > 0 {
                writeln!(f)?;
            }
            for x in 0..self.width {
                f.write_str(if self.is_filled(x, y) { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}
