use serde::{Deserialize, Serialize};

use super::{grid::Grid, shape::Shape};

/// Anchor of a piece: grid coordinates of the shape's top-left cell.
///
/// `y` may be negative while a piece spawns above the visible grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn with_x(self, x: i32) -> Self {
        Self { x, y: self.y }
    }

    #[must_use]
    pub const fn down(self) -> Self {
        Self {
            x: self.x,
            y: self.y + 1,
        }
    }
}

/// The piece under player control: a shape at an anchor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    shape: Shape,
    position: Position,
}

impl ActivePiece {
    #[must_use]
    pub fn new(shape: Shape, position: Position) -> Self {
        Self { shape, position }
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns an iterator of grid coordinates covered by the filled cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        shape_cells(&self.shape, self.position)
    }

    #[must_use]
    pub fn moved_to(&self, position: Position) -> Self {
        Self {
            shape: self.shape.clone(),
            position,
        }
    }

    #[must_use]
    pub fn reshaped(&self, shape: Shape) -> Self {
        Self {
            shape,
            position: self.position,
        }
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn shape_cells(shape: &Shape, position: Position) -> impl Iterator<Item = (i32, i32)> + '_ {
    shape
        .filled_cells()
        .map(move |(dx, dy)| (position.x + to_i32(dx), position.y + to_i32(dy)))
}

/// Placement predicates against a grid of settled cells.
impl Grid {
    /// Returns whether every filled cell lies in `0 <= x < width` and `y < height`.
    ///
    /// There is no lower bound on `y`, so pieces may stick out above the grid.
    #[must_use]
    pub fn is_inside_bounds(&self, shape: &Shape, position: Position) -> bool {
        let width = to_i32(self.width());
        let height = to_i32(self.height());
        shape_cells(shape, position).all(|(x, y)| (0..width).contains(&x) && y < height)
    }

    /// Returns whether the shape can occupy `position` without overlapping settled cells.
    ///
    /// The placement is rejected when the shape's bottom extends past the last row.
    /// Cells above the grid never conflict.
    #[must_use]
    pub fn has_no_conflict(&self, shape: &Shape, position: Position) -> bool {
        if position.y + to_i32(shape.height()) > to_i32(self.height()) {
            return false;
        }
        shape_cells(shape, position).all(|(x, y)| y < 0 || !self.is_filled(x, y))
    }

    /// Returns whether the shape rests on the floor or on the stack.
    ///
    /// `true` means that descending one more row would push a cell past the
    /// last row or onto a settled cell, so the piece has to lock instead.
    #[must_use]
    pub fn is_touching(&self, shape: &Shape, position: Position) -> bool {
        let height = to_i32(self.height());
        if position.y + to_i32(shape.height()) >= height {
            return true;
        }
        shape_cells(shape, position).any(|(x, y)| {
            let below = y + 1;
            below >= 0 && self.is_filled(x, below)
        })
    }

    /// Returns the position the shape would come to rest at when dropped from `position`.
    #[must_use]
    pub fn drop_position(&self, shape: &Shape, position: Position) -> Position {
        let mut position = position;
        while !self.is_touching(shape, position) {
            position = position.down();
        }
        position
    }
}
