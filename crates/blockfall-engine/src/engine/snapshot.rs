use serde::Serialize;

use crate::{ActivePiece, Grid, Position, Shape, ShapeKind};

/// Rows of the next-piece preview grid.
pub const PREVIEW_HEIGHT: usize = 2;
/// Columns of the next-piece preview grid.
pub const PREVIEW_WIDTH: usize = 4;

/// State tag of a [`GameController`](super::GameController), without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[derive(derive_more::Display, derive_more::IsVariant)]
pub enum StateTag {
    #[display("menu")]
    StartMenu,
    #[display("playing")]
    Playing,
    #[display("paused")]
    Paused,
    #[display("game over")]
    GameOver,
}

/// Everything a front-end needs to draw one frame.
///
/// Snapshots are detached copies; holding one never blocks the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub state: StateTag,
    /// Settled cells with the active piece drawn on top.
    pub board: Grid,
    /// Next shape drawn at the top-left of a 2×4 grid; empty outside a session.
    pub preview: Grid,
    /// Kind of the next shape, while a session exists.
    pub next: Option<ShapeKind>,
    pub score: u64,
    pub level: u8,
    pub cleared_lines: usize,
    pub high_score: u64,
    pub start_level: u8,
    pub start_lines: usize,
}

/// Renders `shape` into a fresh preview grid.
#[must_use]
pub fn preview_grid(shape: Option<&Shape>) -> Grid {
    let mut grid = Grid::new(PREVIEW_WIDTH, PREVIEW_HEIGHT);
    if let Some(shape) = shape {
        grid.fill_piece(&ActivePiece::new(shape.clone(), Position::new(0, 0)));
    }
    grid
}
