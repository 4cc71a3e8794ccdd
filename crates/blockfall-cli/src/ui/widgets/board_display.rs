use std::iter;

use blockfall_engine::Grid;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{CellDisplay, style};

/// Draws any [`Grid`]: the playfield or the next-piece preview.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    grid: &'a Grid,
    filled: Style,
    show_dots: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            filled: style::SETTLED,
            show_dots: true,
            block: None,
        }
    }

    pub fn filled_style(self, filled: Style) -> Self {
        Self { filled, ..self }
    }

    pub fn show_dots(self, show_dots: bool) -> Self {
        Self { show_dots, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::to_u16(self.grid.width()).saturating_mul(CellDisplay::width())
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::to_u16(self.grid.height()).saturating_mul(CellDisplay::height())
            + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.grid.width()).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints =
            (0..self.grid.height()).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.grid.rows()) {
            for (grid_cell, cell) in iter::zip(grid_row, row.cells()) {
                CellDisplay::from_cell(*cell, self.filled, self.show_dots).render(grid_cell, buf);
            }
        }
    }
}
