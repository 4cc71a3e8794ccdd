use blockfall_engine::Snapshot;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Widget},
};

use crate::ui::widgets::style;

/// Start-menu panel drawn over the empty board.
pub struct MenuDisplay<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> MenuDisplay<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn height() -> u16 {
        7
    }
}

impl Widget for MenuDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::new().style(style::MENU);
        let text = Text::from(vec![
            Line::from("BLOCKFALL"),
            Line::from(""),
            Line::from(format!("LEVEL  ↑↓  {:>2}", self.snapshot.start_level)),
            Line::from(format!("LINES  ←→  {:>2}", self.snapshot.start_lines)),
            Line::from(""),
            Line::from("ENTER TO START"),
        ])
        .style(style::MENU)
        .centered();
        let inner = block.inner(area);
        Clear.render(area, buf);
        block.render(area, buf);
        text.render(
            inner.centered_vertically(Constraint::Length(Self::height() - 1)),
            buf,
        );
    }
}
