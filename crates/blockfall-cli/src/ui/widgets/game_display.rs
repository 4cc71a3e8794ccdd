use blockfall_engine::{Snapshot, StateTag};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{BoardDisplay, MenuDisplay, StatsDisplay, color, style};

/// Whole game screen: stats, playfield and next-piece preview.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    snapshot: &'a Snapshot,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> GameDisplay<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let snapshot = self.snapshot;
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = match snapshot.state {
            StateTag::StartMenu => color::GRAY,
            StateTag::Playing => color::WHITE,
            StateTag::Paused => color::YELLOW,
            StateTag::GameOver => color::RED,
        };

        let game_board = BoardDisplay::new(&snapshot.board).block(
            Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let preview = {
            let panel = BoardDisplay::new(&snapshot.preview).show_dots(false).block(
                Block::bordered()
                    .title(Line::from("NEXT").centered())
                    .padding(block_padding)
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
            if let Some(kind) = snapshot.next {
                panel.filled_style(style::shape(kind))
            } else {
                panel
            }
        };
        let stats = StatsDisplay::new(snapshot).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT),
        );

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(preview.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] =
            Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [preview_area] =
            Layout::vertical([Constraint::Length(preview.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        preview.render(preview_area, buf);

        if snapshot.state.is_start_menu() {
            let area = board_area.centered(
                Constraint::Length(game_board_width),
                Constraint::Length(MenuDisplay::height()),
            );
            MenuDisplay::new(snapshot).render(area, buf);
            return;
        }

        let popup = match snapshot.state {
            StateTag::StartMenu | StateTag::Playing => None,
            StateTag::Paused => Some(("PAUSED", style::PAUSED)),
            StateTag::GameOver => Some(("GAME OVER!!", style::GAME_OVER)),
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
