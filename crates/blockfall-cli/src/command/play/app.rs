use std::{io, time::Instant};

use blockfall_engine::{Command, GameController, GameEvent, HighScoreStore, StateTag};
use crossterm::{
    ExecutableCommand as _,
    event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    text::Text,
};

use crate::{
    tui::{EventLoop, TuiEvent},
    ui::widgets::{GameDisplay, style},
};

/// Summary of the games played in one run of the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub last_score: Option<u64>,
    pub new_high_score: Option<u64>,
}

#[derive(Debug)]
pub struct PlayApp<S> {
    game: GameController<S>,
    events: EventLoop,
    keyboard_enhanced: bool,
    last_sync: Instant,
    summary: PlaySummary,
    is_exiting: bool,
}

impl<S> PlayApp<S>
where
    S: HighScoreStore,
{
    pub fn new(game: GameController<S>) -> Self {
        Self {
            game,
            events: EventLoop::new(),
            keyboard_enhanced: false,
            last_sync: Instant::now(),
            summary: PlaySummary::default(),
            is_exiting: false,
        }
    }

    pub fn summary(&self) -> PlaySummary {
        self.summary
    }

    pub fn into_game(self) -> GameController<S> {
        self.game
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        // Release events are only reported with the enhancement flags; without
        // them every press is a single step and the terminal repeats held keys.
        self.keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.keyboard_enhanced {
            io::stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }

        let result = self.run_loop(terminal);

        if self.keyboard_enhanced {
            _ = io::stdout().execute(PopKeyboardEnhancementFlags);
        }
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        self.last_sync = Instant::now();
        while !self.is_exiting {
            let deadline = self
                .game
                .time_until_next_task()
                .map(|wait| self.last_sync + wait);
            match self.events.next(deadline)? {
                TuiEvent::Tick => self.sync(),
                TuiEvent::Render => {
                    terminal.draw(|frame| self.draw(frame))?;
                }
                TuiEvent::Crossterm(event) => {
                    self.sync();
                    self.handle_event(&event);
                    self.collect_events();
                }
            }
        }
        Ok(())
    }

    /// Catches the engine up with the wall clock.
    fn sync(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_sync);
        self.game.advance(elapsed);
        self.last_sync = now;
        self.collect_events();
    }

    fn collect_events(&mut self) {
        for event in self.game.drain_events() {
            if let GameEvent::HighScore { score } = event {
                self.summary.new_high_score = Some(score);
            }
        }
        if let Some(stats) = self.game.state().stats() {
            self.summary.last_score = Some(stats.score());
        }
    }

    fn handle_event(&mut self, event: &Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if is_quit_key(&key) {
            if key.is_press() {
                self.is_exiting = true;
            }
            return;
        }

        let in_menu = self.game.state().is_start_menu();
        let Some(command) = key_command(key.code, in_menu) else {
            return;
        };
        match key.kind {
            KeyEventKind::Press if self.keyboard_enhanced => self.game.press(command),
            KeyEventKind::Press => self.game.handle(command),
            KeyEventKind::Release => self.game.release(command),
            KeyEventKind::Repeat => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let snapshot = self.game.snapshot();
        let help_text = match snapshot.state {
            StateTag::StartMenu => {
                "Controls: ↑ ↓ (Start Level) | ← → (Start Lines) | Enter (Start) | Q (Quit)"
            }
            StateTag::Playing => {
                "Controls: ← → (Move) | ↓ (Soft Drop) | ↑ (Rotate) | Space (Hard Drop) | P (Pause) | Esc (End) | Q (Quit)"
            }
            StateTag::Paused => "Controls: P (Resume) | Esc (End) | Q (Quit)",
            StateTag::GameOver => "Controls: Enter (Play Again) | Esc (Menu) | Q (Quit)",
        };
        let help_text = Text::from(help_text).style(style::HELP).centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(GameDisplay::new(&snapshot), main_area);
        frame.render_widget(help_text, help_area);
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Maps a key to an engine command.
///
/// The arrow keys adjust the start settings while the menu is shown and move
/// the piece otherwise.
fn key_command(code: KeyCode, in_menu: bool) -> Option<Command> {
    let command = match code {
        KeyCode::Left if in_menu => Command::StartLinesDown,
        KeyCode::Right if in_menu => Command::StartLinesUp,
        KeyCode::Up if in_menu => Command::StartLevelUp,
        KeyCode::Down if in_menu => Command::StartLevelDown,
        KeyCode::Left => Command::MoveLeft,
        KeyCode::Right => Command::MoveRight,
        KeyCode::Up => Command::RotateClockwise,
        KeyCode::Down => Command::SoftDrop,
        KeyCode::Char(' ') => Command::HardDrop,
        KeyCode::Enter => Command::Start,
        KeyCode::Char('p') => Command::PauseToggle,
        KeyCode::Esc => Command::End,
        _ => return None,
    };
    Some(command)
}
