use std::{mem, time::Duration};

use crate::{ActivePiece, Grid, GridRow, PlacementError, Position, Shape};

use super::{
    command::{Command, RepeatKey},
    config::{ConfigError, EngineConfig},
    event::GameEvent,
    generator::{GameSeed, Randomizer},
    scheduler::TaskScheduler,
    score::{MAX_LEVEL, MIN_LEVEL, ScoreLevelTracker},
    snapshot::{Snapshot, StateTag, preview_grid},
    store::{HIGH_SCORE_KEY, HighScoreStore},
    timing::DropScheduler,
};

/// Names of the tasks a controller keeps in its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskName {
    AutoFall,
    LockDelay,
    Repeat(RepeatKey),
}

/// Start settings chosen in the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuSettings {
    start_level: u8,
    start_lines: usize,
}

impl MenuSettings {
    #[must_use]
    pub const fn start_level(self) -> u8 {
        self.start_level
    }

    #[must_use]
    pub const fn start_lines(self) -> usize {
        self.start_lines
    }
}

/// A running session: settled grid, active piece, queued shape and statistics.
#[derive(Debug, Clone)]
pub struct Session {
    board: Grid,
    piece: ActivePiece,
    next: Shape,
    stats: ScoreLevelTracker,
}

impl Session {
    fn start(config: &EngineConfig, menu: MenuSettings, rng: &mut Randomizer) -> Self {
        let width = config.board.width;
        let height = config.board.height;
        let mut board = Grid::new(width, height);
        for y in height.saturating_sub(menu.start_lines)..height {
            board.replace_row(y, rng.start_row(width));
        }
        let piece = ActivePiece::new(rng.next_shape(), config.spawn);
        Self {
            board,
            piece,
            next: rng.next_shape(),
            stats: ScoreLevelTracker::new(menu.start_level, config.level_up_lines),
        }
    }

    /// Settled cells, without the active piece.
    #[must_use]
    pub fn board(&self) -> &Grid {
        &self.board
    }

    #[must_use]
    pub fn piece(&self) -> &ActivePiece {
        &self.piece
    }

    #[must_use]
    pub fn next(&self) -> &Shape {
        &self.next
    }

    #[must_use]
    pub fn stats(&self) -> &ScoreLevelTracker {
        &self.stats
    }

    fn try_shift(&mut self, dx: i32) -> Result<(), PlacementError> {
        let max_x = i32::try_from(self.board.width())
            .unwrap_or(i32::MAX)
            .saturating_sub(i32::try_from(self.piece.shape().width()).unwrap_or(i32::MAX))
            .max(0);
        let current = self.piece.position();
        let candidate = current.with_x((current.x() + dx).clamp(0, max_x));
        if !self.board.has_no_conflict(self.piece.shape(), candidate) {
            return Err(PlacementError);
        }
        self.piece = self.piece.moved_to(candidate);
        Ok(())
    }

    /// Moves the piece one column left, clamped to the left wall.
    pub fn try_move_left(&mut self) -> Result<(), PlacementError> {
        self.try_shift(-1)
    }

    /// Moves the piece one column right, clamped to the right wall.
    pub fn try_move_right(&mut self) -> Result<(), PlacementError> {
        self.try_shift(1)
    }

    /// Rotates the piece clockwise in place. There are no wall kicks.
    pub fn try_rotate(&mut self) -> Result<(), PlacementError> {
        let rotated = self.piece.shape().rotated_clockwise();
        let position = self.piece.position();
        if !self.board.is_inside_bounds(&rotated, position)
            || !self.board.has_no_conflict(&rotated, position)
        {
            return Err(PlacementError);
        }
        self.piece = self.piece.reshaped(rotated);
        Ok(())
    }

    /// Moves the piece one row down unless it rests on the floor or the stack.
    pub fn try_move_down(&mut self) -> Result<(), PlacementError> {
        let (shape, position) = (self.piece.shape(), self.piece.position());
        if self.board.is_touching(shape, position) {
            return Err(PlacementError);
        }
        self.piece = self.piece.moved_to(self.piece.position().down());
        Ok(())
    }

    fn hard_drop(&mut self) {
        let rest = self
            .board
            .drop_position(self.piece.shape(), self.piece.position());
        self.piece = self.piece.moved_to(rest);
    }

    /// Merges the piece into the grid, clears rows and scores the lock.
    ///
    /// Returns the number of cleared rows.
    fn lock(&mut self) -> usize {
        self.board.fill_piece(&self.piece);
        let cleared = self.board.clear_full_rows();
        self.stats.complete_lock(cleared);
        cleared
    }

    fn is_topped_out(&self) -> bool {
        self.board.row(0).is_some_and(GridRow::has_filled)
    }

    fn spawn(&mut self, anchor: Position, rng: &mut Randomizer) {
        let shape = mem::replace(&mut self.next, rng.next_shape());
        self.piece = ActivePiece::new(shape, anchor);
    }
}

/// Controller state with its per-state payload.
///
/// A session (and with it the active piece) exists only while playing or
/// paused. `lock_pending` is set between a hard drop and its lock.
#[derive(Debug, Clone, derive_more::IsVariant)]
pub enum GameState {
    StartMenu,
    Playing {
        session: Session,
        lock_pending: bool,
    },
    Paused {
        session: Session,
        lock_pending: bool,
    },
    GameOver {
        board: Grid,
        stats: ScoreLevelTracker,
    },
}

impl GameState {
    #[must_use]
    pub fn tag(&self) -> StateTag {
        match self {
            GameState::StartMenu => StateTag::StartMenu,
            GameState::Playing { .. } => StateTag::Playing,
            GameState::Paused { .. } => StateTag::Paused,
            GameState::GameOver { .. } => StateTag::GameOver,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            GameState::Playing { session, .. } | GameState::Paused { session, .. } => Some(session),
            GameState::StartMenu | GameState::GameOver { .. } => None,
        }
    }

    /// Statistics of the current or just finished session.
    #[must_use]
    pub fn stats(&self) -> Option<&ScoreLevelTracker> {
        match self {
            GameState::Playing { session, .. } | GameState::Paused { session, .. } => {
                Some(&session.stats)
            }
            GameState::GameOver { stats, .. } => Some(stats),
            GameState::StartMenu => None,
        }
    }

    #[must_use]
    pub fn is_lock_pending(&self) -> bool {
        matches!(
            self,
            GameState::Playing {
                lock_pending: true,
                ..
            } | GameState::Paused {
                lock_pending: true,
                ..
            }
        )
    }
}

/// The game: state machine, timers and high-score bookkeeping in one owner.
///
/// The controller has no clock of its own. Front-ends feed it commands with
/// [`handle`](Self::handle) (or [`press`](Self::press) / [`release`](Self::release)
/// for held keys), move time forward with [`advance`](Self::advance) and read
/// [`snapshot`](Self::snapshot) to draw.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{Command, EngineConfig, GameController, MemoryStore, StateTag};
///
/// let mut game = GameController::new(EngineConfig::default(), MemoryStore::new()).unwrap();
/// assert_eq!(game.snapshot().state, StateTag::StartMenu);
///
/// game.handle(Command::Start);
/// game.handle(Command::HardDrop);
/// game.advance(Duration::from_millis(250));
///
/// let snapshot = game.snapshot();
/// assert_eq!(snapshot.state, StateTag::Playing);
/// assert_eq!(snapshot.score, 10);
/// ```
#[derive(Debug)]
pub struct GameController<S> {
    config: EngineConfig,
    timing: DropScheduler,
    menu: MenuSettings,
    state: GameState,
    tasks: TaskScheduler<TaskName>,
    rng: Randomizer,
    high_score: u64,
    store: S,
    events: Vec<GameEvent>,
}

impl<S> GameController<S>
where
    S: HighScoreStore,
{
    /// Creates a controller in the start menu with a random seed.
    ///
    /// The high score is read from `store` once, here.
    pub fn new(config: EngineConfig, store: S) -> Result<Self, ConfigError> {
        Self::with_randomizer(config, Randomizer::new(), store)
    }

    /// Like [`Self::new`], but with a fixed seed for reproducible games.
    pub fn with_seed(config: EngineConfig, seed: GameSeed, store: S) -> Result<Self, ConfigError> {
        Self::with_randomizer(config, Randomizer::with_seed(seed), store)
    }

    fn with_randomizer(
        config: EngineConfig,
        rng: Randomizer,
        store: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let high_score = store.get(HIGH_SCORE_KEY).unwrap_or(0);
        Ok(Self {
            timing: DropScheduler::new(config.timing.clone()),
            config,
            menu: MenuSettings {
                start_level: MIN_LEVEL,
                start_lines: 0,
            },
            state: GameState::StartMenu,
            tasks: TaskScheduler::new(),
            rng,
            high_score,
            store,
            events: vec![],
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn menu(&self) -> MenuSettings {
        self.menu
    }

    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Sets the menu settings directly, clamped to their valid ranges.
    ///
    /// Ignored outside the start menu.
    pub fn configure_menu(&mut self, start_level: u8, start_lines: usize) {
        if !self.state.is_start_menu() {
            return;
        }
        self.menu = MenuSettings {
            start_level: start_level.clamp(MIN_LEVEL, MAX_LEVEL),
            start_lines: start_lines.min(self.config.max_start_lines()),
        };
    }

    /// Applies a single command.
    ///
    /// Commands that make no sense in the current state, and moves the
    /// placement rules reject, are ignored.
    pub fn handle(&mut self, command: Command) {
        let MenuSettings {
            start_level: level,
            start_lines: lines,
        } = self.menu;
        match command {
            Command::MoveLeft
            | Command::MoveRight
            | Command::RotateClockwise
            | Command::SoftDrop
            | Command::HardDrop => self.play(command),
            Command::Start => self.start(),
            Command::PauseToggle => self.toggle_pause(),
            Command::End => self.end(),
            Command::StartLevelUp => self.configure_menu(level.saturating_add(1), lines),
            Command::StartLevelDown => self.configure_menu(level.saturating_sub(1), lines),
            Command::StartLinesUp => self.configure_menu(level, lines.saturating_add(1)),
            Command::StartLinesDown => self.configure_menu(level, lines.saturating_sub(1)),
        }
    }

    /// Handles a key going down.
    ///
    /// The command is applied once, and repeating commands keep repeating at
    /// their interval until [`release`](Self::release).
    pub fn press(&mut self, command: Command) {
        self.handle(command);
        if let Some(key) = RepeatKey::from_command(command)
            && self.state.is_playing()
        {
            self.tasks
                .schedule_repeating(TaskName::Repeat(key), self.timing.repeat_interval(key));
        }
    }

    /// Handles a key going up.
    pub fn release(&mut self, command: Command) {
        if let Some(key) = RepeatKey::from_command(command) {
            self.tasks.cancel(TaskName::Repeat(key));
        }
    }

    /// Moves the controller's clock forward, running every task that falls due.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.tasks.now() + elapsed;
        while let Some(task) = self.tasks.pop_due(until) {
            self.run_task(task);
        }
        self.tasks.advance_to(until);
    }

    /// Returns how long until the next task is due, or `None` if nothing is scheduled.
    #[must_use]
    pub fn time_until_next_task(&self) -> Option<Duration> {
        self.tasks.time_until_next()
    }

    /// Takes the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (board, next) = match &self.state {
            GameState::StartMenu => (
                Grid::new(self.config.board.width, self.config.board.height),
                None,
            ),
            GameState::Playing { session, .. } | GameState::Paused { session, .. } => {
                (session.board.overlay(&session.piece), Some(&session.next))
            }
            GameState::GameOver { board, .. } => (board.clone(), None),
        };
        let stats = self.state.stats();
        Snapshot {
            state: self.state.tag(),
            board,
            preview: preview_grid(next),
            next: next.map(Shape::kind),
            score: stats.map_or(0, ScoreLevelTracker::score),
            level: stats.map_or(self.menu.start_level, ScoreLevelTracker::level),
            cleared_lines: stats.map_or(0, ScoreLevelTracker::cleared_lines),
            high_score: self.high_score,
            start_level: self.menu.start_level,
            start_lines: self.menu.start_lines,
        }
    }

    fn run_task(&mut self, task: TaskName) {
        match task {
            TaskName::AutoFall => self.descend(),
            TaskName::LockDelay => {
                if self.state.is_lock_pending() {
                    self.lock_piece();
                }
            }
            TaskName::Repeat(key) => self.play(key.command()),
        }
    }

    fn play(&mut self, command: Command) {
        let GameState::Playing {
            session,
            lock_pending: false,
        } = &mut self.state
        else {
            return;
        };
        match command {
            Command::MoveLeft => _ = session.try_move_left(),
            Command::MoveRight => _ = session.try_move_right(),
            Command::RotateClockwise => _ = session.try_rotate(),
            Command::SoftDrop => self.descend(),
            Command::HardDrop => self.hard_drop(),
            _ => {}
        }
    }

    fn descend(&mut self) {
        let GameState::Playing {
            session,
            lock_pending: false,
        } = &mut self.state
        else {
            return;
        };
        if session.try_move_down().is_ok() {
            return;
        }
        self.lock_piece();
    }

    fn hard_drop(&mut self) {
        let GameState::Playing {
            session,
            lock_pending,
        } = &mut self.state
        else {
            return;
        };
        session.hard_drop();
        *lock_pending = true;
        self.tasks.cancel(TaskName::AutoFall);
        self.tasks
            .schedule_once(TaskName::LockDelay, self.timing.lock_delay());
    }

    fn lock_piece(&mut self) {
        let GameState::Playing {
            session,
            lock_pending,
        } = &mut self.state
        else {
            return;
        };
        let was_pending = mem::replace(lock_pending, false);
        let level_before = session.stats.level();
        let cleared_lines = session.lock();
        self.events.push(GameEvent::Locked { cleared_lines });

        let level = session.stats.level();
        if level != level_before {
            self.events.push(GameEvent::LevelUp { level });
        }
        if session.is_topped_out() {
            self.game_over();
            return;
        }
        session.spawn(self.config.spawn, &mut self.rng);
        if was_pending || level != level_before {
            self.tasks
                .schedule_repeating(TaskName::AutoFall, self.timing.fall_interval(level));
        }
    }

    fn start(&mut self) {
        if !matches!(
            self.state,
            GameState::StartMenu | GameState::GameOver { .. }
        ) {
            return;
        }
        self.tasks.cancel_all();
        let session = Session::start(&self.config, self.menu, &mut self.rng);
        let interval = self.timing.fall_interval(session.stats.level());
        self.state = GameState::Playing {
            session,
            lock_pending: false,
        };
        self.tasks.schedule_repeating(TaskName::AutoFall, interval);
        self.events.push(GameEvent::Started);
    }

    fn toggle_pause(&mut self) {
        self.state = match mem::replace(&mut self.state, GameState::StartMenu) {
            GameState::Playing {
                session,
                lock_pending,
            } => {
                self.tasks.cancel_all();
                GameState::Paused {
                    session,
                    lock_pending,
                }
            }
            GameState::Paused {
                session,
                lock_pending,
            } => {
                if lock_pending {
                    self.tasks
                        .schedule_once(TaskName::LockDelay, self.timing.lock_delay());
                } else {
                    let interval = self.timing.fall_interval(session.stats.level());
                    self.tasks.schedule_repeating(TaskName::AutoFall, interval);
                }
                GameState::Playing {
                    session,
                    lock_pending,
                }
            }
            state => state,
        };
    }

    fn game_over(&mut self) {
        let state = mem::replace(&mut self.state, GameState::StartMenu);
        let GameState::Playing { session, .. } = state else {
            self.state = state;
            return;
        };
        self.tasks.cancel_all();
        let score = session.stats.score();
        self.events.push(GameEvent::GameOver { score });
        self.commit_high_score(score);
        self.state = GameState::GameOver {
            board: session.board,
            stats: session.stats,
        };
    }

    fn end(&mut self) {
        // A pending lock finishes before the session can end.
        if matches!(
            self.state,
            GameState::Playing {
                lock_pending: true,
                ..
            }
        ) {
            return;
        }
        let score = match mem::replace(&mut self.state, GameState::StartMenu) {
            GameState::StartMenu => return,
            GameState::Playing { session, .. } | GameState::Paused { session, .. } => {
                session.stats.score()
            }
            GameState::GameOver { stats, .. } => stats.score(),
        };
        self.tasks.cancel_all();
        self.commit_high_score(score);
        self.events.push(GameEvent::Ended);
    }

    fn commit_high_score(&mut self, score: u64) {
        let stored = self.store.get(HIGH_SCORE_KEY).unwrap_or(0);
        if score > stored {
            self.store.set(HIGH_SCORE_KEY, score);
            self.high_score = score;
            self.events.push(GameEvent::HighScore { score });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{MemoryStore, ShapeKind};

    use super::*;

    const SEED: GameSeed = GameSeed::from_bytes([0x42; 16]);

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn controller(config: EngineConfig) -> GameController<MemoryStore> {
        GameController::with_seed(config, SEED, MemoryStore::new()).unwrap()
    }

    fn started() -> GameController<MemoryStore> {
        let mut game = controller(EngineConfig::default());
        game.handle(Command::Start);
        game
    }

    fn session<S>(game: &GameController<S>) -> &Session {
        game.state.session().unwrap()
    }

    fn session_mut<S>(game: &mut GameController<S>) -> &mut Session {
        match &mut game.state {
            GameState::Playing { session, .. } | GameState::Paused { session, .. } => session,
            state => panic!("no session in {:?}", state.tag()),
        }
    }

    fn set_piece<S>(game: &mut GameController<S>, kind: ShapeKind, x: i32, y: i32) {
        session_mut(game).piece = ActivePiece::new(kind.shape(), Position::new(x, y));
    }

    fn set_board<S>(game: &mut GameController<S>, rows: &[&str]) {
        session_mut(game).board = Grid::from_rows(rows).unwrap();
    }

    fn position<S>(game: &GameController<S>) -> Position {
        session(game).piece.position()
    }

    /// Store that records every write.
    #[derive(Debug, Default)]
    struct RecordingStore {
        value: Option<u64>,
        sets: Vec<u64>,
    }

    impl HighScoreStore for RecordingStore {
        fn get(&self, _key: &str) -> Option<u64> {
            self.value
        }

        fn set(&mut self, key: &str, value: u64) {
            assert_eq!(key, HIGH_SCORE_KEY);
            self.value = Some(value);
            self.sets.push(value);
        }
    }

    /// 18 rows with column 0 open from row 1 down, so any piece at the spawn
    /// anchor locks into row 0.
    fn nearly_full_board() -> Vec<&'static str> {
        let mut rows = vec![".........."];
        rows.extend(std::iter::repeat_n(".#########", 17));
        rows
    }

    #[test]
    fn test_new_controller_reads_high_score() {
        let store = MemoryStore::with_high_score(77);
        let game = GameController::new(EngineConfig::default(), store).unwrap();
        assert_eq!(game.high_score(), 77);
        assert!(game.state().is_start_menu());
        assert_eq!(game.time_until_next_task(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.level_up_lines = 0;
        let result = GameController::new(config, MemoryStore::new());
        assert!(matches!(result, Err(ConfigError::ZeroLevelUpLines)));
    }

    #[test]
    fn test_start_menu_snapshot() {
        let game = controller(EngineConfig::default());
        let snapshot = game.snapshot();
        assert_eq!(snapshot.state, StateTag::StartMenu);
        assert_eq!((snapshot.board.width(), snapshot.board.height()), (10, 18));
        assert_eq!(snapshot.board.filled_count(), 0);
        assert_eq!(snapshot.preview.filled_count(), 0);
        assert_eq!(snapshot.next, None);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.score, 0);
    }

    #[test]
    fn test_start_spawns_piece() {
        let mut game = started();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.state, StateTag::Playing);
        assert_eq!(position(&game), Position::new(4, -1));
        assert_eq!(snapshot.preview.filled_count(), 4);
        assert!(snapshot.next.is_some());
        assert_eq!(session(&game).board.filled_count(), 0);
        assert_eq!(game.drain_events(), [GameEvent::Started]);
        assert_eq!(game.time_until_next_task(), Some(ms(1000)));
    }

    #[test]
    fn test_start_lines_are_never_empty_or_full() {
        let mut game = controller(EngineConfig::default());
        game.configure_menu(3, 5);
        game.handle(Command::Start);

        let board = &session(&game).board;
        for y in 0..13 {
            assert!(!board.row(y).unwrap().has_filled(), "row {y}");
        }
        for y in 13..18 {
            let row = board.row(y).unwrap();
            assert!(row.has_filled() && !row.is_full(), "row {y}");
        }
        assert_eq!(session(&game).stats.level(), 3);
    }

    #[test]
    fn test_auto_fall() {
        let mut game = started();
        game.advance(ms(999));
        assert_eq!(position(&game).y(), -1);
        game.advance(ms(1));
        assert_eq!(position(&game).y(), 0);
        game.advance(ms(2000));
        assert_eq!(position(&game).y(), 2);
    }

    #[test]
    fn test_move_clamped_to_walls() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::T, 0, 5);
        game.handle(Command::MoveLeft);
        assert_eq!(position(&game).x(), 0);

        set_piece(&mut game, ShapeKind::T, 7, 5);
        game.handle(Command::MoveRight);
        assert_eq!(position(&game).x(), 7);
        game.handle(Command::MoveLeft);
        assert_eq!(position(&game).x(), 6);
    }

    #[test]
    fn test_move_blocked_by_stack() {
        let mut game = started();
        let mut rows = vec![".........."; 17];
        rows.push("......#...");
        set_board(&mut game, &rows);
        set_piece(&mut game, ShapeKind::O, 4, 16);
        game.handle(Command::MoveRight);
        assert_eq!(position(&game), Position::new(4, 16));
        game.handle(Command::MoveLeft);
        assert_eq!(position(&game), Position::new(3, 16));
    }

    #[test]
    fn test_rotate_without_wall_kick() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::T, 3, 5);
        game.handle(Command::RotateClockwise);
        assert_eq!(session(&game).piece.shape().to_string(), "#.\n##\n#.");

        // A vertical bar against the right wall cannot turn flat.
        session_mut(&mut game).piece = ActivePiece::new(
            ShapeKind::I.shape().rotated_clockwise(),
            Position::new(9, 5),
        );
        game.handle(Command::RotateClockwise);
        assert_eq!(session(&game).piece.shape().width(), 1);
        assert_eq!(position(&game), Position::new(9, 5));
    }

    #[test]
    fn test_bar_scenario() {
        let mut game = started();
        game.drain_events();
        set_piece(&mut game, ShapeKind::I, 3, -1);
        game.handle(Command::HardDrop);
        assert_eq!(position(&game), Position::new(3, 17));
        game.advance(ms(250));

        let board = &session(&game).board;
        let bottom: String = board
            .row(17)
            .unwrap()
            .cells()
            .iter()
            .map(|c| c.as_char())
            .collect();
        assert_eq!(bottom, "...####...");
        assert_eq!(board.filled_count(), 4);
        assert_eq!(game.snapshot().score, 10);
        assert_eq!(game.snapshot().cleared_lines, 0);
        assert_eq!(position(&game), Position::new(4, -1));
        assert_eq!(
            game.drain_events(),
            [GameEvent::Locked { cleared_lines: 0 }]
        );
    }

    #[test]
    fn test_hard_drop_lands_on_floor() {
        for kind in ShapeKind::ALL {
            let mut game = started();
            set_piece(&mut game, kind, 4, -1);
            game.handle(Command::HardDrop);
            let piece = &session(&game).piece;
            let lowest = piece.cells().map(|(_, y)| y).max().unwrap();
            assert_eq!(lowest, 17, "{kind:?}");
        }
    }

    #[test]
    fn test_lock_delay_suppresses_input() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::O, 4, -1);
        game.handle(Command::HardDrop);
        assert!(game.state().is_lock_pending());
        let landed = position(&game);

        for command in [
            Command::MoveLeft,
            Command::MoveRight,
            Command::RotateClockwise,
            Command::SoftDrop,
            Command::HardDrop,
            Command::Start,
            Command::End,
        ] {
            game.handle(command);
        }
        assert!(game.state().is_playing());
        assert_eq!(position(&game), landed);
        game.advance(ms(249));
        assert!(game.state().is_lock_pending());
        assert_eq!(session(&game).stats.locked_pieces(), 0);

        game.advance(ms(1));
        assert!(!game.state().is_lock_pending());
        assert_eq!(session(&game).stats.locked_pieces(), 1);

        // Auto-fall resumes after the lock.
        assert_eq!(game.time_until_next_task(), Some(ms(1000)));
        game.advance(ms(5000));
        assert_eq!(session(&game).stats.locked_pieces(), 1);
    }

    #[test]
    fn test_end_waits_for_pending_lock() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::O, 4, -1);
        game.handle(Command::HardDrop);
        game.handle(Command::End);
        assert!(game.state().is_lock_pending());
        assert!(!game.drain_events().contains(&GameEvent::Ended));

        game.advance(ms(250));
        assert_eq!(session(&game).stats.locked_pieces(), 1);
        game.handle(Command::End);
        assert!(game.state().is_start_menu());
        assert!(game.drain_events().contains(&GameEvent::Ended));
    }

    #[test]
    fn test_soft_drop_locks_immediately_when_touching() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::O, 0, 16);
        game.handle(Command::SoftDrop);
        assert_eq!(session(&game).stats.locked_pieces(), 1);
        assert_eq!(session(&game).board.filled_count(), 4);
        assert_eq!(game.snapshot().score, 10);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut game = started();
        game.advance(ms(600));
        game.handle(Command::PauseToggle);
        assert_eq!(game.snapshot().state, StateTag::Paused);
        assert_eq!(game.time_until_next_task(), None);

        game.handle(Command::MoveLeft);
        game.advance(ms(5000));
        assert_eq!(position(&game), Position::new(4, -1));

        game.handle(Command::PauseToggle);
        assert_eq!(game.snapshot().state, StateTag::Playing);
        game.advance(ms(999));
        assert_eq!(position(&game).y(), -1);
        game.advance(ms(1));
        assert_eq!(position(&game).y(), 0);
    }

    #[test]
    fn test_pause_during_lock_delay_restarts_delay() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::I, 0, -1);
        game.handle(Command::HardDrop);
        game.advance(ms(200));
        game.handle(Command::PauseToggle);
        game.advance(ms(1000));
        assert!(game.state().is_lock_pending());

        game.handle(Command::PauseToggle);
        assert!(game.state().is_lock_pending());
        game.advance(ms(249));
        assert!(game.state().is_lock_pending());
        game.advance(ms(1));
        assert_eq!(session(&game).stats.locked_pieces(), 1);
    }

    #[test]
    fn test_game_over_commits_high_score_once() {
        let store = RecordingStore {
            value: Some(5),
            sets: vec![],
        };
        let mut game = GameController::with_seed(EngineConfig::default(), SEED, store).unwrap();
        game.handle(Command::Start);
        set_board(&mut game, &nearly_full_board());
        set_piece(&mut game, ShapeKind::O, 4, -1);
        game.drain_events();

        game.handle(Command::SoftDrop);
        assert_eq!(game.snapshot().state, StateTag::GameOver);
        assert_eq!(game.store().sets, [10]);
        assert_eq!(game.high_score(), 10);
        assert_eq!(game.time_until_next_task(), None);
        assert_eq!(
            game.drain_events(),
            [
                GameEvent::Locked { cleared_lines: 0 },
                GameEvent::GameOver { score: 10 },
                GameEvent::HighScore { score: 10 },
            ]
        );

        // Leaving the game-over screen does not write the same score again.
        game.handle(Command::End);
        assert!(game.state().is_start_menu());
        assert_eq!(game.into_store().sets, [10]);
    }

    #[test]
    fn test_game_over_below_high_score_does_not_write() {
        let store = RecordingStore {
            value: Some(1000),
            sets: vec![],
        };
        let mut game = GameController::with_seed(EngineConfig::default(), SEED, store).unwrap();
        game.handle(Command::Start);
        set_board(&mut game, &nearly_full_board());
        set_piece(&mut game, ShapeKind::O, 4, -1);
        game.handle(Command::SoftDrop);
        assert!(game.state().is_game_over());
        assert!(game.store().sets.is_empty());
        assert_eq!(game.high_score(), 1000);
    }

    #[test]
    fn test_game_over_snapshot_keeps_final_board() {
        let mut game = started();
        set_board(&mut game, &nearly_full_board());
        set_piece(&mut game, ShapeKind::O, 4, -1);
        game.handle(Command::SoftDrop);

        let snapshot = game.snapshot();
        assert_eq!(snapshot.state, StateTag::GameOver);
        assert!(snapshot.board.is_filled(4, 0));
        assert!(snapshot.board.is_filled(5, 0));
        assert_eq!(snapshot.preview.filled_count(), 0);
        assert_eq!(snapshot.score, 10);
    }

    #[test]
    fn test_end_returns_to_menu() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::O, 0, 16);
        game.handle(Command::SoftDrop);
        game.handle(Command::End);

        assert!(game.state().is_start_menu());
        assert_eq!(game.time_until_next_task(), None);
        assert_eq!(game.store().get(HIGH_SCORE_KEY), Some(10));
        let events = game.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::Ended));

        // End in the menu does nothing.
        game.handle(Command::End);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_end_while_paused() {
        let mut game = started();
        game.handle(Command::PauseToggle);
        game.handle(Command::End);
        assert!(game.state().is_start_menu());
        assert_eq!(game.store().get(HIGH_SCORE_KEY), None);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut game = started();
        set_board(&mut game, &nearly_full_board());
        set_piece(&mut game, ShapeKind::O, 4, -1);
        game.handle(Command::SoftDrop);
        assert!(game.state().is_game_over());

        game.handle(Command::Start);
        assert!(game.state().is_playing());
        assert_eq!(game.snapshot().score, 0);
        assert_eq!(session(&game).board.filled_count(), 0);
        assert_eq!(game.time_until_next_task(), Some(ms(1000)));
    }

    #[test]
    fn test_start_ignored_while_playing() {
        let mut game = started();
        game.handle(Command::MoveLeft);
        let before = session(&game).clone();
        game.handle(Command::Start);
        assert_eq!(session(&game).piece, before.piece);
        assert_eq!(session(&game).next, before.next);
    }

    #[test]
    fn test_menu_settings_clamped() {
        let mut game = controller(EngineConfig::default());
        for _ in 0..20 {
            game.handle(Command::StartLevelUp);
            game.handle(Command::StartLinesUp);
        }
        assert_eq!(game.menu().start_level(), 10);
        assert_eq!(game.menu().start_lines(), 15);
        for _ in 0..20 {
            game.handle(Command::StartLevelDown);
            game.handle(Command::StartLinesDown);
        }
        assert_eq!(game.menu().start_level(), 1);
        assert_eq!(game.menu().start_lines(), 0);
    }

    #[test]
    fn test_menu_start_lines_limited_by_board_height() {
        let mut config = EngineConfig::default();
        config.board.height = 10;
        let mut game = controller(config);
        game.configure_menu(1, 99);
        assert_eq!(game.menu().start_lines(), 7);
    }

    #[test]
    fn test_menu_commands_ignored_while_playing() {
        let mut game = started();
        game.handle(Command::StartLevelUp);
        game.handle(Command::StartLinesUp);
        assert_eq!(game.snapshot().start_level, 1);
        assert_eq!(game.snapshot().start_lines, 0);
    }

    #[test]
    fn test_held_key_repeats_until_release() {
        let mut game = started();
        set_piece(&mut game, ShapeKind::T, 3, 5);
        game.press(Command::MoveRight);
        assert_eq!(position(&game).x(), 4);
        game.advance(ms(100));
        assert_eq!(position(&game).x(), 5);
        game.advance(ms(100));
        assert_eq!(position(&game).x(), 6);

        game.release(Command::MoveRight);
        game.advance(ms(500));
        assert_eq!(position(&game).x(), 6);
    }

    #[test]
    fn test_held_soft_drop_repeats() {
        let mut game = started();
        game.press(Command::SoftDrop);
        assert_eq!(position(&game).y(), 0);
        game.advance(ms(200));
        assert_eq!(position(&game).y(), 4);
    }

    #[test]
    fn test_level_up_reschedules_auto_fall() {
        let mut config = EngineConfig::default();
        config.level_up_lines = 1;
        let mut game = controller(config);
        game.handle(Command::Start);
        let mut rows = vec![".........."; 17];
        rows.push("######....");
        set_board(&mut game, &rows);
        set_piece(&mut game, ShapeKind::I, 6, -1);
        game.drain_events();

        game.handle(Command::HardDrop);
        game.advance(ms(250));
        assert_eq!(
            game.drain_events(),
            [
                GameEvent::Locked { cleared_lines: 1 },
                GameEvent::LevelUp { level: 2 },
            ]
        );
        let snapshot = game.snapshot();
        assert_eq!(snapshot.level, 2);
        assert_eq!(snapshot.cleared_lines, 1);
        assert_eq!(snapshot.score, 110);
        assert_eq!(session(&game).board.filled_count(), 0);

        assert_eq!(game.time_until_next_task(), Some(ms(900)));
        game.advance(ms(899));
        assert_eq!(position(&game).y(), -1);
        game.advance(ms(1));
        assert_eq!(position(&game).y(), 0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = || {
            let mut game = controller(EngineConfig::default());
            game.configure_menu(2, 4);
            game.handle(Command::Start);
            for _ in 0..5 {
                game.handle(Command::MoveLeft);
                game.handle(Command::RotateClockwise);
                game.handle(Command::HardDrop);
                game.advance(ms(300));
            }
            game.snapshot()
        };
        assert_eq!(play(), play());
    }
}
