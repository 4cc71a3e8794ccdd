use serde::Serialize;

/// Lowest level a session can be played at.
pub const MIN_LEVEL: u8 = 1;

/// Highest level a session can reach.
pub const MAX_LEVEL: u8 = 10;

/// Base points for line clears before the level multiplier.
///
/// Index corresponds to number of lines cleared by a single lock:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 250 points
/// - 3 lines: 400 points
/// - 4 lines: 600 points
const LINE_SCORE_BASE: [u64; 5] = [0, 100, 250, 400, 600];

/// Points awarded for every lock, whether or not lines are cleared.
#[must_use]
pub fn drop_bonus(level: u8) -> u64 {
    9 + u64::from(level)
}

/// Points awarded for clearing `lines` rows with a single lock.
///
/// The base value is scaled by `max(1, 1 + (level - 5) / 10)` and rounded down.
/// Any count outside the table scores nothing.
///
/// ```
/// use blockfall_engine::line_score;
///
/// assert_eq!(line_score(1, 5), 100);
/// assert_eq!(line_score(4, 10), 900);
/// assert_eq!(line_score(2, 1), 250);
/// ```
#[must_use]
pub fn line_score(lines: usize, level: u8) -> u64 {
    let base = LINE_SCORE_BASE.get(lines).copied().unwrap_or(0);
    let tenths = 10 + u64::from(level.saturating_sub(5));
    base * tenths / 10
}

/// Score and level tracking for one session.
///
/// - **Score**: drop bonus on every lock plus the line clear table
/// - **Level**: derived from total lines cleared, starting at the session's start level
/// - **Locked pieces**: total number of pieces merged into the grid
/// - **Line clear distribution**: count of locks by number of lines cleared
///
/// # Example
///
/// ```
/// use blockfall_engine::ScoreLevelTracker;
///
/// let mut stats = ScoreLevelTracker::new(5, 75);
/// stats.complete_lock(4);
///
/// assert_eq!(stats.score(), 14 + 600);
/// assert_eq!(stats.cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreLevelTracker {
    score: u64,
    level: u8,
    start_level: u8,
    level_up_lines: usize,
    cleared_lines: usize,
    locked_pieces: usize,
    line_cleared_counter: [usize; 5],
}

impl ScoreLevelTracker {
    /// Creates a tracker at `start_level` with all counters at zero.
    ///
    /// The start level is clamped to [`MIN_LEVEL`]..=[`MAX_LEVEL`] and
    /// `level_up_lines` to at least one.
    #[must_use]
    pub fn new(start_level: u8, level_up_lines: usize) -> Self {
        let start_level = start_level.clamp(MIN_LEVEL, MAX_LEVEL);
        Self {
            score: 0,
            level: start_level,
            start_level,
            level_up_lines: level_up_lines.max(1),
            cleared_lines: 0,
            locked_pieces: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub const fn start_level(&self) -> u8 {
        self.start_level
    }

    #[must_use]
    pub const fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    /// Returns a histogram of locks by lines cleared.
    ///
    /// Index `n` counts locks that cleared `n` lines; larger counts land in the last bucket.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Updates the statistics after a lock and returns the points gained.
    ///
    /// Scoring uses the level in effect before the lock; the level is then
    /// recomputed from the new line total and never decreases.
    pub fn complete_lock(&mut self, cleared_lines: usize) -> u64 {
        let gained = drop_bonus(self.level) + line_score(cleared_lines, self.level);
        self.score += gained;
        self.locked_pieces += 1;
        self.cleared_lines += cleared_lines;
        let bucket = cleared_lines.min(self.line_cleared_counter.len() - 1);
        self.line_cleared_counter[bucket] += 1;

        let earned = self.cleared_lines / self.level_up_lines + usize::from(self.start_level);
        let level = u8::try_from(earned).unwrap_or(MAX_LEVEL).min(MAX_LEVEL);
        self.level = self.level.max(level);
        gained
    }
}
