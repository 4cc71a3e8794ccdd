use serde::{Deserialize, Serialize};

use crate::{MAX_SHAPE_SIZE, Position};

use super::{
    score::{MAX_LEVEL, MIN_LEVEL},
    timing::TimingConfig,
};

/// Smallest board accepted along either axis: the bar must fit both ways.
pub const MIN_BOARD_SIZE: usize = MAX_SHAPE_SIZE;

/// Upper bound of the start-lines menu setting on a large board.
pub const MAX_START_LINES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 18,
        }
    }
}

/// Engine configuration.
///
/// Every field falls back to its default when missing, so a partial JSON
/// document is a valid configuration:
///
/// ```
/// use blockfall_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"level_up_lines": 10}"#).unwrap();
/// assert_eq!(config.level_up_lines, 10);
/// assert_eq!(config.board.width, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardConfig,
    /// Anchor every new piece appears at.
    pub spawn: Position,
    /// Lines to clear per level gained.
    pub level_up_lines: usize,
    pub timing: TimingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            spawn: Position::new(4, -1),
            level_up_lines: 75,
            timing: TimingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board {width}x{height} is too small")]
    BoardTooSmall { width: usize, height: usize },
    #[display("spawn position ({x}, {y}) does not leave room for every shape")]
    SpawnOutsideBoard { x: i32, y: i32 },
    #[display("level_up_lines must be positive")]
    ZeroLevelUpLines,
    #[display("fall interval reaches zero at level {level}")]
    FallIntervalNotPositive { level: u8 },
    #[display("{name} must be positive")]
    ZeroInterval { name: &'static str },
}

impl EngineConfig {
    /// Checks that a game can actually be played with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardConfig { width, height } = self.board;
        if width < MIN_BOARD_SIZE || height < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall { width, height });
        }

        // The widest and tallest catalog shapes both span MAX_SHAPE_SIZE cells.
        let span = i32::try_from(MAX_SHAPE_SIZE).unwrap_or(i32::MAX);
        let max_x = i32::try_from(width).unwrap_or(i32::MAX) - span;
        let max_y = i32::try_from(height).unwrap_or(i32::MAX) - span;
        let (x, y) = (self.spawn.x(), self.spawn.y());
        if !(0..=max_x).contains(&x) || !(-span..=max_y).contains(&y) {
            return Err(ConfigError::SpawnOutsideBoard { x, y });
        }

        if self.level_up_lines == 0 {
            return Err(ConfigError::ZeroLevelUpLines);
        }

        let timing = &self.timing;
        let max_steps = u64::from(MAX_LEVEL - MIN_LEVEL);
        if timing.base_fall_ms <= max_steps.saturating_mul(timing.fall_step_ms) {
            return Err(ConfigError::FallIntervalNotPositive { level: MAX_LEVEL });
        }
        for (name, value) in [
            ("shift_repeat_ms", timing.shift_repeat_ms),
            ("rotate_repeat_ms", timing.rotate_repeat_ms),
            ("soft_drop_repeat_ms", timing.soft_drop_repeat_ms),
            ("lock_delay_ms", timing.lock_delay_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { name });
            }
        }
        Ok(())
    }

    /// Largest start-lines setting the board allows: `min(15, height - 3)`.
    #[must_use]
    pub fn max_start_lines(&self) -> usize {
        MAX_START_LINES.min(self.board.height.saturating_sub(3))
    }
}
