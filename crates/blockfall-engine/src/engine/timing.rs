use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{command::RepeatKey, score::MIN_LEVEL};

/// Timing parameters in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Auto-fall interval at level 1.
    pub base_fall_ms: u64,
    /// Reduction of the auto-fall interval per level above 1.
    pub fall_step_ms: u64,
    /// Repeat interval of held left/right.
    pub shift_repeat_ms: u64,
    /// Repeat interval of held rotate.
    pub rotate_repeat_ms: u64,
    /// Repeat interval of held soft drop.
    pub soft_drop_repeat_ms: u64,
    /// Delay between a hard drop and its lock.
    pub lock_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_fall_ms: 1000,
            fall_step_ms: 100,
            shift_repeat_ms: 100,
            rotate_repeat_ms: 300,
            soft_drop_repeat_ms: 50,
            lock_delay_ms: 250,
        }
    }
}

/// Timing policy: how often things happen, not when.
///
/// The actual clock lives in [`TaskScheduler`](super::TaskScheduler); this type
/// only turns levels and held commands into intervals.
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{DropScheduler, TimingConfig};
///
/// let timing = DropScheduler::new(TimingConfig::default());
/// assert_eq!(timing.fall_interval(1), Duration::from_millis(1000));
/// assert_eq!(timing.fall_interval(10), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct DropScheduler {
    config: TimingConfig,
}

impl DropScheduler {
    #[must_use]
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Auto-fall interval: `base - (level - 1) * step`.
    ///
    /// Never shorter than one millisecond.
    #[must_use]
    pub fn fall_interval(&self, level: u8) -> Duration {
        let steps = u64::from(level.saturating_sub(MIN_LEVEL));
        let millis = self
            .config
            .base_fall_ms
            .saturating_sub(steps * self.config.fall_step_ms);
        Duration::from_millis(millis.max(1))
    }

    #[must_use]
    pub fn repeat_interval(&self, key: RepeatKey) -> Duration {
        let millis = match key {
            RepeatKey::MoveLeft | RepeatKey::MoveRight => self.config.shift_repeat_ms,
            RepeatKey::Rotate => self.config.rotate_repeat_ms,
            RepeatKey::SoftDrop => self.config.soft_drop_repeat_ms,
        };
        Duration::from_millis(millis.max(1))
    }

    #[must_use]
    pub fn lock_delay(&self) -> Duration {
        Duration::from_millis(self.config.lock_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_fall_interval_per_level() {
        let timing = DropScheduler::new(TimingConfig::default());
        let intervals: Vec<_> = (1..=10).map(|level| timing.fall_interval(level)).collect();
        let expected: Vec<_> = (0..10).map(|i| ms(1000 - i * 100)).collect();
        assert_eq!(intervals, expected);
    }

    #[test]
    fn test_fall_interval_never_zero() {
        let timing = DropScheduler::new(TimingConfig {
            base_fall_ms: 300,
            ..TimingConfig::default()
        });
        assert_eq!(timing.fall_interval(10), ms(1));
    }

    #[test]
    fn test_repeat_intervals() {
        let timing = DropScheduler::new(TimingConfig::default());
        assert_eq!(timing.repeat_interval(RepeatKey::MoveLeft), ms(100));
        assert_eq!(timing.repeat_interval(RepeatKey::MoveRight), ms(100));
        assert_eq!(timing.repeat_interval(RepeatKey::Rotate), ms(300));
        assert_eq!(timing.repeat_interval(RepeatKey::SoftDrop), ms(50));
        assert_eq!(timing.lock_delay(), ms(250));
    }

    #[test]
    fn test_timing_config_partial_json() {
        let config: TimingConfig = serde_json::from_str(r#"{"lock_delay_ms": 400}"#).unwrap();
        assert_eq!(config.lock_delay_ms, 400);
        assert_eq!(config.base_fall_ms, 1000);
    }
}
