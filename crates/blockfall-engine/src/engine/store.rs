use std::collections::HashMap;

/// Storage key the high score lives under.
pub const HIGH_SCORE_KEY: &str = "high_score";

/// Key-value store the controller persists the high score through.
///
/// The controller reads [`HIGH_SCORE_KEY`] once at construction and writes it
/// only when a finished session beats the stored value.
pub trait HighScoreStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<u64>;

    /// Stores `value` under `key`.
    fn set(&mut self, key: &str, value: u64);
}

impl<S> HighScoreStore for &mut S
where
    S: HighScoreStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<u64> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: u64) {
        (**self).set(key, value);
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a high score.
    #[must_use]
    pub fn with_high_score(high_score: u64) -> Self {
        let mut store = Self::new();
        store.set(HIGH_SCORE_KEY, high_score);
        store
    }
}

impl HighScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: u64) {
        self.values.insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(HIGH_SCORE_KEY), None);
        store.set(HIGH_SCORE_KEY, 42);
        assert_eq!(store.get(HIGH_SCORE_KEY), Some(42));
        assert_eq!(store.get("other"), None);
    }

    fn bump<S: HighScoreStore>(mut store: S) {
        let value = store.get(HIGH_SCORE_KEY).unwrap_or(0);
        store.set(HIGH_SCORE_KEY, value + 1);
    }

    #[test]
    fn test_store_through_mutable_reference() {
        let mut store = MemoryStore::with_high_score(7);
        bump(&mut store);
        assert_eq!(store.get(HIGH_SCORE_KEY), Some(8));
    }
}
