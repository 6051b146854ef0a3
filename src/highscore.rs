//! Best score persistence
//!
//! A single decimal string in LocalStorage, read at startup and written
//! only when a finished session beats it.

use crate::error::Result;
use crate::platform::KeyValueStore;

/// Persisted best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub value: u64,
}

impl HighScore {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "score";

    /// Load the best score. Missing key reads as zero.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let Some(raw) = store.get(Self::STORAGE_KEY)? else {
            log::info!("No high score found, starting fresh");
            return Ok(Self::default());
        };

        match raw.trim().parse::<u64>() {
            Ok(value) => {
                log::info!("Loaded high score {}", value);
                Ok(Self { value })
            }
            Err(_) => {
                log::warn!("Stored high score {:?} is not a number, using 0", raw);
                Ok(Self::default())
            }
        }
    }

    /// Whether `score` beats the current best
    pub fn is_beaten_by(&self, score: u64) -> bool {
        score > self.value
    }

    /// Record `score` if it beats the best, persisting it.
    /// Returns true when a new record was written.
    pub fn commit(&mut self, score: u64, store: &mut dyn KeyValueStore) -> Result<bool> {
        if !self.is_beaten_by(score) {
            return Ok(false);
        }
        store.set(Self::STORAGE_KEY, &score.to_string())?;
        self.value = score;
        log::info!("New high score {}", score);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_missing_is_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store).unwrap().value, 0);
    }

    #[test]
    fn test_load_decimal() {
        let store = MemoryStore::with_entry(HighScore::STORAGE_KEY, "100");
        assert_eq!(HighScore::load(&store).unwrap().value, 100);
    }

    #[test]
    fn test_garbage_is_zero() {
        let store = MemoryStore::with_entry(HighScore::STORAGE_KEY, "lots");
        assert_eq!(HighScore::load(&store).unwrap().value, 0);
    }

    #[test]
    fn test_commit_new_record() {
        let mut store = MemoryStore::with_entry(HighScore::STORAGE_KEY, "100");
        let mut best = HighScore::load(&store).unwrap();
        assert!(best.commit(150, &mut store).unwrap());
        assert_eq!(best.value, 150);
        assert_eq!(store.get(HighScore::STORAGE_KEY).unwrap().as_deref(), Some("150"));
    }

    #[test]
    fn test_commit_lower_score_keeps_record() {
        let mut store = MemoryStore::with_entry(HighScore::STORAGE_KEY, "100");
        let mut best = HighScore::load(&store).unwrap();
        assert!(!best.commit(80, &mut store).unwrap());
        assert_eq!(best.value, 100);
        assert_eq!(store.get(HighScore::STORAGE_KEY).unwrap().as_deref(), Some("100"));
    }

    #[test]
    fn test_commit_tie_is_not_a_record() {
        let mut store = MemoryStore::new();
        let mut best = HighScore { value: 40 };
        assert!(!best.commit(40, &mut store).unwrap());
        assert_eq!(store.get(HighScore::STORAGE_KEY).unwrap(), None);
    }
}
