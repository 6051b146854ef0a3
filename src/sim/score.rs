//! Current and best score with display side effects
//!
//! Every write goes through a setter that immediately pushes the new value
//! to a `ScoreDisplay`, so the HUD never lags the state.

/// Receives score updates (DOM text in the browser)
pub trait ScoreDisplay {
    /// Live score and the game-over dialog score
    fn show_score(&mut self, score: u64);
    fn show_high_score(&mut self, high_score: u64);
}

/// Display that discards updates (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl ScoreDisplay for NullDisplay {
    fn show_score(&mut self, _score: u64) {}
    fn show_high_score(&mut self, _high_score: u64) {}
}

/// Score pair plus the display that mirrors it
pub struct ScoreBoard {
    score: u64,
    high_score: u64,
    display: Box<dyn ScoreDisplay>,
}

impl std::fmt::Debug for ScoreBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreBoard")
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .finish_non_exhaustive()
    }
}

impl ScoreBoard {
    /// Create a board and render both values once
    pub fn new(high_score: u64, mut display: Box<dyn ScoreDisplay>) -> Self {
        display.show_score(0);
        display.show_high_score(high_score);
        Self {
            score: 0,
            high_score,
            display,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn set_score(&mut self, score: u64) {
        self.score = score;
        self.display.show_score(score);
    }

    pub fn add(&mut self, points: u64) {
        self.set_score(self.score.saturating_add(points));
    }

    pub fn set_high_score(&mut self, high_score: u64) {
        self.high_score = high_score;
        self.display.show_high_score(high_score);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Display that records every update, shared with the test body
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingDisplay {
        pub scores: Rc<RefCell<Vec<u64>>>,
        pub high_scores: Rc<RefCell<Vec<u64>>>,
    }

    impl ScoreDisplay for RecordingDisplay {
        fn show_score(&mut self, score: u64) {
            self.scores.borrow_mut().push(score);
        }

        fn show_high_score(&mut self, high_score: u64) {
            self.high_scores.borrow_mut().push(high_score);
        }
    }

    #[test]
    fn test_new_renders_initial_values() {
        let display = RecordingDisplay::default();
        let board = ScoreBoard::new(42, Box::new(display.clone()));
        assert_eq!(board.score(), 0);
        assert_eq!(*display.scores.borrow(), vec![0]);
        assert_eq!(*display.high_scores.borrow(), vec![42]);
    }

    #[test]
    fn test_every_write_reaches_display() {
        let display = RecordingDisplay::default();
        let mut board = ScoreBoard::new(0, Box::new(display.clone()));
        board.add(10);
        board.add(20);
        board.set_score(0);
        board.set_high_score(30);
        assert_eq!(*display.scores.borrow(), vec![0, 10, 30, 0]);
        assert_eq!(*display.high_scores.borrow(), vec![0, 30]);
    }
}
