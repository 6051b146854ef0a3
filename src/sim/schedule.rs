//! One-shot delayed spawn with a cancellation token

use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Spawn of the next held ball, due at a point in time
#[derive(Debug, Clone)]
pub struct ScheduledSpawn {
    pub due_at: f64,
    /// Where the player released the previous ball
    pub x: f32,
    token: CancelToken,
}

/// Result of polling a scheduled spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Poll {
    /// Not due yet, keep it
    Waiting,
    /// Due and still wanted: spawn at `x`
    Fire { x: f32 },
    /// Due or not, the token was cancelled: drop it
    Cancelled,
}

impl ScheduledSpawn {
    pub fn new(due_at: f64, x: f32, token: CancelToken) -> Self {
        Self { due_at, x, token }
    }

    pub fn poll(&self, now: f64) -> Poll {
        if self.token.is_cancelled() {
            Poll::Cancelled
        } else if now >= self.due_at {
            Poll::Fire { x: self.x }
        } else {
            Poll::Waiting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_due() {
        let task = ScheduledSpawn::new(500.0, 120.0, CancelToken::new());
        assert_eq!(task.poll(499.9), Poll::Waiting);
        assert_eq!(task.poll(500.0), Poll::Fire { x: 120.0 });
    }

    #[test]
    fn test_cancel_through_clone() {
        let token = CancelToken::new();
        let task = ScheduledSpawn::new(500.0, 120.0, token.clone());
        token.cancel();
        assert_eq!(task.poll(1000.0), Poll::Cancelled);
    }

    #[test]
    fn test_fresh_token_unaffected() {
        let old = CancelToken::new();
        old.cancel();
        let task = ScheduledSpawn::new(0.0, 1.0, CancelToken::new());
        assert_eq!(task.poll(0.0), Poll::Fire { x: 1.0 });
    }
}
