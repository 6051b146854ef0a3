//! End-of-game detection
//!
//! After each step, any free ball that has been settled for longer than the
//! debounce and pokes above the aim line ends the run. Ending halts the
//! simulation, cancels the pending next-ball spawn and commits a new best.

use super::state::{GamePhase, GameSession};
use crate::error::Result;

/// Outcome handed to the UI when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub final_score: u64,
    /// Best score after this run
    pub high_score: u64,
    pub new_record: bool,
}

/// Whether any settled ball's top edge is above the aim line at `now`
pub fn limit_crossed(session: &GameSession, now: f64) -> bool {
    let limit = session.layout.aim_y;
    let debounce = session.config.settle_debounce_ms;

    session
        .balls
        .iter()
        .filter(|b| b.is_active() && b.settled_for(now, debounce))
        .any(|b| {
            session
                .world
                .top_edge(b.collider)
                .is_some_and(|top| top < limit)
        })
}

/// End the run if the limit is crossed. Fires once; inert while over.
pub fn check_game_over(session: &mut GameSession, now: f64) -> Result<Option<GameOverReport>> {
    if session.phase == GamePhase::GameOver || !limit_crossed(session, now) {
        return Ok(None);
    }

    session.phase = GamePhase::GameOver;
    session.run_token.cancel();

    let final_score = session.scores.score();
    let new_record = session.best.commit(final_score, session.store.as_mut())?;
    if new_record {
        session.scores.set_high_score(final_score);
    }

    log::info!(
        "Game over: score {}{}",
        final_score,
        if new_record { " (new record)" } else { "" }
    );

    Ok(Some(GameOverReport {
        final_score,
        high_score: session.best.value,
        new_record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscore::HighScore;
    use crate::platform::{KeyValueStore, MemoryStore};
    use crate::sim::ball::{BallId, BallSpawn, Rank};
    use crate::sim::state::tests::{session, session_with_store};
    use glam::Vec2;
    use proptest::prelude::*;

    /// Free rank-0 ball whose top edge sits above the aim line
    fn ball_over_limit(session: &mut GameSession, settled_at: f64) -> BallId {
        let id = session.create_ball(&BallSpawn::free(Rank::MIN, Vec2::new(450.0, 100.0)));
        session.ball_mut(id).unwrap().settled_at = Some(settled_at);
        id
    }

    #[test]
    fn test_fresh_ball_over_limit_is_exempt() {
        let mut session = session();
        ball_over_limit(&mut session, 1000.0);
        assert_eq!(check_game_over(&mut session, 2000.0).unwrap(), None);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_settled_ball_over_limit_ends_game() {
        let mut session = session();
        ball_over_limit(&mut session, 1000.0);
        let report = check_game_over(&mut session, 2001.0).unwrap().unwrap();
        assert_eq!(report.final_score, 0);
        assert!(!report.new_record);
        assert!(session.is_over());
        assert!(session.run_token.is_cancelled());
    }

    #[test]
    fn test_held_ball_never_ends_game() {
        // The held ball sits on the aim line with its top edge above it
        let mut session = session();
        let held = session.held().unwrap();
        session.ball_mut(held).unwrap().settled_at = Some(0.0);
        assert!(!limit_crossed(&session, 10_000.0));
    }

    #[test]
    fn test_settled_ball_below_limit_is_fine() {
        let mut session = session();
        let id = session.create_ball(&BallSpawn::free(Rank::MIN, Vec2::new(450.0, 800.0)));
        session.ball_mut(id).unwrap().settled_at = Some(0.0);
        assert!(!limit_crossed(&session, 10_000.0));
    }

    #[test]
    fn test_top_edge_on_limit_is_not_crossed() {
        // Rank-0 radius on the wide board is 25.5, so the top edge sits at 140
        let mut session = session();
        let id = session.create_ball(&BallSpawn::free(Rank::MIN, Vec2::new(450.0, 165.5)));
        session.ball_mut(id).unwrap().settled_at = Some(0.0);
        assert!(!limit_crossed(&session, 5000.0));
        assert_eq!(check_game_over(&mut session, 5000.0).unwrap(), None);
    }

    #[test]
    fn test_top_edge_just_above_limit_is_crossed() {
        let mut session = session();
        let id = session.create_ball(&BallSpawn::free(Rank::MIN, Vec2::new(450.0, 164.5)));
        session.ball_mut(id).unwrap().settled_at = Some(0.0);
        assert!(limit_crossed(&session, 5000.0));
    }

    #[test]
    fn test_fires_only_once() {
        let mut session = session();
        ball_over_limit(&mut session, 0.0);
        assert!(check_game_over(&mut session, 5000.0).unwrap().is_some());
        assert!(check_game_over(&mut session, 6000.0).unwrap().is_none());
    }

    #[test]
    fn test_new_record_is_persisted() {
        let mut session =
            session_with_store(MemoryStore::with_entry(HighScore::STORAGE_KEY, "100"));
        session.scores.set_score(150);
        ball_over_limit(&mut session, 0.0);

        let report = check_game_over(&mut session, 5000.0).unwrap().unwrap();

        assert!(report.new_record);
        assert_eq!(report.high_score, 150);
        assert_eq!(session.high_score(), 150);
        assert_eq!(
            session.store.get(HighScore::STORAGE_KEY).unwrap().as_deref(),
            Some("150")
        );
    }

    #[test]
    fn test_lower_score_keeps_record() {
        let mut session =
            session_with_store(MemoryStore::with_entry(HighScore::STORAGE_KEY, "100"));
        session.scores.set_score(80);
        ball_over_limit(&mut session, 0.0);

        let report = check_game_over(&mut session, 5000.0).unwrap().unwrap();

        assert!(!report.new_record);
        assert_eq!(report.high_score, 100);
        assert_eq!(
            session.store.get(HighScore::STORAGE_KEY).unwrap().as_deref(),
            Some("100")
        );
    }

    proptest! {
        #[test]
        fn prop_debounce_window_never_ends_game(age in 0.0f64..=1000.0) {
            let mut session = session();
            ball_over_limit(&mut session, 10_000.0);
            prop_assert!(check_game_over(&mut session, 10_000.0 + age).unwrap().is_none());
        }
    }
}
