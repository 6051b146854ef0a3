//! Merging equal-rank balls on contact
//!
//! Runs once per physics step over that step's batch of started contacts.
//! Pairs are handled in reported order; a ball consumed by an earlier pair
//! is skipped for the rest of the batch and may merge on a later step.

use std::collections::HashSet;

use glam::Vec2;

use super::ball::{BallId, BallSpawn, Rank};
use super::physics::ContactStart;
use super::state::GameSession;
use crate::midpoint;

/// One merge performed by the resolver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeEvent {
    pub consumed: (BallId, BallId),
    pub spawned: BallId,
    pub rank: Rank,
    pub position: Vec2,
    pub points: u64,
}

/// Merge every qualifying pair in `batch`, spawning successors stamped at `now`
pub fn resolve_merges(
    session: &mut GameSession,
    batch: &[ContactStart],
    now: f64,
) -> Vec<MergeEvent> {
    let mut consumed: HashSet<BallId> = HashSet::new();
    let mut merges = Vec::new();

    for contact in batch {
        let (Some(a), Some(b)) = (contact.a.ball(), contact.b.ball()) else {
            continue;
        };
        if a == b || consumed.contains(&a) || consumed.contains(&b) {
            continue;
        }
        let Some((next, position)) = qualify(session, a, b) else {
            continue;
        };

        consumed.insert(a);
        consumed.insert(b);
        session.remove_ball(a);
        session.remove_ball(b);

        let spawned = session.create_ball(&BallSpawn::free(next, position));
        if let Some(ball) = session.ball_mut(spawned) {
            ball.settled_at = Some(now);
        }

        let points = session.config.points_per_rank * u64::from(next.value());
        session.scores.add(points);

        log::debug!(
            "Merged {} + {} into rank {} (+{})",
            a.0,
            b.0,
            next.value(),
            points
        );
        merges.push(MergeEvent {
            consumed: (a, b),
            spawned,
            rank: next,
            position,
            points,
        });
    }

    merges
}

/// Successor rank and spawn point if `a` and `b` may merge
fn qualify(session: &GameSession, a: BallId, b: BallId) -> Option<(Rank, Vec2)> {
    let ball_a = session.ball(a)?;
    let ball_b = session.ball(b)?;
    let world = session.world();

    if !world.is_dynamic(ball_a.body) || !world.is_dynamic(ball_b.body) {
        return None;
    }
    if ball_a.rank != ball_b.rank || ball_a.rank.is_terminal() {
        return None;
    }

    let next = ball_a.rank.next()?;
    let pos_a = world.translation(ball_a.body)?;
    let pos_b = world.translation(ball_b.body)?;
    Some((next, midpoint(pos_a, pos_b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::BodyTag;
    use crate::sim::state::tests::session;
    use proptest::prelude::*;

    fn contact(a: BallId, b: BallId) -> ContactStart {
        ContactStart {
            a: BodyTag::Ball(a),
            b: BodyTag::Ball(b),
        }
    }

    fn free(session: &mut GameSession, rank: u8, x: f32, y: f32) -> BallId {
        session.create_ball(&BallSpawn::free(Rank::new(rank).unwrap(), Vec2::new(x, y)))
    }

    #[test]
    fn test_every_rank_below_terminal_merges_at_midpoint() {
        for r in 0..10u8 {
            let mut session = session();
            let a = free(&mut session, r, 200.0, 600.0);
            let b = free(&mut session, r, 400.0, 700.0);
            let before = session.balls().len();

            let merges = resolve_merges(&mut session, &[contact(a, b)], 5000.0);

            assert_eq!(merges.len(), 1, "rank {}", r);
            assert!(session.ball(a).is_none() && session.ball(b).is_none());
            assert_eq!(session.balls().len(), before - 1);

            let merged = session.ball(merges[0].spawned).unwrap();
            assert_eq!(merged.rank.value(), r + 1);
            assert!(merged.is_active());
            assert_eq!(merged.settled_at, Some(5000.0));
            assert_eq!(
                session.ball_position(merged.id).unwrap(),
                Vec2::new(300.0, 650.0)
            );
            assert_eq!(session.score(), 10 * u64::from(r + 1));
        }
    }

    #[test]
    fn test_terminal_rank_never_merges() {
        let mut session = session();
        let a = free(&mut session, 10, 200.0, 600.0);
        let b = free(&mut session, 10, 600.0, 600.0);
        let merges = resolve_merges(&mut session, &[contact(a, b)], 0.0);
        assert!(merges.is_empty());
        assert!(session.ball(a).is_some() && session.ball(b).is_some());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_different_ranks_do_not_merge() {
        let mut session = session();
        let a = free(&mut session, 1, 200.0, 600.0);
        let b = free(&mut session, 2, 600.0, 600.0);
        assert!(resolve_merges(&mut session, &[contact(a, b)], 0.0).is_empty());
    }

    #[test]
    fn test_held_ball_does_not_merge() {
        let mut session = session();
        let held = session.held().unwrap();
        let free_ball = free(&mut session, 0, 450.0, 300.0);
        assert!(resolve_merges(&mut session, &[contact(held, free_ball)], 0.0).is_empty());
        assert_eq!(session.held(), Some(held));
    }

    #[test]
    fn test_boundary_contacts_ignored() {
        let mut session = session();
        let a = free(&mut session, 0, 200.0, 600.0);
        let batch = [ContactStart {
            a: BodyTag::Ball(a),
            b: BodyTag::Boundary,
        }];
        assert!(resolve_merges(&mut session, &batch, 0.0).is_empty());
    }

    #[test]
    fn test_triple_touch_merges_once_per_batch() {
        let mut session = session();
        let a = free(&mut session, 2, 300.0, 700.0);
        let b = free(&mut session, 2, 360.0, 700.0);
        let c = free(&mut session, 2, 330.0, 650.0);

        let batch = [contact(a, b), contact(b, c), contact(a, c)];
        let merges = resolve_merges(&mut session, &batch, 0.0);

        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].consumed, (a, b));
        assert!(session.ball(c).is_some());
        assert_eq!(session.score(), 30);
    }

    #[test]
    fn test_disjoint_pairs_merge_in_same_batch() {
        let mut session = session();
        let a = free(&mut session, 0, 100.0, 700.0);
        let b = free(&mut session, 0, 150.0, 700.0);
        let c = free(&mut session, 3, 600.0, 700.0);
        let d = free(&mut session, 3, 700.0, 700.0);

        let merges = resolve_merges(&mut session, &[contact(a, b), contact(c, d)], 0.0);
        assert_eq!(merges.len(), 2);
        assert_eq!(session.score(), 10 + 40);
    }

    proptest! {
        #[test]
        fn prop_score_sums_merge_ranks(ranks in proptest::collection::vec(0u8..10, 1..8)) {
            let mut session = session();
            let mut expected = 0u64;
            for (i, r) in ranks.iter().enumerate() {
                let x = 60.0 + (i as f32) * 100.0;
                let a = free(&mut session, *r, x, 500.0);
                let b = free(&mut session, *r, x + 40.0, 500.0);
                let merges = resolve_merges(&mut session, &[contact(a, b)], 0.0);
                prop_assert_eq!(merges.len(), 1);
                expected += 10 * u64::from(r + 1);
            }
            prop_assert_eq!(session.score(), expected);
        }
    }
}
