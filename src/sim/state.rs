//! Session state and the input-facing operations on it
//!
//! `GameSession` owns everything a run needs: the physics world, the balls
//! in it, the held ball, scores and the pending next-ball spawn. The merge
//! resolver, game-over monitor and tick driver operate on it by reference.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ball::{Ball, BallId, BallSpawn, Rank, create_ball};
use super::physics::PhysicsWorld;
use super::schedule::{CancelToken, Poll, ScheduledSpawn};
use super::score::{ScoreBoard, ScoreDisplay};
use crate::config::{GameConfig, Layout};
use crate::error::Result;
use crate::highscore::HighScore;
use crate::platform::KeyValueStore;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Simulation running
    Playing,
    /// Simulation halted until restart
    GameOver,
}

/// Render-facing snapshot of a ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub id: BallId,
    pub rank: Rank,
    pub position: Vec2,
    pub angle: f32,
    pub radius: f32,
}

/// A single play session
pub struct GameSession {
    pub(crate) config: GameConfig,
    pub(crate) layout: Layout,
    pub(crate) world: PhysicsWorld,
    /// Balls in play, sorted by id
    pub(crate) balls: Vec<Ball>,
    /// The ball the player is aiming, if any
    pub(crate) held: Option<BallId>,
    pub(crate) phase: GamePhase,
    pub(crate) scores: ScoreBoard,
    pub(crate) best: HighScore,
    pub(crate) store: Box<dyn KeyValueStore>,
    pub(crate) next_spawn: Option<ScheduledSpawn>,
    /// Cancelled when the run ends; replaced on restart
    pub(crate) run_token: CancelToken,
    rng: Pcg32,
    next_id: u32,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("phase", &self.phase)
            .field("balls", &self.balls.len())
            .field("held", &self.held)
            .field("scores", &self.scores)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Build the world, load the best score and hand the player a rank-0 ball
    pub fn new(
        config: GameConfig,
        layout: Layout,
        store: Box<dyn KeyValueStore>,
        display: Box<dyn ScoreDisplay>,
        seed: u64,
    ) -> Result<Self> {
        let best = HighScore::load(store.as_ref())?;
        let mut world = PhysicsWorld::new(Vec2::new(0.0, config.gravity));
        world.add_boundaries(&layout);

        let mut session = Self {
            scores: ScoreBoard::new(best.value, display),
            config,
            layout,
            world,
            balls: Vec::new(),
            held: None,
            phase: GamePhase::Playing,
            best,
            store,
            next_spawn: None,
            run_token: CancelToken::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        session.hold_new_ball(Rank::MIN, layout.aim_center().x);

        log::info!("Session started ({}x{} board)", layout.width, layout.height);
        Ok(session)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn score(&self) -> u64 {
        self.scores.score()
    }

    pub fn high_score(&self) -> u64 {
        self.scores.high_score()
    }

    pub fn held(&self) -> Option<BallId> {
        self.held
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub(crate) fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    pub fn ball_position(&self, id: BallId) -> Option<Vec2> {
        self.ball(id).and_then(|b| self.world.translation(b.body))
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Snapshot of every ball for drawing
    pub fn ball_views(&self) -> Vec<BallView> {
        self.balls
            .iter()
            .filter_map(|b| {
                Some(BallView {
                    id: b.id,
                    rank: b.rank,
                    position: self.world.translation(b.body)?,
                    angle: self.world.rotation(b.body)?,
                    radius: b.radius,
                })
            })
            .collect()
    }

    /// Create a ball, add it to the world and track it
    pub fn create_ball(&mut self, spawn: &BallSpawn) -> BallId {
        let id = BallId(self.next_id);
        self.next_id += 1;
        let ball = create_ball(&mut self.world, id, spawn, &self.layout, &self.config);
        self.balls.push(ball);
        id
    }

    /// Remove a ball from the world and stop tracking it
    pub(crate) fn remove_ball(&mut self, id: BallId) -> Option<Ball> {
        let index = self.balls.iter().position(|b| b.id == id)?;
        let ball = self.balls.remove(index);
        self.world.remove_body(ball.body);
        if self.held == Some(id) {
            self.held = None;
        }
        Some(ball)
    }

    /// Move the held ball along the aim line. No-op when nothing is held.
    pub fn aim(&mut self, x: f32) {
        if self.is_over() {
            return;
        }
        let Some(ball) = self.held.and_then(|id| self.ball(id)) else {
            return;
        };
        let (body, radius) = (ball.body, ball.radius);
        let pos = Vec2::new(self.clamp_to_board(x, radius), self.layout.aim_y);
        self.world.set_translation(body, pos);
    }

    /// Let go of the held ball and schedule the next one at `x`.
    /// Returns false when nothing was held.
    pub fn release(&mut self, x: f32, now: f64) -> bool {
        if self.is_over() {
            return false;
        }
        let Some(id) = self.held.take() else {
            return false;
        };
        let Some(ball) = self.ball_mut(id) else {
            return false;
        };
        ball.collidable = true;
        ball.pending = false;
        ball.settled_at = Some(now);
        let (body, collider) = (ball.body, ball.collider);

        self.world.set_collidable(collider, true);
        self.world.set_pending(body, false);

        self.next_spawn = Some(ScheduledSpawn::new(
            now + self.config.spawn_delay_ms,
            x,
            self.run_token.clone(),
        ));
        log::debug!("Dropped ball {}", id.0);
        true
    }

    /// Fire the scheduled next-ball spawn if it is due
    pub(crate) fn poll_spawn(&mut self, now: f64) {
        let Some(task) = &self.next_spawn else {
            return;
        };
        match task.poll(now) {
            Poll::Waiting => {}
            Poll::Cancelled => self.next_spawn = None,
            Poll::Fire { x } => {
                self.next_spawn = None;
                let rank = self.roll_spawn_rank();
                self.hold_new_ball(rank, x);
            }
        }
    }

    /// Clear the board and start over with a rank-0 ball at the center
    pub fn restart(&mut self) {
        self.run_token.cancel();
        self.run_token = CancelToken::new();
        self.next_spawn = None;

        for ball in std::mem::take(&mut self.balls) {
            self.world.remove_body(ball.body);
        }
        self.held = None;

        self.scores.set_score(0);
        self.phase = GamePhase::Playing;
        self.hold_new_ball(Rank::MIN, self.layout.aim_center().x);
        log::info!("Session restarted");
    }

    fn hold_new_ball(&mut self, rank: Rank, x: f32) {
        let x = self.clamp_to_board(x, rank.base_radius() * self.layout.scale);
        let id = self.create_ball(&BallSpawn::held(rank, x));
        self.held = Some(id);
    }

    fn roll_spawn_rank(&mut self) -> Rank {
        let count = self.config.spawn_rank_count.clamp(1, Rank::MAX.value() + 1);
        Rank::new(self.rng.random_range(0..count)).unwrap_or(Rank::MIN)
    }

    fn clamp_to_board(&self, x: f32, radius: f32) -> f32 {
        let max = (self.layout.width - radius).max(radius);
        x.clamp(radius, max)
    }
}
