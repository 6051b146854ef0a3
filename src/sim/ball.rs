//! Ball entities and the factory that puts them into the world

use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use super::physics::{BallBodyDesc, PhysicsWorld};
use crate::config::{GameConfig, Layout};
use crate::consts::BASE_RADII;

/// Merge level of a ball, `0..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u8);

impl Rank {
    pub const MIN: Rank = Rank(0);
    /// Terminal rank: never merges further
    pub const MAX: Rank = Rank(10);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_terminal(self) -> bool {
        self == Self::MAX
    }

    /// The rank a merge of two balls of this rank produces
    pub fn next(self) -> Option<Rank> {
        Rank::new(self.0 + 1)
    }

    /// Radius before device scaling
    pub fn base_radius(self) -> f32 {
        BASE_RADII[self.0 as usize]
    }

    /// Sprite index; the terminal rank has no sprite of its own
    pub fn texture_index(self) -> Option<usize> {
        (!self.is_terminal()).then_some(self.0 as usize)
    }
}

/// Game-assigned ball identifier, stored in the body's user data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BallId(pub u32);

/// A ball in play
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: BallId,
    pub rank: Rank,
    pub radius: f32,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    /// Held by the player: kinematic, no gravity
    pub pending: bool,
    /// In the colliding group
    pub collidable: bool,
    /// When the ball became free (dropped or spawned by a merge), ms
    pub settled_at: Option<f64>,
}

impl Ball {
    /// Free and collidable
    pub fn is_active(&self) -> bool {
        !self.pending && self.collidable
    }

    /// Free for strictly longer than `debounce_ms` at time `now`
    pub fn settled_for(&self, now: f64, debounce_ms: f64) -> bool {
        self.settled_at.is_some_and(|t| now - t > debounce_ms)
    }
}

/// Parameters for creating a ball
#[derive(Debug, Clone, Copy)]
pub struct BallSpawn {
    pub rank: Rank,
    pub pending: bool,
    pub x: f32,
    /// Defaults to the aim line
    pub y: Option<f32>,
    pub collidable: bool,
}

impl BallSpawn {
    /// A ball held on the aim line, out of the collision groups
    pub fn held(rank: Rank, x: f32) -> Self {
        Self {
            rank,
            pending: true,
            x,
            y: None,
            collidable: false,
        }
    }

    /// A free, collidable ball at a given position
    pub fn free(rank: Rank, pos: Vec2) -> Self {
        Self {
            rank,
            pending: false,
            x: pos.x,
            y: Some(pos.y),
            collidable: true,
        }
    }
}

/// Scaled radius of a rank on a given board
pub fn radius_for(rank: Rank, layout: &Layout) -> f32 {
    rank.base_radius() * layout.scale
}

/// Create a ball and add it to the world immediately
pub fn create_ball(
    world: &mut PhysicsWorld,
    id: BallId,
    spawn: &BallSpawn,
    layout: &Layout,
    config: &GameConfig,
) -> Ball {
    let radius = radius_for(spawn.rank, layout);
    let position = Vec2::new(spawn.x, spawn.y.unwrap_or(layout.aim_y));

    let handles = world.insert_ball(&BallBodyDesc {
        id,
        position,
        radius,
        restitution: config.restitution,
        mass: config.ball_mass,
        pending: spawn.pending,
        collidable: spawn.collidable,
    });

    log::debug!(
        "Spawned ball {} rank {} at ({:.1}, {:.1}){}",
        id.0,
        spawn.rank.value(),
        position.x,
        position.y,
        if spawn.pending { " (held)" } else { "" }
    );

    Ball {
        id,
        rank: spawn.rank,
        radius,
        body: handles.body,
        collider: handles.collider,
        pending: spawn.pending,
        collidable: spawn.collidable,
        settled_at: None,
    }
}
