//! Rigid-body world backed by Rapier2D
//!
//! Wraps the Rapier sets and pipeline behind the handful of operations the
//! game needs: add/remove bodies, toggle pending/collidable, teleport, and a
//! `step` that hands back the batch of contacts that started during it.
//! Coordinates are y-down screen pixels.

use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use super::ball::BallId;
use crate::config::Layout;
use crate::consts::{SIM_DT, WALL_THICKNESS};

/// Membership/filter for bodies that take part in collisions
pub fn colliding_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_1, Group::GROUP_1)
}

/// Membership/filter for held balls: touches nothing, not even each other
pub fn non_colliding_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_2, Group::NONE)
}

/// What a collider in the world represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    /// Wall or floor
    Boundary,
    Ball(BallId),
}

impl BodyTag {
    pub fn ball(self) -> Option<BallId> {
        match self {
            BodyTag::Ball(id) => Some(id),
            BodyTag::Boundary => None,
        }
    }

    fn from_user_data(data: u128) -> Self {
        match u32::try_from(data) {
            Ok(0) | Err(_) => BodyTag::Boundary,
            Ok(id) => BodyTag::Ball(BallId(id)),
        }
    }
}

/// Two bodies that started touching during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStart {
    pub a: BodyTag,
    pub b: BodyTag,
}

/// Description of a ball body before insertion
#[derive(Debug, Clone, Copy)]
pub struct BallBodyDesc {
    pub id: BallId,
    pub position: Vec2,
    pub radius: f32,
    pub restitution: f32,
    pub mass: f32,
    /// Kinematic (moved by input, ignores gravity) instead of dynamic
    pub pending: bool,
    pub collidable: bool,
}

/// Handle pair for a ball living in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallHandles {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

// Rapier requires `Sync` event handlers even though we step on one thread.
struct ContactCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl ContactCollector {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        let mut started = self.started.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *started)
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(h1, h2, _) = event {
            self.started
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((h1, h2));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics world containing all Rapier2D components
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: ContactCollector,
    boundaries: Vec<RigidBodyHandle>,
    frame: u64,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("frame", &self.frame)
            .field("body_count", &self.bodies.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld {
    /// Create an empty world. Positive `gravity.y` pulls downward.
    pub fn new(gravity: Vec2) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: SIM_DT,
            ..Default::default()
        };

        Self {
            gravity: vector![gravity.x, gravity.y],
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: ContactCollector::new(),
            boundaries: Vec::new(),
            frame: 0,
        }
    }

    /// Add the left wall, right wall and floor around a board.
    /// They sit just outside the visible area and are never removed.
    pub fn add_boundaries(&mut self, layout: &Layout) {
        let half = WALL_THICKNESS / 2.0;
        let (w, h) = (layout.width, layout.height);

        // (center, half extents, friction)
        let pieces = [
            (vector![-half, h / 2.0], vector![half, h / 2.0], 0.5),
            (vector![w + half, h / 2.0], vector![half, h / 2.0], 0.5),
            (vector![w / 2.0, h + half], vector![w / 2.0 + WALL_THICKNESS, half], 0.0),
        ];

        for (center, half_extents, friction) in pieces {
            let body = RigidBodyBuilder::fixed().translation(center).build();
            let handle = self.bodies.insert(body);
            let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
                .friction(friction)
                .collision_groups(colliding_groups())
                .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
            self.boundaries.push(handle);
        }
    }

    /// Number of wall/floor bodies
    pub fn boundary_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Insert a ball body and its circular collider
    pub fn insert_ball(&mut self, desc: &BallBodyDesc) -> BallHandles {
        let builder = if desc.pending {
            RigidBodyBuilder::kinematic_position_based()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let body = builder
            .translation(vector![desc.position.x, desc.position.y])
            .ccd_enabled(true)
            .user_data(desc.id.0 as u128)
            .build();
        let body_handle = self.bodies.insert(body);

        let groups = if desc.collidable {
            colliding_groups()
        } else {
            non_colliding_groups()
        };
        let collider = ColliderBuilder::ball(desc.radius)
            .restitution(desc.restitution)
            .mass(desc.mass)
            .collision_groups(groups)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        BallHandles {
            body: body_handle,
            collider: collider_handle,
        }
    }

    /// Remove a body and its collider
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Teleport a body
    pub fn set_translation(&mut self, handle: RigidBodyHandle, pos: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_translation(vector![pos.x, pos.y], true);
        }
    }

    /// Switch a body between kinematic (held) and dynamic (free)
    pub fn set_pending(&mut self, handle: RigidBodyHandle, pending: bool) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            let body_type = if pending {
                RigidBodyType::KinematicPositionBased
            } else {
                RigidBodyType::Dynamic
            };
            rb.set_body_type(body_type, true);
        }
    }

    /// Move a collider in or out of the colliding group
    pub fn set_collidable(&mut self, handle: ColliderHandle, collidable: bool) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_collision_groups(if collidable {
                colliding_groups()
            } else {
                non_colliding_groups()
            });
        }
    }

    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|rb| {
            let t = rb.translation();
            Vec2::new(t.x, t.y)
        })
    }

    pub fn rotation(&self, handle: RigidBodyHandle) -> Option<f32> {
        self.bodies.get(handle).map(|rb| rb.rotation().angle())
    }

    /// Smallest y of the collider's bounding box (its top edge on screen)
    pub fn top_edge(&self, handle: ColliderHandle) -> Option<f32> {
        self.colliders
            .get(handle)
            .map(|collider| collider.compute_aabb().mins.y)
    }

    pub fn is_dynamic(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some_and(|rb| rb.is_dynamic())
    }

    /// Number of rigid bodies, boundaries included
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Simulation steps taken so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance one fixed step and return the contacts that started in it,
    /// in the order the engine reported them.
    pub fn step(&mut self) -> Vec<ContactStart> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );
        self.frame += 1;

        self.collector
            .drain()
            .into_iter()
            .filter_map(|(h1, h2)| {
                Some(ContactStart {
                    a: self.collider_tag(h1)?,
                    b: self.collider_tag(h2)?,
                })
            })
            .collect()
    }

    fn collider_tag(&self, handle: ColliderHandle) -> Option<BodyTag> {
        let parent = self.colliders.get(handle)?.parent()?;
        let body = self.bodies.get(parent)?;
        Some(BodyTag::from_user_data(body.user_data))
    }
}
