//! Gameplay simulation
//!
//! Everything here runs natively and is driven explicitly:
//! - Fixed timestep only, wall time passed in as `now` (ms)
//! - Seeded RNG only
//! - Stable iteration order (balls sorted by id)
//! - No rendering or DOM dependencies

pub mod ball;
pub mod game_over;
pub mod merge;
pub mod physics;
pub mod schedule;
pub mod score;
pub mod state;
pub mod tick;

pub use ball::{Ball, BallId, BallSpawn, Rank, create_ball, radius_for};
pub use game_over::{GameOverReport, check_game_over, limit_crossed};
pub use merge::{MergeEvent, resolve_merges};
pub use physics::{BodyTag, ContactStart, PhysicsWorld};
pub use schedule::{CancelToken, ScheduledSpawn};
pub use score::{NullDisplay, ScoreBoard, ScoreDisplay};
pub use state::{BallView, GamePhase, GameSession};
pub use tick::{FixedStep, TickOutcome, tick};
