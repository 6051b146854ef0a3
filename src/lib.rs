//! Merge Balls - a drop-and-merge ball puzzle
//!
//! Core modules:
//! - `sim`: Gameplay (physics adapter, merging, game-over detection, session state)
//! - `config`: Tunables and viewport-derived board layout
//! - `highscore`: Best score persistence
//! - `platform`: Storage and clock abstraction
//! - `renderer` / `ui`: Browser canvas and DOM surfaces (wasm only)

pub mod config;
pub mod error;
pub mod highscore;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use config::{GameConfig, Layout};
pub use error::{Error, Result};
pub use highscore::HighScore;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, same cadence as the browser frame loop)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Base ball radius per rank, before device scaling
    pub const BASE_RADII: [f32; 11] = [
        30.0, 45.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0,
    ];

    /// Viewports narrower than this use the compact layout
    pub const COMPACT_BREAKPOINT: f32 = 1301.0;
    pub const COMPACT_SCALE: f32 = 0.6;
    pub const WIDE_SCALE: f32 = 0.85;

    /// Wide layout board size and aim line
    pub const WIDE_BOARD: f32 = 900.0;
    pub const WIDE_AIM_Y: f32 = 140.0;
    /// Compact layout margins and aim line
    pub const COMPACT_WIDTH_MARGIN: f32 = 50.0;
    pub const COMPACT_HEIGHT_MARGIN: f32 = 150.0;
    pub const COMPACT_AIM_Y: f32 = 90.0;

    /// Thickness of walls and floor
    pub const WALL_THICKNESS: f32 = 20.0;
}

/// Midpoint of two positions
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}
