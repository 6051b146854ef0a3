//! Canvas 2D rendering
//!
//! Balls are drawn as rank sprites scaled to their diameter and rotated with
//! their body. Sprites are preloaded at startup.

pub mod canvas;
pub mod sprites;

pub use canvas::CanvasRenderer;
pub use sprites::SpriteAtlas;
