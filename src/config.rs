//! Game tunables and board layout
//!
//! `GameConfig` is persisted in LocalStorage next to the best score.
//! `Layout` is derived once from the viewport and never changes during a
//! session (a resize reloads the page).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::platform::KeyValueStore;

/// Gameplay tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Downward gravity in px/s² (y grows downward)
    pub gravity: f32,
    /// Delay between a drop and the next held ball (ms)
    pub spawn_delay_ms: f64,
    /// Grace period after a ball becomes active before it can end the game (ms)
    pub settle_debounce_ms: f64,
    /// Next held ball rank is drawn uniformly from `[0, spawn_rank_count)`
    pub spawn_rank_count: u8,
    /// A merge into rank `r` scores `points_per_rank * r`
    pub points_per_rank: u64,
    /// Bounciness shared by every ball
    pub restitution: f32,
    /// Mass shared by every ball regardless of size
    pub ball_mass: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: 2000.0,
            spawn_delay_ms: 500.0,
            settle_debounce_ms: 1000.0,
            spawn_rank_count: 5,
            points_per_rank: 10,
            restitution: 0.1,
            ball_mass: 8.0,
        }
    }
}

impl GameConfig {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "merge_balls_config";

    /// Load config from storage, falling back to defaults when missing or invalid
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from storage");
                    return config;
                }
                Err(e) => log::warn!("Ignoring invalid stored config: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Config storage unreadable: {}", e),
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Load config, writing the defaults back on first run so they can be
    /// edited in storage
    pub fn load_or_init(store: &mut dyn KeyValueStore) -> Self {
        if matches!(store.get(Self::STORAGE_KEY), Ok(None)) {
            let config = Self::default();
            if let Err(e) = config.save(store) {
                log::warn!("Could not store default config: {}", e);
            }
            return config;
        }
        Self::load(store)
    }

    /// Save config to storage
    pub fn save(&self, store: &mut dyn KeyValueStore) -> crate::Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Config saved");
        Ok(())
    }
}

/// Board geometry derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Board width in px
    pub width: f32,
    /// Board height in px
    pub height: f32,
    /// Height of the aim line; also the game-over limit
    pub aim_y: f32,
    /// Multiplier applied to every ball radius
    pub scale: f32,
}

impl Layout {
    /// Compute the layout for a viewport of the given CSS pixel size
    pub fn from_viewport(viewport_width: f32, viewport_height: f32) -> Self {
        if viewport_width < COMPACT_BREAKPOINT {
            Self {
                width: viewport_width - COMPACT_WIDTH_MARGIN,
                height: viewport_height - COMPACT_HEIGHT_MARGIN,
                aim_y: COMPACT_AIM_Y,
                scale: COMPACT_SCALE,
            }
        } else {
            Self {
                width: WIDE_BOARD,
                height: WIDE_BOARD,
                aim_y: WIDE_AIM_Y,
                scale: WIDE_SCALE,
            }
        }
    }

    /// The wide desktop layout
    pub fn wide() -> Self {
        Self::from_viewport(COMPACT_BREAKPOINT, WIDE_BOARD)
    }

    /// Center of the aim line, where a fresh session's first ball appears
    pub fn aim_center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.aim_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_wide_layout() {
        let layout = Layout::from_viewport(1920.0, 1080.0);
        assert_eq!(layout.width, 900.0);
        assert_eq!(layout.height, 900.0);
        assert_eq!(layout.aim_y, 140.0);
        assert_eq!(layout.scale, 0.85);
    }

    #[test]
    fn test_compact_layout() {
        let layout = Layout::from_viewport(400.0, 800.0);
        assert_eq!(layout.width, 350.0);
        assert_eq!(layout.height, 650.0);
        assert_eq!(layout.aim_y, 90.0);
        assert_eq!(layout.scale, 0.6);
    }

    #[test]
    fn test_breakpoint_is_exclusive() {
        assert_eq!(Layout::from_viewport(1300.0, 900.0).scale, 0.6);
        assert_eq!(Layout::from_viewport(1301.0, 900.0).scale, 0.85);
    }

    #[test]
    fn test_config_missing_uses_defaults() {
        let store = MemoryStore::new();
        assert_eq!(GameConfig::load(&store), GameConfig::default());
    }

    #[test]
    fn test_config_invalid_uses_defaults() {
        let store = MemoryStore::with_entry(GameConfig::STORAGE_KEY, "{not json");
        assert_eq!(GameConfig::load(&store), GameConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let mut store = MemoryStore::new();
        let config = GameConfig {
            spawn_delay_ms: 250.0,
            ..Default::default()
        };
        config.save(&mut store).unwrap();
        assert_eq!(GameConfig::load(&store), config);
    }

    #[test]
    fn test_first_run_stores_defaults() {
        let mut store = MemoryStore::new();
        assert_eq!(GameConfig::load_or_init(&mut store), GameConfig::default());

        let json = store.get(GameConfig::STORAGE_KEY).unwrap().unwrap();
        let stored: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(stored, GameConfig::default());
    }

    #[test]
    fn test_load_or_init_keeps_stored_config() {
        let mut store =
            MemoryStore::with_entry(GameConfig::STORAGE_KEY, r#"{"spawn_delay_ms": 250.0}"#);
        let config = GameConfig::load_or_init(&mut store);
        assert_eq!(config.spawn_delay_ms, 250.0);
        assert_eq!(
            store.get(GameConfig::STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"spawn_delay_ms": 250.0}"#)
        );
    }

    #[test]
    fn test_config_partial_json_fills_defaults() {
        let store = MemoryStore::with_entry(GameConfig::STORAGE_KEY, r#"{"gravity": 1500.0}"#);
        let config = GameConfig::load(&store);
        assert_eq!(config.gravity, 1500.0);
        assert_eq!(config.spawn_rank_count, 5);
    }
}
