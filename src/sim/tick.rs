//! Fixed timestep simulation tick
//!
//! One tick = fire the due next-ball spawn, then (while playing) one physics
//! step followed by the merge resolver and the game-over monitor, in that
//! order.

use super::game_over::{GameOverReport, check_game_over};
use super::merge::{MergeEvent, resolve_merges};
use super::state::GameSession;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::Result;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Physics advanced (false while the run is over)
    pub stepped: bool,
    pub merges: Vec<MergeEvent>,
    /// Set on the tick the run ends
    pub game_over: Option<GameOverReport>,
}

/// Advance the session by one fixed step at wall time `now` (ms)
pub fn tick(session: &mut GameSession, now: f64) -> Result<TickOutcome> {
    session.poll_spawn(now);

    if session.is_over() {
        return Ok(TickOutcome::default());
    }

    let batch = session.world.step();
    let merges = resolve_merges(session, &batch, now);
    let game_over = check_game_over(session, now)?;

    Ok(TickOutcome {
        stepped: true,
        merges,
        game_over,
    })
}

/// Frame-time accumulator that converts variable frame deltas into a bounded
/// number of fixed steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
    last_time: Option<f64>,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current frame time (ms) and get the number of steps to run
    pub fn advance(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(time_ms);
        self.accumulator += dt.clamp(0.0, 0.1);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        // Drop backlog we could not catch up on
        if steps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        steps
    }

    /// Forget timing history (after a pause or restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
