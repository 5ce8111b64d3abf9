/// Game tunables.
///
/// Defaults reproduce the classic round: a 400×400 arena, 20 targets per
/// round, at most 15 alive at once.  A JSON file may override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::motion::Arena;

/// Granularity the round clock is advanced in.
pub const BASE_STEP_MS: u64 = 10;

pub const MAX_TARGETS: u32 = 20;
pub const MAX_ACTIVE_TARGETS: u32 = 15;
pub const TARGET_SIZE: i32 = 20;

/// Periods of the independent round tasks, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub shooter_move_ms: u64,
    pub fire_ms: u64,
    pub bullet_move_ms: u64,
    pub target_generate_ms: u64,
    /// Delay between a target appearing and it starting to wander.
    pub target_grace_ms: u64,
    pub wander_step_ms: u64,
    pub wander_reroll_min_ms: u64,
    pub wander_reroll_max_ms: u64,
    pub clock_ms: u64,
    pub termination_poll_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            shooter_move_ms: 60,
            fire_ms: 100,
            bullet_move_ms: 30,
            target_generate_ms: 1000,
            target_grace_ms: 800,
            wander_step_ms: 200,
            wander_reroll_min_ms: 1000,
            wander_reroll_max_ms: 2000,
            clock_ms: 1000,
            termination_poll_ms: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena_width: i32,
    pub arena_height: i32,
    /// Overshoot allowed past each arena edge.
    pub tolerance: i32,
    pub shooter_size: i32,
    pub bullet_size: i32,
    pub target_size: i32,
    /// Targets spawned per round; also the score needed to win.
    pub max_targets: u32,
    pub max_active_targets: u32,
    /// When false the live-target cap is ignored and only `max_targets`
    /// limits spawning.
    pub enforce_active_cap: bool,
    /// Placement retries before a spawn counts as saturated.
    pub spawn_attempts: u32,
    /// Most time one `Round::advance` call will simulate.
    pub max_catch_up_ms: u64,
    pub timings: Timings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 400,
            arena_height: 400,
            tolerance: 10,
            shooter_size: 20,
            bullet_size: 10,
            target_size: TARGET_SIZE,
            max_targets: MAX_TARGETS,
            max_active_targets: MAX_ACTIVE_TARGETS,
            enforce_active_cap: true,
            spawn_attempts: 100,
            max_catch_up_ms: 1000,
            timings: Timings::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn arena(&self) -> Arena {
        Arena::new(self.arena_width, self.arena_height, self.tolerance)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, size) in [
            ("shooter_size", self.shooter_size),
            ("bullet_size", self.bullet_size),
            ("target_size", self.target_size),
        ] {
            // a step is half the size, so anything below 2 never moves
            if size < 2 {
                return Err(ConfigError::invalid(field, format!("{size} is below 2")));
            }
        }
        let largest = self.shooter_size.max(self.target_size).max(self.bullet_size);
        if self.arena_width < largest || self.arena_height < largest {
            return Err(ConfigError::invalid(
                "arena_width",
                format!(
                    "{}x{} arena cannot hold an entity of size {largest}",
                    self.arena_width, self.arena_height
                ),
            ));
        }
        if self.tolerance < 0 {
            return Err(ConfigError::invalid("tolerance", "must not be negative"));
        }
        if self.max_targets == 0 {
            return Err(ConfigError::invalid("max_targets", "must be at least 1"));
        }
        if self.max_active_targets == 0 || self.max_active_targets > self.max_targets {
            return Err(ConfigError::invalid(
                "max_active_targets",
                format!("must be within 1..={}", self.max_targets),
            ));
        }
        if self.spawn_attempts == 0 {
            return Err(ConfigError::invalid("spawn_attempts", "must be at least 1"));
        }

        let t = &self.timings;
        for (field, period) in [
            ("shooter_move_ms", t.shooter_move_ms),
            ("fire_ms", t.fire_ms),
            ("bullet_move_ms", t.bullet_move_ms),
            ("target_generate_ms", t.target_generate_ms),
            ("wander_step_ms", t.wander_step_ms),
            ("wander_reroll_min_ms", t.wander_reroll_min_ms),
            ("clock_ms", t.clock_ms),
            ("termination_poll_ms", t.termination_poll_ms),
            ("max_catch_up_ms", self.max_catch_up_ms),
        ] {
            if period == 0 {
                return Err(ConfigError::invalid(field, "period must be positive"));
            }
        }
        for (field, period) in [
            ("shooter_move_ms", t.shooter_move_ms),
            ("fire_ms", t.fire_ms),
            ("bullet_move_ms", t.bullet_move_ms),
            ("target_generate_ms", t.target_generate_ms),
            ("target_grace_ms", t.target_grace_ms),
            ("wander_step_ms", t.wander_step_ms),
            ("wander_reroll_min_ms", t.wander_reroll_min_ms),
            ("wander_reroll_max_ms", t.wander_reroll_max_ms),
            ("clock_ms", t.clock_ms),
            ("termination_poll_ms", t.termination_poll_ms),
            ("max_catch_up_ms", self.max_catch_up_ms),
        ] {
            if period % BASE_STEP_MS != 0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("{period} is not a multiple of {BASE_STEP_MS}"),
                ));
            }
        }
        if t.wander_reroll_min_ms > t.wander_reroll_max_ms {
            return Err(ConfigError::invalid(
                "wander_reroll_max_ms",
                "must not be below wander_reroll_min_ms",
            ));
        }
        if t.wander_reroll_max_ms > u64::from(u32::MAX) {
            return Err(ConfigError::invalid(
                "wander_reroll_max_ms",
                format!("must not exceed {}", u32::MAX),
            ));
        }
        Ok(())
    }
}
