/// Target subsystem: edge spawning, population control and the autonomous
/// wander behaviour.

use log::{debug, error};

use crate::config::GameConfig;
use crate::entities::{Axis, Direction, EntityId, EntityKind, IdAllocator, Target};
use crate::error::SpawnError;
use crate::geometry::{random_natural_in_range, random_value_from, RandomSource, Rect};
use crate::motion::{move_step, Arena};
use crate::port::RoundEvent;
use crate::schedule::{Interval, Timeout};

pub fn random_direction(rng: &mut dyn RandomSource) -> Result<Direction, SpawnError> {
    random_value_from(rng, &Direction::ALL).map_err(|index| SpawnError::InvalidDirection { index })
}

fn random_pair(rng: &mut dyn RandomSource) -> Result<[Direction; 2], SpawnError> {
    Ok([random_direction(rng)?, random_direction(rng)?])
}

/// Pick a new wander pair and reroll period, restarting the step phase.
fn roll(target: &mut Target, rng: &mut dyn RandomSource, min_ms: u64, max_ms: u64) {
    match random_pair(rng) {
        Ok(pair) => target.wander = Some(pair),
        Err(e) => error!("target {} keeps its wander directions: {e}", target.id.0),
    }
    let clamp = |ms: u64| u32::try_from(ms).unwrap_or(u32::MAX);
    let period = random_natural_in_range(rng, clamp(min_ms), clamp(max_ms));
    target.reroll.restart_with(u64::from(period));
    target.step.restart();
}

/// Candidate top-left corner on an arena edge.
///
/// Offsets are multiples of half the target size starting half a target
/// outside the edge.  `Up`/`Down` choose a horizontal offset pinned to the
/// bottom/top edge, `Left`/`Right` a vertical offset pinned to the
/// right/left edge.
pub fn edge_coordinate(
    arena: &Arena,
    size: i32,
    rng: &mut dyn RandomSource,
) -> Result<(i32, i32), SpawnError> {
    let half = (size / 2).max(1);
    let min = -half;
    let direction = random_direction(rng)?;
    let slots = match direction.axis() {
        Axis::Vertical => arena.width / half,
        Axis::Horizontal => arena.height / half,
    };
    let offset = min + random_natural_in_range(rng, 0, slots.max(0) as u32) as i32 * half;
    Ok(match direction {
        Direction::Up => (offset, arena.height - half),
        Direction::Down => (offset, min),
        Direction::Left => (arena.width - half, offset),
        Direction::Right => (min, offset),
    })
}

#[derive(Clone, Debug)]
pub struct TargetSystem {
    targets: Vec<Target>,
    generator: Interval,
    size: i32,
    max_targets: u32,
    max_active: Option<u32>,
    attempts: u32,
    grace_ms: u64,
    step_ms: u64,
    reroll_min_ms: u64,
    reroll_max_ms: u64,
}

impl TargetSystem {
    pub fn new(config: &GameConfig) -> Self {
        let t = &config.timings;
        Self {
            targets: Vec::new(),
            generator: Interval::stopped(t.target_generate_ms),
            size: config.target_size,
            max_targets: config.max_targets,
            max_active: config.enforce_active_cap.then_some(config.max_active_targets),
            attempts: config.spawn_attempts,
            grace_ms: t.target_grace_ms,
            step_ms: t.wander_step_ms,
            reroll_min_ms: t.wander_reroll_min_ms,
            reroll_max_ms: t.wander_reroll_max_ms,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn live_count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_generating(&self) -> bool {
        self.generator.is_active()
    }

    /// Place a new target on an edge, away from every live target.  The
    /// target starts wandering once its grace period ends.
    pub fn spawn_target(
        &mut self,
        arena: &Arena,
        rng: &mut dyn RandomSource,
        id: EntityId,
        events: &mut Vec<RoundEvent>,
    ) -> Result<EntityId, SpawnError> {
        let mut attempts = 0;
        let rect = loop {
            if attempts >= self.attempts {
                return Err(SpawnError::Saturated { attempts });
            }
            attempts += 1;
            let (x, y) = edge_coordinate(arena, self.size, rng)?;
            let candidate = Rect::square(x, y, self.size);
            if !self.any_overlaps(&candidate) {
                break candidate;
            }
        };

        debug!("target {} spawned at ({}, {})", id.0, rect.x, rect.y);
        self.targets.push(Target {
            id,
            x: rect.x,
            y: rect.y,
            size: self.size,
            wander: None,
            movement_enabled: false,
            grace: Timeout::new(self.grace_ms),
            reroll: Interval::stopped(self.reroll_min_ms),
            step: Interval::stopped(self.step_ms),
        });
        events.push(RoundEvent::Spawned {
            id,
            kind: EntityKind::Target,
            rect,
        });
        Ok(id)
    }

    /// Run the generation scheduler.  Spawns at most one target per firing
    /// and cancels itself once `max_targets` have been spawned this round.
    pub fn advance_generator(
        &mut self,
        dt_ms: u64,
        arena: &Arena,
        rng: &mut dyn RandomSource,
        spawned: &mut u32,
        ids: &mut IdAllocator,
        events: &mut Vec<RoundEvent>,
    ) -> Result<(), SpawnError> {
        for _ in 0..self.generator.advance(dt_ms) {
            if *spawned >= self.max_targets {
                debug!("all {} targets spawned, generator stopped", self.max_targets);
                self.generator.cancel();
                return Ok(());
            }
            if let Some(cap) = self.max_active {
                if self.targets.len() >= cap as usize {
                    continue;
                }
            }
            let id = ids.next_id();
            self.spawn_target(arena, rng, id, events)?;
            *spawned += 1;
        }
        Ok(())
    }

    /// Advance every target's grace, reroll and step timers.
    pub fn advance_wander(
        &mut self,
        dt_ms: u64,
        arena: &Arena,
        rng: &mut dyn RandomSource,
        events: &mut Vec<RoundEvent>,
    ) {
        let (min_ms, max_ms) = (self.reroll_min_ms, self.reroll_max_ms);
        for target in &mut self.targets {
            if target.grace.advance(dt_ms) {
                target.movement_enabled = true;
                roll(target, rng, min_ms, max_ms);
                continue;
            }
            if !target.movement_enabled {
                continue;
            }
            for _ in 0..target.reroll.advance(dt_ms) {
                roll(target, rng, min_ms, max_ms);
            }
            let mut moved = false;
            for _ in 0..target.step.advance(dt_ms) {
                if let Some(pair) = target.wander {
                    for direction in pair {
                        moved |= move_step(arena, target, direction);
                    }
                }
            }
            if moved {
                events.push(RoundEvent::Moved {
                    id: target.id,
                    rect: target.rect(),
                });
            }
        }
    }

    pub fn any_overlaps(&self, rect: &Rect) -> bool {
        self.targets.iter().any(|t| t.rect().overlaps(rect))
    }

    /// Remove and return the first live target overlapping `rect`.
    pub fn take_first_hit(&mut self, rect: &Rect) -> Option<Target> {
        let index = self.targets.iter().position(|t| t.rect().overlaps(rect))?;
        Some(self.targets.remove(index))
    }

    pub fn start(&mut self) {
        self.generator.restart();
    }

    /// Cancel generation and freeze every target in place.
    pub fn stop(&mut self) {
        self.generator.cancel();
        self.stop_wandering();
    }

    pub fn stop_generating(&mut self) {
        self.generator.cancel();
    }

    fn stop_wandering(&mut self) {
        for target in &mut self.targets {
            target.grace.cancel();
            target.reroll.cancel();
            target.step.cancel();
            target.movement_enabled = false;
        }
    }

    pub fn clear(&mut self, events: &mut Vec<RoundEvent>) {
        events.extend(self.targets.drain(..).map(|t| RoundEvent::Removed { id: t.id }));
    }
}
