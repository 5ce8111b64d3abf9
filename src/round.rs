/// Round controller.
///
/// Owns the shooter, both entity subsystems and the per-round counters, and
/// drives every periodic task from one logical thread:
///
/// ```text
/// Idle ──start──▶ Running ──score ≥ max──▶ Ended(Win)
///                    │
///                    └──target touches shooter──▶ Ended(Lose)
/// Ended ──restart──▶ Idle ──▶ Running (same reset path)
/// ```
///
/// Termination is polled on its own period rather than checked from the
/// bullet/target updates, so a lose/win is detected at most one poll period
/// late.

use log::{error, info, warn};

use crate::bullets::BulletSystem;
use crate::config::{GameConfig, BASE_STEP_MS};
use crate::entities::{
    Bullet, Controls, EntityKind, Facing, IdAllocator, RoundOutcome, RoundStatus, Shooter, Target,
};
use crate::error::{RoundError, SpawnError};
use crate::geometry::RandomSource;
use crate::motion::Arena;
use crate::port::RoundEvent;
use crate::schedule::Interval;
use crate::shooter::ShooterController;
use crate::targets::TargetSystem;

pub struct Round {
    config: GameConfig,
    arena: Arena,
    status: RoundStatus,
    seconds: u64,
    score: u32,
    targets_spawned: u32,
    shooter: Shooter,
    controller: ShooterController,
    bullets: BulletSystem,
    targets: TargetSystem,
    clock: Interval,
    poll: Interval,
    ids: IdAllocator,
    /// Time not yet consumed by a whole base step.
    pending_ms: u64,
    listening: bool,
    events: Vec<RoundEvent>,
}

impl Round {
    /// An idle round.  The shooter proxy is announced immediately.
    pub fn new(config: GameConfig) -> Self {
        let arena = config.arena();
        let mut ids = IdAllocator::default();
        let (x, y) = arena.centre_for(config.shooter_size);
        let shooter = Shooter {
            id: ids.next_id(),
            x,
            y,
            size: config.shooter_size,
            facing: Facing::default(),
        };
        let events = vec![
            RoundEvent::Spawned {
                id: shooter.id,
                kind: EntityKind::Shooter,
                rect: shooter.rect(),
            },
            RoundEvent::FacingChanged(shooter.facing),
        ];
        let t = &config.timings;
        Self {
            controller: ShooterController::new(t.shooter_move_ms),
            bullets: BulletSystem::new(&config),
            targets: TargetSystem::new(&config),
            clock: Interval::stopped(t.clock_ms),
            poll: Interval::stopped(t.termination_poll_ms),
            arena,
            status: RoundStatus::Idle,
            seconds: 0,
            score: 0,
            targets_spawned: 0,
            shooter,
            ids,
            pending_ms: 0,
            listening: false,
            events,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == RoundStatus::Running
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn targets_spawned(&self) -> u32 {
        self.targets_spawned
    }

    pub fn shooter(&self) -> &Shooter {
        &self.shooter
    }

    pub fn bullets(&self) -> &[Bullet] {
        self.bullets.bullets()
    }

    pub fn targets(&self) -> &[Target] {
        self.targets.targets()
    }

    pub fn controls(&self) -> Controls {
        self.controller.controls()
    }

    /// False once every target has been spawned or the arena is saturated.
    pub fn is_generating(&self) -> bool {
        self.targets.is_generating()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Events produced since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a round in `arena`.  Legal from `Idle` and `Ended`; everything
    /// from the previous round is cleared first.
    pub fn start(&mut self, arena: Arena) -> Result<(), RoundError> {
        if self.is_running() {
            warn!("start ignored: round already running");
            return Err(RoundError::AlreadyRunning);
        }
        self.arena = arena;
        self.reset();

        self.controller.start();
        self.bullets.start();
        self.targets.start();
        self.clock.restart();
        self.poll.restart();
        self.status = RoundStatus::Running;
        self.listening = true;
        self.events.push(RoundEvent::ListeningStarted);
        info!(
            "round started in {}x{} arena, {} targets to clear",
            arena.width, arena.height, self.config.max_targets
        );
        Ok(())
    }

    /// `Ended → Idle → Running`.  From `Idle` this is the same as `start`.
    pub fn restart(&mut self, arena: Arena) -> Result<(), RoundError> {
        if let RoundStatus::Ended(_) = self.status {
            self.status = RoundStatus::Idle;
        }
        self.start(arena)
    }

    fn reset(&mut self) {
        self.seconds = 0;
        self.score = 0;
        self.targets_spawned = 0;
        self.pending_ms = 0;
        self.controller.stop();
        self.bullets.clear(&mut self.events);
        self.targets.clear(&mut self.events);

        let (x, y) = self.arena.centre_for(self.shooter.size);
        self.shooter.x = x;
        self.shooter.y = y;
        self.shooter.facing = Facing::default();
        self.events.extend([
            RoundEvent::Moved {
                id: self.shooter.id,
                rect: self.shooter.rect(),
            },
            RoundEvent::FacingChanged(self.shooter.facing),
            RoundEvent::ScoreChanged(0),
            RoundEvent::ClockChanged(0),
        ]);
    }

    /// Feed the currently held controls.  Ignored while not listening.
    pub fn set_controls(&mut self, controls: Controls) {
        if !self.listening {
            return;
        }
        if let Some(facing) = self.controller.set_controls(controls, &mut self.shooter) {
            self.events.push(RoundEvent::FacingChanged(facing));
        }
    }

    /// Advance the round clock by `elapsed_ms`, in whole base steps.  No-op
    /// unless running.  At most `max_catch_up_ms` is simulated per call; the
    /// rest is dropped.
    pub fn advance(&mut self, elapsed_ms: u64, rng: &mut dyn RandomSource) {
        if !self.is_running() {
            self.pending_ms = 0;
            return;
        }
        self.pending_ms = self
            .pending_ms
            .saturating_add(elapsed_ms)
            .min(self.config.max_catch_up_ms);
        while self.pending_ms >= BASE_STEP_MS && self.is_running() {
            self.pending_ms -= BASE_STEP_MS;
            self.step(BASE_STEP_MS, rng);
        }
        if !self.is_running() {
            self.pending_ms = 0;
        }
    }

    fn step(&mut self, dt: u64, rng: &mut dyn RandomSource) {
        let arena = self.arena;

        if self.controller.advance(dt, &arena, &mut self.shooter) {
            self.events.push(RoundEvent::Moved {
                id: self.shooter.id,
                rect: self.shooter.rect(),
            });
        }

        // existing entities move before this step's spawns, so a new bullet
        // or target starts its first period on the next step
        self.bullets
            .advance_bullets(dt, &arena, &mut self.targets, &mut self.score, &mut self.events);
        let firing = self.controller.controls().fire;
        self.bullets
            .advance_fire_gate(dt, firing, &self.shooter, &mut self.ids, &mut self.events);

        self.targets.advance_wander(dt, &arena, rng, &mut self.events);
        match self.targets.advance_generator(
            dt,
            &arena,
            rng,
            &mut self.targets_spawned,
            &mut self.ids,
            &mut self.events,
        ) {
            Ok(()) => {}
            Err(e @ SpawnError::Saturated { .. }) => {
                warn!("{e}; no more targets this round");
                self.targets.stop_generating();
            }
            Err(e @ SpawnError::InvalidDirection { .. }) => {
                error!("target spawn aborted: {e}");
            }
        }

        for _ in 0..self.clock.advance(dt) {
            self.seconds += 1;
            self.events.push(RoundEvent::ClockChanged(self.seconds));
        }

        if self.poll.advance(dt) > 0 {
            if let Some(outcome) = self.check_termination() {
                self.end(outcome);
            }
        }
    }

    /// Win takes precedence when both conditions hold at the same poll.
    pub fn check_termination(&self) -> Option<RoundOutcome> {
        if self.score >= self.config.max_targets {
            return Some(RoundOutcome::Win);
        }
        if self.targets.any_overlaps(&self.shooter.rect()) {
            return Some(RoundOutcome::Lose);
        }
        None
    }

    fn end(&mut self, outcome: RoundOutcome) {
        if !self.is_running() {
            return;
        }
        self.status = RoundStatus::Ended(outcome);
        self.controller.stop();
        self.bullets.stop();
        self.targets.stop();
        self.clock.cancel();
        self.poll.cancel();
        self.listening = false;
        self.events.push(RoundEvent::ListeningStopped);
        self.events.push(RoundEvent::Ended(outcome));
        info!(
            "round ended: {:?} with score {} after {}s",
            outcome, self.score, self.seconds
        );
    }
}
