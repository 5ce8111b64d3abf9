/// Bullet subsystem.
///
/// Bullets are fired from the shooter's position along its facing at the
/// time of firing, move on their own timers and are removed once they stop
/// (refused step at the arena edge) or hit a target.

use log::debug;

use crate::config::GameConfig;
use crate::entities::{Bullet, EntityId, EntityKind, IdAllocator, Shooter};
use crate::motion::{move_step, Arena};
use crate::port::RoundEvent;
use crate::schedule::Interval;
use crate::targets::TargetSystem;

#[derive(Clone, Debug)]
pub struct BulletSystem {
    bullets: Vec<Bullet>,
    fire_gate: Interval,
    size: i32,
    move_ms: u64,
}

impl BulletSystem {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            bullets: Vec::new(),
            fire_gate: Interval::stopped(config.timings.fire_ms),
            size: config.bullet_size,
            move_ms: config.timings.bullet_move_ms,
        }
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// New bullet at the shooter's corner, travelling along its current facing.
    pub fn spawn_bullet(&mut self, shooter: &Shooter, id: EntityId, events: &mut Vec<RoundEvent>) {
        let bullet = Bullet {
            id,
            x: shooter.x,
            y: shooter.y,
            size: self.size,
            directions: shooter.facing.directions(),
            moving: true,
            motion: Interval::new(self.move_ms),
        };
        events.push(RoundEvent::Spawned {
            id,
            kind: EntityKind::Bullet,
            rect: bullet.rect(),
        });
        self.bullets.push(bullet);
    }

    /// Fire gate: while `firing` is held, one bullet per gate period.
    /// Returns how many bullets were fired.
    pub fn advance_fire_gate(
        &mut self,
        dt_ms: u64,
        firing: bool,
        shooter: &Shooter,
        ids: &mut IdAllocator,
        events: &mut Vec<RoundEvent>,
    ) -> usize {
        let mut fired = 0;
        for _ in 0..self.fire_gate.advance(dt_ms) {
            if firing {
                self.spawn_bullet(shooter, ids.next_id(), events);
                fired += 1;
            }
        }
        fired
    }

    /// Move every bullet whose timer is due, resolve hits and drop stopped
    /// bullets.  Each destroyed target adds one to `score`.
    pub fn advance_bullets(
        &mut self,
        dt_ms: u64,
        arena: &Arena,
        targets: &mut TargetSystem,
        score: &mut u32,
        events: &mut Vec<RoundEvent>,
    ) {
        for bullet in &mut self.bullets {
            for _ in 0..bullet.motion.advance(dt_ms) {
                tick_bullet(bullet, arena, targets, score, events);
                if !bullet.moving {
                    bullet.motion.cancel();
                    break;
                }
            }
        }
        self.bullets.retain(|b| {
            if !b.moving {
                events.push(RoundEvent::Removed { id: b.id });
            }
            b.moving
        });
    }

    pub fn start(&mut self) {
        self.fire_gate.restart();
    }

    /// Cancel the fire gate and freeze every bullet.
    pub fn stop(&mut self) {
        self.fire_gate.cancel();
        for bullet in &mut self.bullets {
            bullet.motion.cancel();
        }
    }

    pub fn clear(&mut self, events: &mut Vec<RoundEvent>) {
        events.extend(self.bullets.drain(..).map(|b| RoundEvent::Removed { id: b.id }));
    }
}

/// One motion tick.  Directions are tried in order until one is refused;
/// then the first overlapping target, if any, is destroyed.
fn tick_bullet(
    bullet: &mut Bullet,
    arena: &Arena,
    targets: &mut TargetSystem,
    score: &mut u32,
    events: &mut Vec<RoundEvent>,
) {
    let before = bullet.rect();
    for i in 0..bullet.directions.len() {
        let direction = bullet.directions[i];
        if !move_step(arena, bullet, direction) {
            bullet.moving = false;
            break;
        }
    }
    if bullet.rect() != before {
        events.push(RoundEvent::Moved {
            id: bullet.id,
            rect: bullet.rect(),
        });
    }

    if let Some(target) = targets.take_first_hit(&bullet.rect()) {
        *score += 1;
        debug!("bullet {} destroyed target {}, score {}", bullet.id.0, target.id.0, score);
        events.push(RoundEvent::Removed { id: target.id });
        events.push(RoundEvent::ScoreChanged(*score));
        bullet.moving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Direction, Facing};
    use crate::geometry::RandomSource;

    struct Slot(Vec<(usize, u32)>);

    impl RandomSource for Slot {
        fn index(&mut self, _len: usize) -> usize {
            self.0.first().map(|s| s.0).unwrap_or(0)
        }
        fn natural_in_range(&mut self, min: u32, _max: u32) -> u32 {
            if self.0.is_empty() {
                return min;
            }
            self.0.remove(0).1
        }
    }

    fn arena() -> Arena {
        Arena::new(400, 400, 10)
    }

    fn shooter(facing: Facing) -> Shooter {
        Shooter {
            id: EntityId(0),
            x: 190,
            y: 190,
            size: 20,
            facing,
        }
    }

    fn bullets() -> BulletSystem {
        BulletSystem::new(&GameConfig::default())
    }

    #[test]
    fn fire_gate_limits_rate() {
        let mut system = bullets();
        let mut ids = IdAllocator::default();
        let mut events = Vec::new();
        let s = shooter(Facing::default());
        system.start();
        assert_eq!(system.advance_fire_gate(90, true, &s, &mut ids, &mut events), 0);
        assert_eq!(system.advance_fire_gate(10, true, &s, &mut ids, &mut events), 1);
        assert_eq!(system.advance_fire_gate(100, false, &s, &mut ids, &mut events), 0);
        assert_eq!(system.bullets().len(), 1);
    }

    #[test]
    fn directions_are_copied_at_spawn() {
        let mut system = bullets();
        let mut events = Vec::new();
        let mut s = shooter(Facing::from_held(&[Direction::Up, Direction::Right]).unwrap());
        system.spawn_bullet(&s, EntityId(1), &mut events);
        s.facing = Facing::cardinal(Direction::Down);
        assert_eq!(system.bullets()[0].directions, vec![Direction::Up, Direction::Right]);
        assert_eq!((system.bullets()[0].x, system.bullets()[0].y), (190, 190));
    }

    #[test]
    fn diagonal_bullet_moves_on_both_axes() {
        let mut system = bullets();
        let mut targets = TargetSystem::new(&GameConfig::default());
        let mut events = Vec::new();
        let mut score = 0;
        let s = shooter(Facing::from_held(&[Direction::Down, Direction::Left]).unwrap());
        system.spawn_bullet(&s, EntityId(1), &mut events);
        system.advance_bullets(30, &arena(), &mut targets, &mut score, &mut events);
        assert_eq!((system.bullets()[0].x, system.bullets()[0].y), (185, 195));
    }

    #[test]
    fn bullet_is_removed_after_leaving_bounds() {
        let mut system = bullets();
        let mut targets = TargetSystem::new(&GameConfig::default());
        let mut events = Vec::new();
        let mut score = 0;
        let mut s = shooter(Facing::cardinal(Direction::Up));
        s.y = 0;
        system.spawn_bullet(&s, EntityId(1), &mut events);
        // 0 → -5 → -10, then refused
        system.advance_bullets(60, &arena(), &mut targets, &mut score, &mut events);
        assert_eq!(system.bullets()[0].y, -10);
        system.advance_bullets(30, &arena(), &mut targets, &mut score, &mut events);
        assert!(system.bullets().is_empty());
        assert_eq!(events.last(), Some(&RoundEvent::Removed { id: EntityId(1) }));
    }

    #[test]
    fn diagonal_bullet_stops_at_first_refused_axis() {
        let mut system = bullets();
        let mut targets = TargetSystem::new(&GameConfig::default());
        let mut events = Vec::new();
        let mut score = 0;
        let mut s = shooter(Facing::from_held(&[Direction::Up, Direction::Right]).unwrap());
        s.y = -10;
        system.spawn_bullet(&s, EntityId(1), &mut events);
        system.advance_bullets(30, &arena(), &mut targets, &mut score, &mut events);
        // up was refused, so right was never attempted
        assert!(system.bullets().is_empty());
        assert!(!events
            .iter()
            .any(|e| matches!(e, RoundEvent::Moved { id: EntityId(1), .. })));
    }

    #[test]
    fn hit_destroys_target_and_scores() {
        let mut system = bullets();
        let mut targets = TargetSystem::new(&GameConfig::default());
        let mut events = Vec::new();
        let mut score = 0;
        // Left edge target (index 2) at y = -10 + 20 * 10 = 190, x = 390
        let mut rng = Slot(vec![(2, 20)]);
        targets
            .spawn_target(&arena(), &mut rng, EntityId(9), &mut events)
            .unwrap();
        let mut s = shooter(Facing::cardinal(Direction::Right));
        s.x = 380;
        system.spawn_bullet(&s, EntityId(1), &mut events);
        system.advance_bullets(30, &arena(), &mut targets, &mut score, &mut events);
        assert_eq!(score, 1);
        assert_eq!(targets.live_count(), 0);
        assert!(system.bullets().is_empty());
        assert!(events.contains(&RoundEvent::Removed { id: EntityId(9) }));
        assert!(events.contains(&RoundEvent::ScoreChanged(1)));
    }

    #[test]
    fn stopped_bullets_freeze() {
        let mut system = bullets();
        let mut targets = TargetSystem::new(&GameConfig::default());
        let mut events = Vec::new();
        let mut score = 0;
        system.spawn_bullet(&shooter(Facing::default()), EntityId(1), &mut events);
        system.stop();
        system.advance_bullets(300, &arena(), &mut targets, &mut score, &mut events);
        assert_eq!(system.bullets()[0].y, 190);
    }
}
