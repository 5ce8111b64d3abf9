/// Shooter controller: held-direction input, per-tick motion and facing.

use crate::entities::{Controls, Facing, Shooter};
use crate::motion::{move_step, Arena};
use crate::schedule::Interval;

/// Facing for the held directions, or `previous` when the combination is
/// empty or self-cancelling.
pub fn derive_facing(controls: &Controls, previous: Facing) -> Facing {
    Facing::from_held(&controls.held_directions()).unwrap_or(previous)
}

#[derive(Clone, Debug)]
pub struct ShooterController {
    controls: Controls,
    motion: Interval,
}

impl ShooterController {
    pub fn new(period_ms: u64) -> Self {
        Self {
            controls: Controls::default(),
            motion: Interval::stopped(period_ms),
        }
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Record new input and update the shooter's facing.  Returns the new
    /// facing when it changed.
    pub fn set_controls(&mut self, controls: Controls, shooter: &mut Shooter) -> Option<Facing> {
        self.controls = controls;
        let facing = derive_facing(&controls, shooter.facing);
        if facing == shooter.facing {
            return None;
        }
        shooter.facing = facing;
        Some(facing)
    }

    /// One motion tick: every held direction is attempted, in canonical
    /// order, each against its own axis bound.
    pub fn tick(&self, arena: &Arena, shooter: &mut Shooter) -> bool {
        let mut moved = false;
        for direction in self.controls.held_directions() {
            moved |= move_step(arena, shooter, direction);
        }
        moved
    }

    /// Run the motion scheduler for `dt_ms`.  True if the shooter moved.
    pub fn advance(&mut self, dt_ms: u64, arena: &Arena, shooter: &mut Shooter) -> bool {
        let mut moved = false;
        for _ in 0..self.motion.advance(dt_ms) {
            moved |= self.tick(arena, shooter);
        }
        moved
    }

    pub fn start(&mut self) {
        self.controls = Controls::default();
        self.motion.restart();
    }

    pub fn stop(&mut self) {
        self.controls = Controls::default();
        self.motion.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Direction, EntityId};

    fn arena() -> Arena {
        Arena::new(400, 400, 10)
    }

    fn shooter() -> Shooter {
        Shooter {
            id: EntityId(0),
            x: 190,
            y: 190,
            size: 20,
            facing: Facing::default(),
        }
    }

    fn held(directions: &[Direction]) -> Controls {
        let mut c = Controls::default();
        for d in directions {
            c.set(*d, true);
        }
        c
    }

    #[test]
    fn diagonal_hold_moves_both_axes() {
        let mut s = shooter();
        let mut ctl = ShooterController::new(60);
        ctl.start();
        ctl.set_controls(held(&[Direction::Up, Direction::Left]), &mut s);
        assert!(!ctl.advance(50, &arena(), &mut s));
        assert!(ctl.advance(10, &arena(), &mut s));
        assert_eq!((s.x, s.y), (180, 180));
    }

    #[test]
    fn opposite_directions_cancel() {
        let mut s = shooter();
        let mut ctl = ShooterController::new(60);
        ctl.start();
        ctl.set_controls(held(&[Direction::Up, Direction::Down]), &mut s);
        ctl.advance(60, &arena(), &mut s);
        assert_eq!((s.x, s.y), (190, 190));
    }

    #[test]
    fn opposite_pair_only_moves_the_unblocked_one() {
        let mut s = shooter();
        s.y = -10;
        let mut ctl = ShooterController::new(60);
        ctl.start();
        ctl.set_controls(held(&[Direction::Up, Direction::Down]), &mut s);
        ctl.advance(60, &arena(), &mut s);
        // up is refused at the edge, down still applies
        assert_eq!(s.y, 0);
    }

    #[test]
    fn facing_follows_valid_combinations() {
        let mut s = shooter();
        let mut ctl = ShooterController::new(60);
        let changed = ctl.set_controls(held(&[Direction::Down, Direction::Right]), &mut s);
        assert_eq!(changed.map(|f| f.label()), Some("down-right".to_string()));
        assert_eq!(s.facing.directions(), vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn invalid_combinations_keep_previous_facing() {
        let mut s = shooter();
        let mut ctl = ShooterController::new(60);
        ctl.set_controls(held(&[Direction::Left]), &mut s);
        for combo in [
            vec![],
            vec![Direction::Up, Direction::Down],
            vec![Direction::Left, Direction::Right],
            vec![Direction::Up, Direction::Down, Direction::Left],
        ] {
            assert_eq!(ctl.set_controls(held(&combo), &mut s), None);
            assert_eq!(s.facing, Facing::cardinal(Direction::Left));
        }
    }

    #[test]
    fn stopped_controller_does_not_move() {
        let mut s = shooter();
        let mut ctl = ShooterController::new(60);
        ctl.start();
        ctl.set_controls(held(&[Direction::Right]), &mut s);
        ctl.stop();
        assert!(!ctl.advance(600, &arena(), &mut s));
        assert_eq!(s.x, 190);
        assert_eq!(ctl.controls(), Controls::default());
    }
}
