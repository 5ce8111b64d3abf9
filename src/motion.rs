/// The single movement rule shared by the shooter, bullets and targets.
///
/// An entity moves half its own size per step, and only if the step keeps
/// it within `[-tolerance, extent - size + tolerance]` on that axis.

use crate::entities::{Axis, Bullet, Direction, Shooter, Target};
use crate::geometry::Rect;

/// Fixed play area, read once when a round starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
    /// How far an entity may overshoot an edge.
    pub tolerance: i32,
}

impl Arena {
    pub fn new(width: i32, height: i32, tolerance: i32) -> Self {
        Self {
            width,
            height,
            tolerance,
        }
    }

    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Top-left corner that centres a square of `size`.
    pub fn centre_for(&self, size: i32) -> (i32, i32) {
        ((self.width - size) / 2, (self.height - size) / 2)
    }
}

pub trait Movable {
    fn rect(&self) -> Rect;
    fn shift(&mut self, axis: Axis, delta: i32);
}

fn offset_and_size(rect: &Rect, axis: Axis) -> (i32, i32) {
    match axis {
        Axis::Horizontal => (rect.x, rect.width),
        Axis::Vertical => (rect.y, rect.height),
    }
}

pub fn step_distance(size: i32) -> i32 {
    size / 2
}

pub fn can_move<M: Movable + ?Sized>(
    arena: &Arena,
    entity: &M,
    direction: Direction,
    tolerance: i32,
) -> bool {
    let axis = direction.axis();
    let (offset, size) = offset_and_size(&entity.rect(), axis);
    let next = offset + direction.sign() * step_distance(size);
    next >= -tolerance && next <= arena.extent(axis) - size + tolerance
}

/// Apply one step if allowed.  A refused step leaves the entity untouched.
pub fn move_step<M: Movable + ?Sized>(arena: &Arena, entity: &mut M, direction: Direction) -> bool {
    if !can_move(arena, entity, direction, arena.tolerance) {
        return false;
    }
    let axis = direction.axis();
    let (_, size) = offset_and_size(&entity.rect(), axis);
    entity.shift(axis, direction.sign() * step_distance(size));
    true
}

macro_rules! impl_movable {
    ($($ty:ty),*) => {$(
        impl Movable for $ty {
            fn rect(&self) -> Rect {
                <$ty>::rect(self)
            }

            fn shift(&mut self, axis: Axis, delta: i32) {
                match axis {
                    Axis::Horizontal => self.x += delta,
                    Axis::Vertical => self.y += delta,
                }
            }
        }
    )*};
}

impl_movable!(Shooter, Bullet, Target);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityId, Facing};
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena::new(400, 400, 10)
    }

    fn shooter_at(x: i32, y: i32) -> Shooter {
        Shooter {
            id: EntityId(0),
            x,
            y,
            size: 20,
            facing: Facing::default(),
        }
    }

    #[test]
    fn step_is_half_the_size() {
        let mut s = shooter_at(190, 190);
        assert!(move_step(&arena(), &mut s, Direction::Up));
        assert_eq!((s.x, s.y), (190, 180));
        assert!(move_step(&arena(), &mut s, Direction::Right));
        assert_eq!((s.x, s.y), (200, 180));
    }

    #[test]
    fn may_overshoot_by_tolerance() {
        let mut s = shooter_at(0, 0);
        assert!(move_step(&arena(), &mut s, Direction::Left));
        assert_eq!(s.x, -10);
        assert!(!move_step(&arena(), &mut s, Direction::Left));
        assert_eq!(s.x, -10);
    }

    #[test]
    fn far_edge_uses_extent_minus_size() {
        // 400 - 20 + 10 = 390 is the last allowed offset
        let mut s = shooter_at(380, 370);
        assert!(move_step(&arena(), &mut s, Direction::Right));
        assert_eq!(s.x, 390);
        assert!(!can_move(&arena(), &s, Direction::Right, 10));
        assert!(move_step(&arena(), &mut s, Direction::Down));
        assert_eq!(s.y, 380);
    }

    #[test]
    fn tolerance_parameter_is_respected() {
        let s = shooter_at(0, 0);
        assert!(!can_move(&arena(), &s, Direction::Up, 0));
        assert!(can_move(&arena(), &s, Direction::Up, 10));
    }

    #[test]
    fn centre_for_square() {
        assert_eq!(arena().centre_for(20), (190, 190));
    }

    proptest! {
        #[test]
        fn blocked_step_leaves_entity_unchanged(
            x in -10i32..=390,
            y in -10i32..=390,
            d in 0usize..4,
        ) {
            let direction = Direction::ALL[d];
            let mut s = shooter_at(x, y);
            let allowed = can_move(&arena(), &s, direction, arena().tolerance);
            let moved = move_step(&arena(), &mut s, direction);
            prop_assert_eq!(allowed, moved);
            if !moved {
                prop_assert_eq!((s.x, s.y), (x, y));
            } else {
                prop_assert!(s.x >= -10 && s.x <= 390 && s.y >= -10 && s.y <= 390);
            }
        }
    }
}
