/// All game entity types: pure data, with only the accessors the
/// subsystems share.

use crate::geometry::Rect;
use crate::schedule::{Interval, Timeout};

// ── Directions ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    /// Canonical order.  Held directions are always processed and joined
    /// in this order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Signed unit step along the axis (screen coordinates, y grows down).
    pub fn sign(self) -> i32 {
        match self {
            Direction::Up | Direction::Left => -1,
            Direction::Down | Direction::Right => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

// ── Facing ───────────────────────────────────────────────────────────────────

/// Firing direction of the shooter: a cardinal or a diagonal.
/// Never holds two directions on the same axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Facing {
    first: Direction,
    second: Option<Direction>,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::cardinal(Direction::Up)
    }
}

impl Facing {
    pub const fn cardinal(direction: Direction) -> Self {
        Self {
            first: direction,
            second: None,
        }
    }

    /// Join held directions into a facing.  `None` for an empty set or any
    /// set containing both directions of one axis.
    pub fn from_held(held: &[Direction]) -> Option<Facing> {
        let ordered: Vec<Direction> = Direction::ALL
            .iter()
            .copied()
            .filter(|d| held.contains(d))
            .collect();
        match ordered.as_slice() {
            [single] => Some(Facing::cardinal(*single)),
            [a, b] if a.axis() != b.axis() => Some(Facing {
                first: *a,
                second: Some(*b),
            }),
            _ => None,
        }
    }

    /// Axis components in canonical order (1 for a cardinal, 2 for a diagonal).
    pub fn directions(&self) -> Vec<Direction> {
        std::iter::once(self.first).chain(self.second).collect()
    }

    pub fn is_diagonal(&self) -> bool {
        self.second.is_some()
    }

    /// Hyphen-joined label such as `up` or `down-left`.
    pub fn label(&self) -> String {
        self.directions()
            .iter()
            .map(|d| d.label())
            .collect::<Vec<_>>()
            .join("-")
    }
}

// ── Input ────────────────────────────────────────────────────────────────────

/// Snapshot of the held directional and fire controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl Controls {
    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    /// Held directions in canonical order.
    pub fn held_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(|d| self.is_held(*d))
            .collect()
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// Handle the rendering layer uses for an entity's visual proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Shooter,
    Bullet,
    Target,
}

#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

// ── Shooter ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Shooter {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub facing: Facing,
}

impl Shooter {
    pub fn rect(&self) -> Rect {
        Rect::square(self.x, self.y, self.size)
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Bullet {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    /// Copied from the shooter's facing at creation; never changes.
    pub directions: Vec<Direction>,
    /// Cleared once a step fails or the bullet hits a target.
    pub moving: bool,
    pub motion: Interval,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::square(self.x, self.y, self.size)
    }
}

// ── Targets ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Target {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    /// Current wander pair; `None` until the grace period ends.
    pub wander: Option<[Direction; 2]>,
    pub movement_enabled: bool,
    pub grace: Timeout,
    pub reroll: Interval,
    pub step: Interval,
}

impl Target {
    pub fn rect(&self) -> Rect {
        Rect::square(self.x, self.y, self.size)
    }
}

// ── Round state ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Win,
    Lose,
}

impl RoundOutcome {
    pub fn message(self) -> &'static str {
        match self {
            RoundOutcome::Win => "You win",
            RoundOutcome::Lose => "You lose",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Idle,
    Running,
    Ended(RoundOutcome),
}
