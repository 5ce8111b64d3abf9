/// Boundary between the simulation and whatever draws it.
///
/// The round emits `RoundEvent`s; `present` replays them onto a
/// `RenderPort`.  The port also answers which controls are held.

use crate::entities::{Controls, EntityId, EntityKind, Facing, RoundOutcome};
use crate::geometry::Rect;

pub const START_MESSAGE: &str = "Press Start to play";
pub const START_LABEL: &str = "Start";
pub const RESTART_LABEL: &str = "Restart";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundEvent {
    Spawned { id: EntityId, kind: EntityKind, rect: Rect },
    Moved { id: EntityId, rect: Rect },
    Removed { id: EntityId },
    FacingChanged(Facing),
    ScoreChanged(u32),
    ClockChanged(u64),
    Ended(RoundOutcome),
    ListeningStarted,
    ListeningStopped,
}

pub trait RenderPort {
    /// Arena size in pixels, read once per round.
    fn arena_size(&self) -> (i32, i32);

    fn create_proxy(&mut self, id: EntityId, kind: EntityKind, rect: Rect);
    fn move_proxy(&mut self, id: EntityId, rect: Rect);
    fn destroy_proxy(&mut self, id: EntityId);
    fn set_facing(&mut self, facing: Facing);

    /// Debounced state of the directional and fire controls.
    fn held_controls(&self) -> Controls;

    fn set_score(&mut self, text: &str);
    fn set_clock(&mut self, text: &str);
    fn set_result(&mut self, message: &str, control_label: &str);

    fn start_listening(&mut self);
    fn stop_listening(&mut self);
}

pub fn present<P, I>(port: &mut P, events: I)
where
    P: RenderPort + ?Sized,
    I: IntoIterator<Item = RoundEvent>,
{
    for event in events {
        match event {
            RoundEvent::Spawned { id, kind, rect } => port.create_proxy(id, kind, rect),
            RoundEvent::Moved { id, rect } => port.move_proxy(id, rect),
            RoundEvent::Removed { id } => port.destroy_proxy(id),
            RoundEvent::FacingChanged(facing) => port.set_facing(facing),
            RoundEvent::ScoreChanged(score) => port.set_score(&format_score(score)),
            RoundEvent::ClockChanged(seconds) => port.set_clock(&format_clock(seconds)),
            RoundEvent::Ended(outcome) => port.set_result(outcome.message(), RESTART_LABEL),
            RoundEvent::ListeningStarted => port.start_listening(),
            RoundEvent::ListeningStopped => port.stop_listening(),
        }
    }
}

/// Zero-padded to three digits.
pub fn format_score(score: u32) -> String {
    format!("{score:03}")
}

/// `HH:MM:SS`, wrapping at 24 hours like a wall clock.
pub fn format_clock(seconds: u64) -> String {
    let h = (seconds / 3600) % 24;
    let m = (seconds / 60) % 60;
    let s = seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
