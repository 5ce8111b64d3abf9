use arena_shooter::entities::*;

#[test]
fn direction_axes_and_signs() {
    assert_eq!(Direction::Up.axis(), Axis::Vertical);
    assert_eq!(Direction::Down.axis(), Axis::Vertical);
    assert_eq!(Direction::Left.axis(), Axis::Horizontal);
    assert_eq!(Direction::Right.axis(), Axis::Horizontal);
    assert_eq!(Direction::Up.sign(), -1);
    assert_eq!(Direction::Left.sign(), -1);
    assert_eq!(Direction::Down.sign(), 1);
    assert_eq!(Direction::Right.sign(), 1);
}

#[test]
fn facing_joins_in_canonical_order() {
    // order of the input does not matter, vertical comes first
    let f = Facing::from_held(&[Direction::Right, Direction::Down]).unwrap();
    assert_eq!(f.label(), "down-right");
    assert!(f.is_diagonal());
    assert_eq!(f.directions(), vec![Direction::Down, Direction::Right]);

    let f = Facing::from_held(&[Direction::Left]).unwrap();
    assert_eq!(f.label(), "left");
    assert!(!f.is_diagonal());
}

#[test]
fn self_cancelling_facings_are_rejected() {
    assert_eq!(Facing::from_held(&[]), None);
    assert_eq!(Facing::from_held(&[Direction::Up, Direction::Down]), None);
    assert_eq!(Facing::from_held(&[Direction::Right, Direction::Left]), None);
    assert_eq!(
        Facing::from_held(&[Direction::Up, Direction::Left, Direction::Right]),
        None
    );
    assert_eq!(Facing::from_held(&Direction::ALL), None);
}

#[test]
fn default_facing_is_up() {
    assert_eq!(Facing::default(), Facing::cardinal(Direction::Up));
}

#[test]
fn controls_report_held_directions_in_order() {
    let mut c = Controls::default();
    c.set(Direction::Right, true);
    c.set(Direction::Up, true);
    c.fire = true;
    assert_eq!(c.held_directions(), vec![Direction::Up, Direction::Right]);
    c.set(Direction::Up, false);
    assert!(!c.is_held(Direction::Up));
    assert_eq!(c.held_directions(), vec![Direction::Right]);
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut ids = IdAllocator::default();
    let a = ids.next_id();
    let b = ids.next_id();
    assert_ne!(a, b);
    assert!(a < b);
}

#[test]
fn outcome_messages() {
    assert_eq!(RoundOutcome::Win.message(), "You win");
    assert_eq!(RoundOutcome::Lose.message(), "You lose");
    assert_ne!(RoundStatus::Ended(RoundOutcome::Win), RoundStatus::Running);
}
