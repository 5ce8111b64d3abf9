/// Bounding boxes, overlap testing and the random-value helpers used by
/// spawning and wandering.
///
/// All randomness goes through `RandomSource` so callers control
/// determinism (a seeded `StdRng` in play, a scripted source in tests).

use rand::Rng;

// ── Bounding boxes ───────────────────────────────────────────────────────────

/// Axis-aligned box in arena pixels.  `x`/`y` are the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn square(x: i32, y: i32, size: i32) -> Self {
        Self::new(x, y, size, size)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        overlaps(self, other)
    }
}

/// Strict overlap: boxes that only share an edge do not collide.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

// ── Randomness ───────────────────────────────────────────────────────────────

pub trait RandomSource {
    /// Index in `0..len`.  Implementations must not be called with `len == 0`.
    fn index(&mut self, len: usize) -> usize;

    /// Integer in `min..max` (max exclusive).  Callers guarantee `min < max`.
    fn natural_in_range(&mut self, min: u32, max: u32) -> u32;
}

/// Adapts any `rand::Rng` to `RandomSource`.
#[derive(Clone, Debug)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    fn natural_in_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.gen_range(min..max)
    }
}

/// Uniformly chosen element of `values`.  An index the source returns out
/// of range comes back as the error.
pub fn random_value_from<T: Copy>(rng: &mut dyn RandomSource, values: &[T]) -> Result<T, usize> {
    if values.is_empty() {
        return Err(0);
    }
    let index = rng.index(values.len());
    values.get(index).copied().ok_or(index)
}

/// Natural number in `min..max`; collapses to `min` for an empty range.
pub fn random_natural_in_range(rng: &mut dyn RandomSource, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.natural_in_range(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn overlapping_boxes_collide() {
        let a = Rect::square(0, 0, 20);
        let b = Rect::square(10, 10, 20);
        assert!(overlaps(&a, &b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::square(0, 0, 20);
        assert!(!overlaps(&a, &Rect::square(20, 0, 20)));
        assert!(!overlaps(&a, &Rect::square(0, 20, 20)));
    }

    #[test]
    fn disjoint_on_one_axis_is_enough() {
        let a = Rect::square(0, 0, 20);
        assert!(!overlaps(&a, &Rect::square(5, 40, 20)));
    }

    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn index(&mut self, _len: usize) -> usize {
            self.0
        }
        fn natural_in_range(&mut self, min: u32, _max: u32) -> u32 {
            min
        }
    }

    #[test]
    fn value_from_picks_by_index() {
        assert_eq!(random_value_from(&mut Fixed(2), &['a', 'b', 'c']), Ok('c'));
        assert_eq!(random_value_from(&mut Fixed(5), &['a', 'b', 'c']), Err(5));
        assert_eq!(random_value_from::<char>(&mut Fixed(0), &[]), Err(0));
    }

    #[test]
    fn value_from_seeded_stays_in_slice() {
        let mut rng = RngSource(StdRng::seed_from_u64(3));
        for _ in 0..100 {
            assert!(random_value_from(&mut rng, &[1, 2, 3]).is_ok());
        }
    }

    #[test]
    fn natural_range_stays_in_bounds() {
        let mut rng = RngSource(StdRng::seed_from_u64(7));
        for _ in 0..200 {
            let n = random_natural_in_range(&mut rng, 1000, 2000);
            assert!((1000..2000).contains(&n));
        }
        assert_eq!(random_natural_in_range(&mut rng, 5, 5), 5);
    }
}
