//! Uniform sampling helpers over a shared `RngCore`

use rand::{Rng, RngCore};

/// Returns a float in `[min, max)`; equal bounds still consume one draw.
/// Reversed bounds sample `(max, min]` rather than panicking.
pub fn uniform_f32(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// Returns an integer in `[min, max)` (bounds reordered), or `min` without
/// touching the RNG when the range is degenerate.
pub fn uniform_i32(rng: &mut dyn RngCore, min: i32, max: i32) -> i32 {
    if min == max {
        return min;
    }
    let (lo, hi) = if min < max { (min, max) } else { (max, min) };
    rng.random_range(lo..hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_f32_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = uniform_f32(&mut rng, 2.0, 10.0);
            assert!((2.0..10.0).contains(&v));
        }
    }

    #[test]
    fn uniform_i32_degenerate_skips_rng() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(uniform_i32(&mut a, 45, 45), 45);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn uniform_i32_reversed_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let v = uniform_i32(&mut rng, 90, 10);
            assert!((10..90).contains(&v));
        }
    }
}
