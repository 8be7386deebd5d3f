// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Source of independent uniform reals in [0, 1).
///
/// Scattering code only ever sees this trait, so a generator can be seeded
/// per path segment and handed in by the caller.
pub trait RandomSource {
    fn next_f32(&mut self) -> Float;
}

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generator for one path segment at one bounce of one iteration.
    /// `iteration` and `depth` are mixed in separate hash rounds, so a large
    /// iteration never spills into the depth bits.
    pub fn for_segment(iteration: u32, index: u32, depth: u32) -> Self {
        let h = hash_u32(hash_u32(iteration) ^ depth) ^ hash_u32(index);
        Self::new(((h as u64) << 32) | index as u64)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
}

impl RandomSource for LcgRng {
    fn next_f32(&mut self) -> Float {
        // 24 bits keep the result exactly representable and below one.
        (self.next_u32() >> 8) as Float * (1.0 / 16777216.0)
    }
}

/// Bob Jenkins' 32-bit integer hash.
pub fn hash_u32(a: u32) -> u32 {
    let mut a = a;
    a = a.wrapping_add(0x7ed55d16).wrapping_add(a << 12);
    a = (a ^ 0xc761c23c) ^ (a >> 19);
    a = a.wrapping_add(0x165667b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2646c) ^ (a << 9);
    a = a.wrapping_add(0xfd7046c5).wrapping_add(a << 3);
    a = (a ^ 0xb55a4f09) ^ (a >> 16);
    a
}

/// Replays a fixed list of values, cycling when exhausted.
#[cfg(test)]
pub struct SequenceRng {
    values: Vec<Float>,
    next: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub fn new(values: &[Float]) -> Self {
        Self { values: values.to_vec(), next: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
impl RandomSource for SequenceRng {
    fn next_f32(&mut self) -> Float {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_f32_in_unit_interval() {
        let mut rng = LcgRng::new(42);
        for _ in 0..100000 {
            let v = rng.next_f32();
            assert!(v >= 0.0 && v < 1.0);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = LcgRng::for_segment(3, 17, 2);
        let mut b = LcgRng::for_segment(3, 17, 2);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_segments_get_distinct_streams() {
        let mut a = LcgRng::for_segment(0, 0, 0);
        let mut b = LcgRng::for_segment(0, 1, 0);
        let mut c = LcgRng::for_segment(0, 0, 1);
        let sa: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let sb: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        let sc: Vec<u32> = (0..4).map(|_| c.next_u32()).collect();
        assert_ne!(sa, sb);
        assert_ne!(sa, sc);
    }

    #[test]
    fn test_large_iterations_do_not_alias_depth() {
        let stream = |iteration: u32, depth: u32| {
            let mut rng = LcgRng::for_segment(iteration, 5, depth);
            (0..4).map(|_| rng.next_u32()).collect::<Vec<u32>>()
        };
        assert_ne!(stream(1 << 22, 0), stream(0, 1));
        assert_ne!(stream(1, 0), stream(0, 1));
        assert_ne!(stream(u32::MAX, 0), stream(0, 511));
    }

    #[test]
    fn test_mean_is_one_half() {
        let mut rng = LcgRng::new(7);
        let n = 100000;
        let sum: f64 = (0..n).map(|_| rng.next_f32() as f64).sum();
        assert!((sum / n as f64 - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_sequence_rng_cycles() {
        let mut rng = SequenceRng::new(&[0.1, 0.9]);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.next_f32(), 0.9);
        assert_eq!(rng.next_f32(), 0.1);
        assert_eq!(rng.consumed(), 3);
    }
}
