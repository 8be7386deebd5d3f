// Copyright @yucwang 2026

use crate::core::rng::RandomSource;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_stratified };

/// Cosine-weighted hemisphere sampling around a surface normal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HemisphereSampler {
    /// `cos(theta) = sqrt(u)`, `phi = 2 pi v`.
    Naive,
    /// Tent-remapped inputs; less clumping near the pole.
    Stratified,
}

impl Default for HemisphereSampler {
    fn default() -> Self {
        HemisphereSampler::Stratified
    }
}

impl HemisphereSampler {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "naive" => Some(HemisphereSampler::Naive),
            "stratified" => Some(HemisphereSampler::Stratified),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HemisphereSampler::Naive => "naive",
            HemisphereSampler::Stratified => "stratified",
        }
    }

    /// `normal` must be unit length; `u` and `v` are uniform in [0, 1).
    pub fn sample(&self, normal: &Vector3f, u: Float, v: Float) -> Vector3f {
        debug_assert!((normal.norm() - 1.0).abs() < 1e-3);
        let uv = Vector2f::new(u, v);
        let local = match self {
            HemisphereSampler::Naive => sample_cosine_hemisphere(&uv),
            HemisphereSampler::Stratified => sample_cosine_hemisphere_stratified(&uv),
        };

        Frame::from_normal(normal).from_local(local)
    }

    pub fn sample_with<R: RandomSource + ?Sized>(&self, normal: &Vector3f, rng: &mut R) -> Vector3f {
        let u = rng.next_f32();
        let v = rng.next_f32();
        self.sample(normal, u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    const SAMPLERS: [HemisphereSampler; 2] = [HemisphereSampler::Naive, HemisphereSampler::Stratified];

    fn normals() -> Vec<Vector3f> {
        vec![
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, -1.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(1.0, 1.0, 1.0).normalize(),
            Vector3f::new(-0.3, 0.8, -0.52).normalize(),
        ]
    }

    #[test]
    fn test_samples_are_unit_and_in_hemisphere() {
        let mut rng = LcgRng::new(1234);
        for sampler in SAMPLERS.iter() {
            for n in normals() {
                for _ in 0..2000 {
                    let d = sampler.sample_with(&n, &mut rng);
                    assert!((d.norm() - 1.0).abs() < 1e-5, "{:?} |d| = {}", sampler, d.norm());
                    assert!(d.dot(&n) >= -1e-6, "{:?} below horizon: {}", sampler, d.dot(&n));
                }
            }
        }
    }

    #[test]
    fn test_grid_corners_stay_valid() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let corners = [0.0, 0.25, 0.5, 0.75, 0.9999999];
        for sampler in SAMPLERS.iter() {
            for &u in corners.iter() {
                for &v in corners.iter() {
                    let d = sampler.sample(&n, u, v);
                    assert!(d.iter().all(|c| c.is_finite()));
                    assert!((d.norm() - 1.0).abs() < 1e-5);
                    assert!(d.z >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_mean_cosine_converges_to_two_thirds() {
        let n = Vector3f::new(0.2, 0.5, -0.7).normalize();
        let count = 200000;
        for sampler in SAMPLERS.iter() {
            let mut rng = LcgRng::new(99);
            let mut sum = 0.0f64;
            for _ in 0..count {
                sum += sampler.sample_with(&n, &mut rng).dot(&n) as f64;
            }
            let mean = sum / count as f64;
            assert!((mean - 2.0 / 3.0).abs() < 0.01, "{:?} mean cosine {}", sampler, mean);
        }
    }

    #[test]
    fn test_azimuth_is_not_biased() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let count = 100000;
        for sampler in SAMPLERS.iter() {
            let mut rng = LcgRng::new(5);
            let mut sum = Vector3f::zeros();
            for _ in 0..count {
                sum += sampler.sample_with(&n, &mut rng);
            }
            let mean = sum / count as Float;
            assert!(mean.x.abs() < 0.01 && mean.y.abs() < 0.01, "{:?} mean {:?}", sampler, mean);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for sampler in SAMPLERS.iter() {
            assert_eq!(HemisphereSampler::from_name(sampler.name()), Some(*sampler));
        }
        assert_eq!(HemisphereSampler::from_name("uniform"), None);
    }
}
