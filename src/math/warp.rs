// Copyright @yucwang 2023

use super::constants::{ INV_PI, TWO_PI, Float, Vector2f, Vector3f };

/// Tent remapping of a canonical sample, folded back into [0, 1).
///
/// The two branches map [0, 0.5) onto [-0.5, 0.5) and [0.5, 1) onto
/// [0.5, 1.5). Folding the result modulo one turns the triangular density
/// back into a uniform one, so the warps below keep their target pdf while
/// neighbouring inputs stay neighbours.
pub fn remap_tent(x: Float) -> Float {
    let y = if x < 0.5 {
        -0.5 + (2.0 * x).sqrt()
    } else {
        1.5 - (2.0 - 2.0 * x).sqrt()
    };

    let folded = y - y.floor();
    // Tiny negative `y` can round up to exactly one.
    if folded >= 1.0 { 0.0 } else { folded }
}

/// Cosine-weighted direction around +z from `(cos^2 theta, phi / 2pi)`.
fn cosine_hemisphere_from(t: Float, s: Float) -> Vector3f {
    let cos_theta = t.max(0.0).sqrt();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (sin_phi, cos_phi) = (s * TWO_PI).sin_cos();

    Vector3f::new(cos_phi * sin_theta, sin_phi * sin_theta, cos_theta)
}

/// Plain mapping: `u.x` drives the polar angle and `u.y` the azimuth.
pub fn sample_cosine_hemisphere(u: &Vector2f) -> Vector3f {
    cosine_hemisphere_from(u.x, u.y)
}

/// Stratified mapping: both coordinates go through `remap_tent` first,
/// the first one driving the azimuth and the second the polar angle.
pub fn sample_cosine_hemisphere_stratified(u: &Vector2f) -> Vector3f {
    let s = remap_tent(u.x);
    let t = remap_tent(u.y);

    cosine_hemisphere_from(t, s)
}

pub fn sample_cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta.max(0.0) * INV_PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_tent_range() {
        for i in 0..1000 {
            let x = i as Float / 1000.0;
            let y = remap_tent(x);
            assert!(y >= 0.0 && y < 1.0, "remap_tent({}) = {}", x, y);
        }
    }

    #[test]
    fn test_remap_tent_fixed_points() {
        assert!((remap_tent(0.5) - 0.5).abs() < 1e-6);
        // -0.5 folds to 0.5 as well.
        assert!((remap_tent(0.0) - 0.5).abs() < 1e-6);
        assert!((remap_tent(0.125) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_remap_tent_preserves_uniformity() {
        let n = 100000;
        let bins = 10;
        let mut counts = vec![0usize; bins];
        for i in 0..n {
            let x = (i as Float + 0.5) / n as Float;
            let y = remap_tent(x);
            counts[((y * bins as Float) as usize).min(bins - 1)] += 1;
        }
        for c in counts {
            let frac = c as Float / n as Float;
            assert!((frac - 0.1).abs() < 0.005, "bin fraction {}", frac);
        }
    }

    #[test]
    fn test_cosine_hemisphere_pole() {
        let d = sample_cosine_hemisphere(&Vector2f::new(1.0, 0.0));
        assert!((d - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        let d = sample_cosine_hemisphere(&Vector2f::new(0.0, 0.25));
        assert!((d - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_pdf_is_zero_below_horizon() {
        assert_eq!(sample_cosine_hemisphere_pdf(-0.5), 0.0);
        assert!((sample_cosine_hemisphere_pdf(1.0) - INV_PI).abs() < 1e-6);
    }
}
