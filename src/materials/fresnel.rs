// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };

/// Mirror `d` about `n`. Both point the usual way: `d` towards the surface,
/// `n` away from it.
pub fn reflect(d: &Vector3f, n: &Vector3f) -> Vector3f {
    d - 2.0 * d.dot(n) * n
}

/// Bends `d` through an interface with normal `n` and relative index
/// `eta = eta_incident / eta_transmitted`. `None` when the transmitted
/// direction would be imaginary.
pub fn refract(d: &Vector3f, n: &Vector3f, eta: Float) -> Option<Vector3f> {
    let cos_i = d.dot(n);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * d - (eta * cos_i + k.sqrt()) * n)
}

pub fn schlick_r0(eta: Float) -> Float {
    let r = (1.0 - eta) / (1.0 + eta);
    r * r
}

pub fn fresnel_schlick(cos_theta: Float, eta: Float) -> Float {
    let r0 = schlick_r0(eta);
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}

/// Reflectance and transmission at a dielectric interface for one incident
/// direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FresnelTerm {
    pub cos_theta_i: Float,
    pub sin_theta_i: Float,
    /// Probability of reflection. One under total internal reflection.
    pub reflectance: Float,
    /// `None` under total internal reflection.
    pub refracted: Option<Vector3f>,
}

impl FresnelTerm {
    pub fn evaluate(d_in: &Vector3f, normal: &Vector3f, eta: Float) -> Self {
        let cos_theta_i = (-d_in).dot(normal);
        let sin_theta_i = (1.0 - cos_theta_i * cos_theta_i).max(0.0).sqrt();

        let refracted = if eta * sin_theta_i > 1.0 {
            None
        } else {
            refract(d_in, normal, eta)
        };

        let reflectance = match refracted {
            Some(_) => fresnel_schlick(cos_theta_i, eta),
            None => 1.0,
        };

        Self { cos_theta_i, sin_theta_i, reflectance, refracted }
    }

    pub fn is_total_internal_reflection(&self) -> bool {
        self.refracted.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_reflect_about_normal() {
        let d = Vector3f::new(1.0, -1.0, 0.0).normalize();
        let n = Vector3f::new(0.0, 1.0, 0.0);
        let r = reflect(&d, &n);
        assert_close(r.x, d.x);
        assert_close(r.y, -d.y);
        assert_close(r.norm(), 1.0);
    }

    #[test]
    fn test_index_matched_interface_is_transparent() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let d = Vector3f::new(0.0, 0.0, -1.0);
        let term = FresnelTerm::evaluate(&d, &n, 1.0);
        assert_close(schlick_r0(1.0), 0.0);
        assert_close(term.reflectance, 0.0);
        let t = term.refracted.expect("refraction");
        assert_close((t - d).norm(), 0.0);
    }

    #[test]
    fn test_normal_incidence_on_glass() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let d = Vector3f::new(0.0, 0.0, -1.0);
        let term = FresnelTerm::evaluate(&d, &n, 1.5);
        assert_close(term.cos_theta_i, 1.0);
        assert_close(term.reflectance, 0.04);
        let t = term.refracted.expect("refraction");
        assert_close((t - d).norm(), 0.0);
    }

    #[test]
    fn test_total_internal_reflection_at_grazing_angle() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let d = Vector3f::new(1.0, 0.0, -0.1).normalize();
        let term = FresnelTerm::evaluate(&d, &n, 1.5);
        assert!(1.5 * term.sin_theta_i > 1.0);
        assert!(term.is_total_internal_reflection());
        assert_close(term.reflectance, 1.0);
    }

    #[test]
    fn test_refraction_obeys_snell() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let d = Vector3f::new(0.5, 0.0, -0.8).normalize();
        let eta = 1.0 / 1.5;
        let term = FresnelTerm::evaluate(&d, &n, eta);
        let t = term.refracted.expect("refraction");
        assert_close(t.norm(), 1.0);
        let sin_t = (1.0 - t.z * t.z).sqrt();
        assert_close(sin_t, eta * term.sin_theta_i);
        assert!(t.z < 0.0);
    }

    #[test]
    fn test_reflectance_grows_towards_grazing() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let eta = 1.0 / 1.5;
        let steep = FresnelTerm::evaluate(&Vector3f::new(0.1, 0.0, -1.0).normalize(), &n, eta);
        let shallow = FresnelTerm::evaluate(&Vector3f::new(1.0, 0.0, -0.2).normalize(), &n, eta);
        assert!(shallow.reflectance > steep.reflectance);
        assert!(steep.reflectance > schlick_r0(eta) - 1e-6);
    }
}
