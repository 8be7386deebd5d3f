// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector3f };

/// A ray/surface hit as reported by the intersection tester.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceIntersection {
    t: Float,
    normal: Vector3f,
    outside: bool,
    material_id: usize,
}

impl SurfaceIntersection {
    /// `new_normal` must be unit length and face the side the ray came from
    /// when `new_outside` is set.
    pub fn new(new_t: Float,
               new_normal: Vector3f,
               new_outside: bool,
               new_material_id: usize) -> Self {
        Self { t: new_t, normal: new_normal, outside: new_outside, material_id: new_material_id }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    /// True if the ray started outside the closed surface it hit.
    pub fn outside(&self) -> bool {
        self.outside
    }

    pub fn material_id(&self) -> usize {
        self.material_id
    }
}
