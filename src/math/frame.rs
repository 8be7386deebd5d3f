// Copyright @yucwang 2023

use crate::math::constants::{ Vector3f, SQRT_OF_ONE_THIRD };

/// Orthonormal shading frame. `z` is the surface normal.
#[derive(Debug, Copy, Clone)]
pub struct Frame {
    pub x: Vector3f,
    pub y: Vector3f,
    pub z: Vector3f
}

impl Frame {
    /// Builds a frame around a unit normal. At least one component of a unit
    /// vector has magnitude below sqrt(1/3) unless all three equal it, so the
    /// helper axis picked here is never parallel to `n`.
    pub fn from_normal(n: &Vector3f) -> Frame {
        let helper = helper_axis(n);
        let x = n.cross(&helper).normalize();
        let y = n.cross(&x).normalize();
        Frame {
            x,
            y,
            z: *n
        }
    }

    pub fn to_local(&self, v: Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    pub fn from_local(&self, v: Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}

fn helper_axis(n: &Vector3f) -> Vector3f {
    if n.x.abs() < SQRT_OF_ONE_THIRD {
        Vector3f::new(1.0, 0.0, 0.0)
    } else if n.y.abs() < SQRT_OF_ONE_THIRD {
        Vector3f::new(0.0, 1.0, 0.0)
    } else {
        Vector3f::new(0.0, 0.0, 1.0)
    }
}
