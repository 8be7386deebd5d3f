/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;

pub const PI: Float = 3.14159265359;
pub const TWO_PI: Float = 6.28318530718;
pub const INV_PI: Float = 0.31830988618;
pub const SQRT_OF_ONE_THIRD: Float = 0.57735026919;

// Distance a scattered ray is pushed off the surface along the normal.
pub const RAY_OFFSET: Float = 1e-3;
