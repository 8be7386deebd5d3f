// Copyright @yucwang 2026

use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// One ray in flight together with its throughput.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathSegment {
    pub ray: Ray3f,
    pub color: RGBSpectrum,
    pub pixel_index: u32,
    pub remaining_bounces: u32,
}

impl PathSegment {
    pub fn new(ray: Ray3f, pixel_index: u32, max_depth: u32) -> Self {
        Self {
            ray,
            color: RGBSpectrum::splat(1.0),
            pixel_index,
            remaining_bounces: max_depth,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.remaining_bounces > 0
    }

    pub fn terminate(&mut self) {
        self.remaining_bounces = 0;
    }
}
