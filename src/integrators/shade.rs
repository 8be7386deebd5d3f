// Copyright @yucwang 2026

use std::thread;

use crate::core::interaction::SurfaceIntersection;
use crate::core::material::MaterialTable;
use crate::core::path_segment::PathSegment;
use crate::core::rng::LcgRng;
use crate::core::scatter::ScatterEngine;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Applies one bounce of shading to every live path segment.
pub struct ShadeKernel<'a> {
    engine: &'a ScatterEngine,
    materials: &'a MaterialTable,
    thread_count: usize,
}

impl<'a> ShadeKernel<'a> {
    pub fn new(engine: &'a ScatterEngine, materials: &'a MaterialTable) -> Self {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { engine, materials, thread_count }
    }

    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    /// One fresh segment per camera ray, `rays[i]` landing on pixel `i`, each
    /// allowed `max_depth` bounces from the engine settings.
    pub fn spawn_segments(&self, rays: &[Ray3f]) -> Vec<PathSegment> {
        let max_depth = self.engine.settings().max_depth;
        rays.iter()
            .enumerate()
            .map(|(pixel, ray)| PathSegment::new(*ray, pixel as u32, max_depth))
            .collect()
    }

    /// `intersections[i]` is the hit for `segments[i]`, `None` on a miss.
    /// Each segment draws from its own generator seeded by
    /// `(iteration, pixel_index, depth)`.
    pub fn shade(&self,
                 segments: &mut [PathSegment],
                 intersections: &[Option<SurfaceIntersection>],
                 iteration: u32,
                 depth: u32) {
        assert_eq!(segments.len(), intersections.len(), "one intersection slot per segment");
        if segments.is_empty() {
            return;
        }

        let chunk_size = (segments.len() + self.thread_count - 1) / self.thread_count;
        if self.thread_count == 1 || chunk_size == segments.len() {
            self.shade_chunk(segments, intersections, iteration, depth);
            return;
        }

        thread::scope(|scope| {
            for (seg_chunk, isect_chunk) in segments.chunks_mut(chunk_size)
                                                    .zip(intersections.chunks(chunk_size)) {
                scope.spawn(move || {
                    self.shade_chunk(seg_chunk, isect_chunk, iteration, depth);
                });
            }
        });
    }

    fn shade_chunk(&self,
                   segments: &mut [PathSegment],
                   intersections: &[Option<SurfaceIntersection>],
                   iteration: u32,
                   depth: u32) {
        for (segment, intersection) in segments.iter_mut().zip(intersections.iter()) {
            if !segment.is_alive() {
                continue;
            }
            self.shade_one(segment, intersection.as_ref(), iteration, depth);
        }
    }

    fn shade_one(&self,
                 segment: &mut PathSegment,
                 intersection: Option<&SurfaceIntersection>,
                 iteration: u32,
                 depth: u32) {
        let intersection = match intersection {
            Some(isect) => isect,
            None => {
                segment.color = RGBSpectrum::default();
                segment.terminate();
                return;
            }
        };

        let entry = match self.materials.get(intersection.material_id()) {
            Some(entry) => entry,
            None => {
                log::warn!("Unknown material id {} for pixel {}.", intersection.material_id(), segment.pixel_index);
                segment.color = RGBSpectrum::default();
                segment.terminate();
                return;
            }
        };

        if entry.is_emissive() {
            segment.color *= entry.material.color() * entry.emittance;
            segment.terminate();
            return;
        }

        let mut rng = LcgRng::for_segment(iteration, segment.pixel_index, depth);
        self.engine.scatter(segment, intersection, &entry.material, &mut rng);
        segment.remaining_bounces -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::{Material, MaterialEntry};
    use crate::core::material_loader::parse_materials;
    use crate::math::constants::Vector3f;

    fn table() -> MaterialTable {
        let mut table = MaterialTable::new();
        table.insert(MaterialEntry {
            id: String::from("grey"),
            material: Material::Diffuse { color: RGBSpectrum::splat(0.5) },
            emittance: 0.0,
        });
        table.insert(MaterialEntry {
            id: String::from("light"),
            material: Material::Diffuse { color: RGBSpectrum::new(1.0, 0.5, 0.25) },
            emittance: 4.0,
        });
        table
    }

    fn segments(count: u32) -> Vec<PathSegment> {
        (0..count)
            .map(|i| PathSegment::new(Ray3f::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0)), i, 3))
            .collect()
    }

    fn hit(material_id: usize) -> Option<SurfaceIntersection> {
        Some(SurfaceIntersection::new(1.0, Vector3f::new(0.0, 0.0, 1.0), true, material_id))
    }

    #[test]
    fn test_miss_emitter_and_scatter() {
        let engine = ScatterEngine::default();
        let materials = table();
        let kernel = ShadeKernel::new(&engine, &materials).with_threads(1);
        let mut segs = segments(3);
        let isects = vec![None, hit(1), hit(0)];

        kernel.shade(&mut segs, &isects, 0, 0);

        assert_eq!(segs[0].color, RGBSpectrum::default());
        assert!(!segs[0].is_alive());

        assert_eq!(segs[1].color, RGBSpectrum::new(4.0, 2.0, 1.0));
        assert!(!segs[1].is_alive());

        assert_eq!(segs[2].color, RGBSpectrum::splat(0.5));
        assert_eq!(segs[2].remaining_bounces, 2);
        assert!(segs[2].ray.dir().z >= 0.0);
    }

    #[test]
    fn test_dead_segments_are_untouched() {
        let engine = ScatterEngine::default();
        let materials = table();
        let kernel = ShadeKernel::new(&engine, &materials).with_threads(1);
        let mut segs = segments(1);
        segs[0].terminate();
        let before = segs[0];

        kernel.shade(&mut segs, &[hit(0)], 0, 0);
        assert_eq!(segs[0], before);
    }

    #[test]
    fn test_unknown_material_terminates() {
        let engine = ScatterEngine::default();
        let materials = table();
        let kernel = ShadeKernel::new(&engine, &materials).with_threads(1);
        let mut segs = segments(1);

        kernel.shade(&mut segs, &[hit(42)], 0, 0);
        assert!(!segs[0].is_alive());
        assert!(segs[0].color.is_black());
    }

    #[test]
    fn test_parallel_matches_serial() {
        let engine = ScatterEngine::default();
        let materials = table();
        let isects: Vec<Option<SurfaceIntersection>> = (0..1000).map(|_| hit(0)).collect();

        let mut serial = segments(1000);
        ShadeKernel::new(&engine, &materials).with_threads(1).shade(&mut serial, &isects, 7, 1);

        let mut parallel = segments(1000);
        ShadeKernel::new(&engine, &materials).with_threads(4).shade(&mut parallel, &isects, 7, 1);

        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_depth_changes_the_sampled_direction() {
        let engine = ScatterEngine::default();
        let materials = table();
        let kernel = ShadeKernel::new(&engine, &materials).with_threads(1);

        let mut a = segments(1);
        let mut b = segments(1);
        kernel.shade(&mut a, &[hit(0)], 0, 0);
        kernel.shade(&mut b, &[hit(0)], 0, 1);
        assert_ne!(a[0].ray.dir(), b[0].ray.dir());
    }

    #[test]
    fn test_loaded_max_depth_bounds_the_path() {
        let xml = r#"
            <scene>
                <integrator type="scatter">
                    <integer name="max_depth" value="5"/>
                </integrator>
                <bsdf type="diffuse" id="floor">
                    <rgb name="reflectance" value="0.5"/>
                </bsdf>
            </scene>
        "#;
        let loaded = parse_materials(xml).expect("valid scene");
        let engine = ScatterEngine::new(loaded.settings);
        let kernel = ShadeKernel::new(&engine, &loaded.materials).with_threads(2);

        let camera = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut segs = kernel.spawn_segments(&[camera; 16]);
        assert!(segs.iter().enumerate().all(|(i, s)| s.pixel_index == i as u32 && s.remaining_bounces == 5));

        let isects = vec![hit(0); segs.len()];
        for depth in 0..5 {
            assert!(segs.iter().all(|s| s.is_alive()), "path died before bounce {}", depth);
            kernel.shade(&mut segs, &isects, 0, depth);
        }
        assert!(segs.iter().all(|s| !s.is_alive()));
        assert!(segs.iter().all(|s| s.color == RGBSpectrum::splat(0.5f32.powi(5))));
    }
}
