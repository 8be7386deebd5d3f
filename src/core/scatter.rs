// Copyright @yucwang 2026

use crate::core::interaction::SurfaceIntersection;
use crate::core::material::Material;
use crate::core::path_segment::PathSegment;
use crate::core::rng::RandomSource;
use crate::materials::fresnel::{ reflect, FresnelTerm };
use crate::materials::hemisphere::HemisphereSampler;
use crate::math::constants::{ Float, Vector3f, RAY_OFFSET };
use crate::math::spectrum::RGBSpectrum;

/// Probability of the mirror lobe on reflective materials under
/// `EnergySplit::Fixed`.
pub const FIXED_SPECULAR_PROBABILITY: Float = 0.8;

/// How reflective materials choose between their specular and diffuse lobes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnergySplit {
    /// 80/20 split. The chosen lobe is scaled by the split constant, not
    /// divided by its probability, so the expected throughput is
    /// `0.64 * specular + 0.04 * color`.
    Fixed,
    /// Lobe probability proportional to albedo luminance, weighted by the
    /// inverse probability. Unbiased for `specular + color`.
    Luminance,
}

impl Default for EnergySplit {
    fn default() -> Self {
        EnergySplit::Fixed
    }
}

impl EnergySplit {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fixed" => Some(EnergySplit::Fixed),
            "luminance" => Some(EnergySplit::Luminance),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnergySplit::Fixed => "fixed",
            EnergySplit::Luminance => "luminance",
        }
    }

    /// Returns `(specular probability, specular weight, diffuse weight)`.
    fn lobes(&self, color: &RGBSpectrum, specular: &RGBSpectrum) -> (Float, Float, Float) {
        let fixed = (FIXED_SPECULAR_PROBABILITY,
                     FIXED_SPECULAR_PROBABILITY,
                     1.0 - FIXED_SPECULAR_PROBABILITY);
        match self {
            EnergySplit::Fixed => fixed,
            EnergySplit::Luminance => {
                let lum_spec = specular.luminance().max(0.0);
                let total = lum_spec + color.luminance().max(0.0);
                if total <= 0.0 {
                    return fixed;
                }
                let p = lum_spec / total;
                (p, inverse_or_zero(p), inverse_or_zero(1.0 - p))
            }
        }
    }
}

fn inverse_or_zero(p: Float) -> Float {
    if p > 0.0 { 1.0 / p } else { 0.0 }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScatterSettings {
    pub hemisphere: HemisphereSampler,
    pub split: EnergySplit,
    pub ray_offset: Float,
    pub max_depth: u32,
}

impl Default for ScatterSettings {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereSampler::default(),
            split: EnergySplit::default(),
            ray_offset: RAY_OFFSET,
            max_depth: 8,
        }
    }
}

/// The lobe a scatter call ended up sampling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScatterEvent {
    Diffuse,
    Specular,
    Refract,
    TotalInternalReflection,
}

impl ScatterEvent {
    pub const ALL: [ScatterEvent; 4] = [
        ScatterEvent::Diffuse,
        ScatterEvent::Specular,
        ScatterEvent::Refract,
        ScatterEvent::TotalInternalReflection,
    ];

    pub fn index(&self) -> usize {
        match self {
            ScatterEvent::Diffuse => 0,
            ScatterEvent::Specular => 1,
            ScatterEvent::Refract => 2,
            ScatterEvent::TotalInternalReflection => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScatterEvent::Diffuse => "diffuse",
            ScatterEvent::Specular => "specular",
            ScatterEvent::Refract => "refract",
            ScatterEvent::TotalInternalReflection => "tir",
        }
    }
}

/// Samples one bounce at a surface hit. Holds no mutable state; a single
/// engine can be shared by every worker thread.
#[derive(Debug, Copy, Clone, Default)]
pub struct ScatterEngine {
    settings: ScatterSettings,
}

impl ScatterEngine {
    pub fn new(settings: ScatterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScatterSettings {
        &self.settings
    }

    /// Moves `segment.ray` to the hit point, picks a new direction and
    /// folds the material response into `segment.color`.
    pub fn scatter<R: RandomSource + ?Sized>(&self,
                                             segment: &mut PathSegment,
                                             intersection: &SurfaceIntersection,
                                             material: &Material,
                                             rng: &mut R) {
        self.scatter_with_event(segment, intersection, material, rng);
    }

    pub fn scatter_with_event<R: RandomSource + ?Sized>(&self,
                                                        segment: &mut PathSegment,
                                                        intersection: &SurfaceIntersection,
                                                        material: &Material,
                                                        rng: &mut R) -> ScatterEvent {
        let normal = intersection.normal();
        let dir = segment.ray.dir();
        debug_assert!((normal.norm() - 1.0).abs() < 1e-3, "normal is not unit length");
        debug_assert!(dir.iter().all(|c| c.is_finite()), "ray direction is not finite");

        let hit_point = segment.ray.origin() + intersection.t() * dir;
        let above = hit_point + self.settings.ray_offset * normal;
        let choice = rng.next_f32();

        match *material {
            Material::Refractive { color, specular, ior } => {
                let eta = if intersection.outside() { ior } else { 1.0 / ior };
                let fresnel = FresnelTerm::evaluate(&dir, &normal, eta);
                match fresnel.refracted {
                    Some(refracted) if choice > fresnel.reflectance => {
                        segment.ray.set_origin(hit_point - self.settings.ray_offset * normal);
                        segment.ray.set_dir(refracted);
                        segment.color *= color;
                        ScatterEvent::Refract
                    }
                    _ => {
                        mirror(segment, above, &dir, &normal, specular);
                        if fresnel.is_total_internal_reflection() {
                            ScatterEvent::TotalInternalReflection
                        } else {
                            ScatterEvent::Specular
                        }
                    }
                }
            }
            Material::Reflective { color, specular } => {
                let (p_specular, w_specular, w_diffuse) = self.settings.split.lobes(&color, &specular);
                if choice < p_specular {
                    mirror(segment, above, &dir, &normal, specular * w_specular);
                    ScatterEvent::Specular
                } else {
                    let wi = self.settings.hemisphere.sample_with(&normal, rng);
                    segment.ray.set_origin(above);
                    segment.ray.set_dir(wi);
                    segment.color *= color * w_diffuse;
                    ScatterEvent::Diffuse
                }
            }
            Material::Diffuse { color } => {
                let wi = self.settings.hemisphere.sample_with(&normal, rng);
                segment.ray.set_origin(above);
                segment.ray.set_dir(wi);
                segment.color *= color;
                ScatterEvent::Diffuse
            }
        }
    }
}

fn mirror(segment: &mut PathSegment,
          origin: Vector3f,
          dir: &Vector3f,
          normal: &Vector3f,
          tint: RGBSpectrum) {
    segment.ray.set_origin(origin);
    segment.ray.set_dir(reflect(dir, normal).normalize());
    segment.color *= tint;
}
