// Copyright @yucwang 2023

use std::collections::HashMap;

use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

/// Surface response used by the scatter engine. Exactly one variant applies
/// to a surface, so the dispatch in `ScatterEngine` is a single match.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Material {
    Diffuse {
        color: RGBSpectrum,
    },
    Reflective {
        color: RGBSpectrum,
        specular: RGBSpectrum,
    },
    Refractive {
        color: RGBSpectrum,
        specular: RGBSpectrum,
        ior: Float,
    },
}

impl Material {
    /// Classifies a flag-style material record. Refraction wins when both
    /// flags are set.
    pub fn from_flags(color: RGBSpectrum,
                      specular: RGBSpectrum,
                      has_reflective: bool,
                      has_refractive: bool,
                      ior: Float) -> Self {
        if has_refractive {
            Material::Refractive { color, specular, ior }
        } else if has_reflective {
            Material::Reflective { color, specular }
        } else {
            Material::Diffuse { color }
        }
    }

    pub fn color(&self) -> RGBSpectrum {
        match *self {
            Material::Diffuse { color } => color,
            Material::Reflective { color, .. } => color,
            Material::Refractive { color, .. } => color,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Material::Diffuse { .. } => "diffuse",
            Material::Reflective { .. } => "reflective",
            Material::Refractive { .. } => "dielectric",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialEntry {
    pub id: String,
    pub material: Material,
    pub emittance: Float,
}

impl MaterialEntry {
    pub fn is_emissive(&self) -> bool {
        self.emittance > 0.0
    }
}

/// Immutable scene materials, addressed by index or by string id.
#[derive(Debug, Default)]
pub struct MaterialTable {
    entries: Vec<MaterialEntry>,
    by_id: HashMap<String, usize>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the new entry, or `None` if the id is taken.
    pub fn insert(&mut self, entry: MaterialEntry) -> Option<usize> {
        if self.by_id.contains_key(&entry.id) {
            return None;
        }
        let index = self.entries.len();
        self.by_id.insert(entry.id.clone(), index);
        self.entries.push(entry);
        Some(index)
    }

    pub fn get(&self, index: usize) -> Option<&MaterialEntry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&MaterialEntry> {
        self.index_of(id).and_then(|i| self.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialEntry> {
        self.entries.iter()
    }
}
