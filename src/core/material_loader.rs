// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::material::{Material, MaterialEntry, MaterialTable};
use crate::core::scatter::{EnergySplit, ScatterSettings};
use crate::materials::hemisphere::HemisphereSampler;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug)]
pub enum MaterialLoadError {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    Parse(String),
    MissingField(&'static str),
    DuplicateId(String),
}

impl From<std::io::Error> for MaterialLoadError {
    fn from(err: std::io::Error) -> Self {
        MaterialLoadError::Io(err)
    }
}

impl From<quick_xml::Error> for MaterialLoadError {
    fn from(err: quick_xml::Error) -> Self {
        MaterialLoadError::Xml(err)
    }
}

impl fmt::Display for MaterialLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialLoadError::Io(e) => write!(f, "io error: {}", e),
            MaterialLoadError::Xml(e) => write!(f, "xml error: {}", e),
            MaterialLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            MaterialLoadError::MissingField(field) => write!(f, "missing field: {}", field),
            MaterialLoadError::DuplicateId(id) => write!(f, "duplicate bsdf id: {}", id),
        }
    }
}

impl std::error::Error for MaterialLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MaterialLoadError::Io(e) => Some(e),
            MaterialLoadError::Xml(e) => Some(e),
            _ => None,
        }
    }
}

pub struct MaterialLoadResult {
    pub materials: MaterialTable,
    pub settings: ScatterSettings,
}

pub fn load_materials<P: AsRef<Path>>(path: P) -> Result<MaterialLoadResult, MaterialLoadError> {
    let path = path.as_ref();
    log::info!("Starting reading materials from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let result = parse_materials(&xml)?;
    log::info!("Materials loaded, count = {}.", result.materials.len());
    Ok(result)
}

#[derive(Default)]
struct BsdfBuilder {
    id: Option<String>,
    bsdf_type: Option<String>,
    reflectance: Option<RGBSpectrum>,
    specular: Option<RGBSpectrum>,
    ior: Option<Float>,
    emittance: Option<Float>,
    reflective: bool,
    refractive: bool,
}

impl BsdfBuilder {
    fn set(&mut self, tag: &[u8], name: &str, value: &str) -> Result<(), MaterialLoadError> {
        match (tag, name) {
            (b"rgb", "reflectance") | (b"float", "reflectance") => self.reflectance = Some(parse_spectrum(value)?),
            (b"rgb", "specular") | (b"float", "specular") => self.specular = Some(parse_spectrum(value)?),
            (b"float", "ior") => self.ior = Some(parse_float(value)?),
            (b"float", "emittance") => self.emittance = Some(parse_float(value)?),
            (b"boolean", "reflective") => self.reflective = parse_bool(value)?,
            (b"boolean", "refractive") => self.refractive = parse_bool(value)?,
            _ => log::warn!("Ignoring bsdf property {} <{}>.", name, String::from_utf8_lossy(tag)),
        }
        Ok(())
    }

    fn build(self, index: usize) -> Result<MaterialEntry, MaterialLoadError> {
        let color = self.reflectance.unwrap_or(RGBSpectrum::splat(0.5));
        let specular = self.specular.unwrap_or(RGBSpectrum::splat(1.0));
        let ior = self.ior.unwrap_or(1.5);
        if ior <= 0.0 {
            return Err(MaterialLoadError::Parse(format!("index of refraction must be positive: {}", ior)));
        }

        let material = match self.bsdf_type.as_deref() {
            Some("diffuse") => Material::Diffuse { color },
            Some("reflective") => Material::Reflective { color, specular },
            Some("dielectric") => Material::Refractive { color, specular, ior },
            Some(other) => return Err(MaterialLoadError::Parse(format!("unsupported bsdf: {}", other))),
            None => Material::from_flags(color, specular, self.reflective, self.refractive, ior),
        };

        let emittance = self.emittance.unwrap_or(0.0);
        if emittance < 0.0 {
            return Err(MaterialLoadError::Parse(format!("negative emittance: {}", emittance)));
        }

        Ok(MaterialEntry {
            id: self.id.unwrap_or_else(|| format!("bsdf_{}", index)),
            material,
            emittance,
        })
    }
}

pub fn parse_materials(xml: &str) -> Result<MaterialLoadResult, MaterialLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut settings = ScatterSettings::default();
    let mut materials = MaterialTable::new();

    let mut in_integrator = false;
    let mut current_bsdf: Option<BsdfBuilder> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?.into_owned();
        buf.clear();

        let (e, is_empty) = match event {
            Event::Eof => break,
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                match e.name().as_ref() {
                    b"bsdf" => {
                        if let Some(builder) = current_bsdf.take() {
                            finish_bsdf(builder, &mut materials)?;
                        }
                    }
                    b"integrator" => in_integrator = false,
                    _ => {}
                }
                continue;
            }
            _ => continue,
        };

        match e.name().as_ref() {
            b"scene" => {}
            b"default" => {
                let name = attribute(&e, b"name", &defaults).ok_or(MaterialLoadError::MissingField("default.name"))?;
                let value = attribute(&e, b"value", &defaults).ok_or(MaterialLoadError::MissingField("default.value"))?;
                defaults.insert(name, value);
            }
            b"integrator" => {
                let integrator_type = attribute(&e, b"type", &defaults).unwrap_or_else(|| String::from("scatter"));
                if integrator_type != "scatter" {
                    return Err(MaterialLoadError::Parse(format!("unsupported integrator: {}", integrator_type)));
                }
                in_integrator = !is_empty;
            }
            b"bsdf" => {
                if current_bsdf.is_some() {
                    return Err(MaterialLoadError::Parse(String::from("nested bsdf elements are not supported")));
                }
                let builder = BsdfBuilder {
                    id: attribute(&e, b"id", &defaults),
                    bsdf_type: attribute(&e, b"type", &defaults),
                    ..BsdfBuilder::default()
                };
                if is_empty {
                    finish_bsdf(builder, &mut materials)?;
                } else {
                    current_bsdf = Some(builder);
                }
            }
            tag @ b"string" | tag @ b"float" | tag @ b"integer" | tag @ b"rgb" | tag @ b"boolean" => {
                let name = attribute(&e, b"name", &defaults).ok_or(MaterialLoadError::MissingField("property.name"))?;
                let value = attribute(&e, b"value", &defaults).ok_or(MaterialLoadError::MissingField("property.value"))?;
                if let Some(builder) = current_bsdf.as_mut() {
                    builder.set(tag, &name, &value)?;
                } else if in_integrator {
                    apply_setting(&mut settings, tag, &name, &value)?;
                } else {
                    log::warn!("Ignoring top-level property: {}.", name);
                }
            }
            other => {
                log::warn!("Skipping unknown element <{}>.", String::from_utf8_lossy(other));
            }
        }
    }

    if current_bsdf.is_some() {
        return Err(MaterialLoadError::Parse(String::from("unterminated bsdf element")));
    }

    Ok(MaterialLoadResult { materials, settings })
}

fn finish_bsdf(builder: BsdfBuilder, materials: &mut MaterialTable) -> Result<(), MaterialLoadError> {
    let entry = builder.build(materials.len())?;
    log::debug!("Parsed bsdf {} ({}), emittance = {}.", entry.id, entry.material.kind_name(), entry.emittance);
    let id = entry.id.clone();
    materials.insert(entry).ok_or(MaterialLoadError::DuplicateId(id))?;
    Ok(())
}

fn apply_setting(settings: &mut ScatterSettings,
                 tag: &[u8],
                 name: &str,
                 value: &str) -> Result<(), MaterialLoadError> {
    match (tag, name) {
        (b"string", "hemisphere") => {
            settings.hemisphere = HemisphereSampler::from_name(value)
                .ok_or_else(|| MaterialLoadError::Parse(format!("unknown hemisphere sampler: {}", value)))?;
        }
        (b"string", "split") => {
            settings.split = EnergySplit::from_name(value)
                .ok_or_else(|| MaterialLoadError::Parse(format!("unknown energy split: {}", value)))?;
        }
        (b"float", "offset") => {
            let offset = parse_float(value)?;
            if offset <= 0.0 {
                return Err(MaterialLoadError::Parse(format!("ray offset must be positive: {}", offset)));
            }
            settings.ray_offset = offset;
        }
        (b"integer", "max_depth") => settings.max_depth = parse_u32(value)?,
        _ => log::warn!("Ignoring integrator property: {}.", name),
    }
    Ok(())
}

fn attribute(e: &BytesStart, key: &[u8], defaults: &HashMap<String, String>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| resolve_value(&attr.unescape_value().unwrap_or_default(), defaults))
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn parse_float(value: &str) -> Result<Float, MaterialLoadError> {
    value.trim().parse::<Float>().map_err(|_| MaterialLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, MaterialLoadError> {
    value.trim().parse::<u32>().map_err(|_| MaterialLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, MaterialLoadError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(MaterialLoadError::Parse(format!("invalid boolean: {}", other))),
    }
}

/// Accepts either a single grey value or `r, g, b`.
fn parse_spectrum(value: &str) -> Result<RGBSpectrum, MaterialLoadError> {
    let parts: Vec<&str> = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    match parts.len() {
        1 => Ok(RGBSpectrum::splat(parse_float(parts[0])?)),
        3 => Ok(RGBSpectrum::new(parse_float(parts[0])?, parse_float(parts[1])?, parse_float(parts[2])?)),
        _ => Err(MaterialLoadError::Parse(format!("invalid rgb: {}", value))),
    }
}
