//! Area manifest wire format.
//!
//! Manifests are JSON, either a bare array of areas or `{ "areas": [...] }`.
//! Field names keep the vocabulary of the published manifests:
//!
//! ```json
//! { "id": "pasillo", "nombre": "Pasillo", "pano": "/panos/pasillo",
//!   "descripcion": "...", "rotacionYaw": 90,
//!   "hotspots": [{ "id": "entrada", "nombre": "Entrada", "yaw": 10, "pitch": -5 }] }
//! ```
//!
//! Validation is all-or-nothing: one bad area rejects the whole payload.
//!
//! Hotspots may name their target `targetAreaId` and their label `label`;
//! when both spellings of a field are present these win over `id`/`nombre`
//! (a hotspot's `id` is then its own id). `descripcion` and `rotacionYaw` of
//! the wrong type are treated as absent.

use std::collections::BTreeSet;

use scene::{Area, DEFAULT_AREA_DESCRIPTION, DEFAULT_HOTSPOT_RADIUS, Hotspot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_MANIFEST_URL: &str = "/hospital-manifest.json";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ManifestArea {
    pub id: String,
    pub nombre: String,
    pub pano: String,
    #[serde(default, deserialize_with = "lenient")]
    pub descripcion: Option<String>,
    #[serde(default, rename = "rotacionYaw", deserialize_with = "lenient")]
    pub rotacion_yaw: Option<f64>,
    #[serde(default)]
    pub hotspots: Option<Vec<ManifestHotspot>>,
    #[serde(default, rename = "previewUrl")]
    pub preview_url: Option<String>,
    #[serde(default, rename = "marzipanoUrl")]
    pub marzipano_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(try_from = "WireHotspot")]
pub struct ManifestHotspot {
    pub target_area_id: String,
    pub label: String,
    pub yaw: f64,
    pub pitch: f64,
    pub radius: Option<f64>,
}

/// Hotspot as published, before the two spellings of each field are merged.
#[derive(Deserialize)]
struct WireHotspot {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "targetAreaId")]
    target_area_id: Option<Value>,
    #[serde(default)]
    nombre: Option<Value>,
    #[serde(default)]
    label: Option<Value>,
    yaw: f64,
    pitch: f64,
    #[serde(default)]
    radius: Option<f64>,
}

impl TryFrom<WireHotspot> for ManifestHotspot {
    type Error = String;

    fn try_from(wire: WireHotspot) -> Result<Self, Self::Error> {
        let target_area_id = first_string([wire.target_area_id, wire.id])
            .ok_or("hotspot needs a string `targetAreaId` or `id`")?;
        let label = first_string([wire.label, wire.nombre])
            .ok_or("hotspot needs a string `label` or `nombre`")?;
        Ok(Self {
            target_area_id,
            label,
            yaw: wire.yaw,
            pitch: wire.pitch,
            radius: wire.radius,
        })
    }
}

fn first_string<const N: usize>(values: [Option<Value>; N]) -> Option<String> {
    values.into_iter().flatten().find_map(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Deserialize `T`, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ManifestErrorKind {
    /// Transport or JSON parse failure.
    Unreachable,
    /// Well-formed JSON that is not an acceptable manifest.
    Invalid,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest unavailable: {0}")]
    Unreachable(String),
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("manifest must be an array of areas or an object with an `areas` array")]
    NotAnAreaList,
    #[error("manifest has no areas")]
    Empty,
    #[error("area #{index} is invalid: {source}")]
    InvalidArea {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("hotspot #{index} of area `{area_id}` has non-positive radius {radius}")]
    InvalidHotspotRadius {
        area_id: String,
        index: usize,
        radius: f64,
    },
    #[error("duplicate area id: {0}")]
    DuplicateAreaId(String),
}

impl ManifestError {
    pub fn kind(&self) -> ManifestErrorKind {
        match self {
            ManifestError::Unreachable(_) | ManifestError::Parse(_) => {
                ManifestErrorKind::Unreachable
            }
            _ => ManifestErrorKind::Invalid,
        }
    }
}

/// Parse and validate manifest text.
pub fn parse_manifest_str(text: &str) -> Result<Vec<Area>, ManifestError> {
    let payload: Value = serde_json::from_str(text).map_err(ManifestError::Parse)?;
    validate_manifest(&payload)
}

/// Validate an arbitrary JSON payload and normalize it into areas.
pub fn validate_manifest(payload: &Value) -> Result<Vec<Area>, ManifestError> {
    let list = match payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("areas") {
            Some(Value::Array(items)) => items,
            _ => return Err(ManifestError::NotAnAreaList),
        },
        _ => return Err(ManifestError::NotAnAreaList),
    };

    if list.is_empty() {
        return Err(ManifestError::Empty);
    }

    let mut wire = Vec::with_capacity(list.len());
    for (index, item) in list.iter().enumerate() {
        let area = ManifestArea::deserialize(item)
            .map_err(|source| ManifestError::InvalidArea { index, source })?;
        wire.push(area);
    }

    check_consistency(&wire)?;

    Ok(wire.into_iter().map(normalize_area).collect())
}

fn check_consistency(areas: &[ManifestArea]) -> Result<(), ManifestError> {
    let mut seen = BTreeSet::new();
    for area in areas {
        if !seen.insert(area.id.as_str()) {
            return Err(ManifestError::DuplicateAreaId(area.id.clone()));
        }

        for (index, hotspot) in area.hotspots.iter().flatten().enumerate() {
            if let Some(radius) = hotspot.radius {
                if radius <= 0.0 {
                    return Err(ManifestError::InvalidHotspotRadius {
                        area_id: area.id.clone(),
                        index,
                        radius,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Fill defaults. Angles are passed through as published.
pub fn normalize_area(area: ManifestArea) -> Area {
    let hotspots = area
        .hotspots
        .unwrap_or_default()
        .into_iter()
        .map(|h| Hotspot {
            target_area_id: h.target_area_id,
            label: h.label,
            yaw: h.yaw,
            pitch: h.pitch,
            radius: h.radius.unwrap_or(DEFAULT_HOTSPOT_RADIUS),
        })
        .collect();

    Area {
        id: area.id,
        name: area.nombre,
        description: area
            .descripcion
            .unwrap_or_else(|| DEFAULT_AREA_DESCRIPTION.to_string()),
        panorama_ref: area.pano,
        yaw_offset: area.rotacion_yaw.unwrap_or(0.0),
        hotspots,
        preview_url: area.preview_url,
        viewer_url: area.marzipano_url,
    }
}
