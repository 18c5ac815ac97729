use foundation::math::normalize_yaw;
use serde::Serialize;

/// Placement distance used when a hotspot does not specify one.
pub const DEFAULT_HOTSPOT_RADIUS: f64 = 18.0;

/// Placeholder for areas published without a description.
pub const DEFAULT_AREA_DESCRIPTION: &str = "Escena 360 del área.";

/// Directional link from one area's sphere to another area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub target_area_id: String,
    pub label: String,
    /// Degrees, relative to the owning area's authored frame.
    pub yaw: f64,
    /// Degrees above the horizon.
    pub pitch: f64,
    pub radius: f64,
}

impl Hotspot {
    /// Build a hotspot with `yaw` wrapped into `(-180, 180]`.
    ///
    /// A non-positive or non-finite `radius` falls back to [`DEFAULT_HOTSPOT_RADIUS`].
    pub fn new(
        target_area_id: impl Into<String>,
        label: impl Into<String>,
        yaw: f64,
        pitch: f64,
        radius: f64,
    ) -> Self {
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            DEFAULT_HOTSPOT_RADIUS
        };

        Self {
            target_area_id: target_area_id.into(),
            label: label.into(),
            yaw: normalize_yaw(yaw),
            pitch,
            radius,
        }
    }

    /// Yaw as read for rendering. Manifest data is stored as published, so
    /// normalization happens here rather than at ingest.
    pub fn normalized_yaw(&self) -> f64 {
        normalize_yaw(self.yaw)
    }
}

/// A navigable 360° scene node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Path or URL of the equirectangular image; may omit the extension.
    pub panorama_ref: String,
    /// Degrees; rotates the whole sphere without touching stored hotspot angles.
    pub yaw_offset: f64,
    pub hotspots: Vec<Hotspot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    /// Externally hosted viewer for the same scene; carried, never rendered here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_url: Option<String>,
}

impl Area {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        panorama_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: DEFAULT_AREA_DESCRIPTION.to_string(),
            panorama_ref: panorama_ref.into(),
            yaw_offset: 0.0,
            hotspots: Vec::new(),
            preview_url: None,
            viewer_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_yaw_offset(mut self, yaw_offset: f64) -> Self {
        self.yaw_offset = yaw_offset;
        self
    }

    pub fn with_hotspot(mut self, hotspot: Hotspot) -> Self {
        self.hotspots.push(hotspot);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Area, DEFAULT_AREA_DESCRIPTION, DEFAULT_HOTSPOT_RADIUS, Hotspot};

    #[test]
    fn new_hotspot_normalizes_yaw() {
        let h = Hotspot::new("pasillo", "Go to Pasillo", 270.0, 0.0, 20.0);
        assert_eq!(h.yaw, -90.0);
        assert_eq!(h.radius, 20.0);
    }

    #[test]
    fn new_hotspot_keeps_radius_positive() {
        assert_eq!(Hotspot::new("a", "A", 0.0, 0.0, 0.0).radius, DEFAULT_HOTSPOT_RADIUS);
        assert_eq!(Hotspot::new("a", "A", 0.0, 0.0, -3.0).radius, DEFAULT_HOTSPOT_RADIUS);
    }

    #[test]
    fn stored_yaw_is_normalized_on_read() {
        let h = Hotspot {
            target_area_id: "a".into(),
            label: "A".into(),
            yaw: 350.0,
            pitch: 0.0,
            radius: 18.0,
        };
        assert_eq!(h.normalized_yaw(), -10.0);
    }

    #[test]
    fn area_defaults() {
        let area = Area::new("entrada", "Entrada", "/panos/entrada");
        assert_eq!(area.description, DEFAULT_AREA_DESCRIPTION);
        assert_eq!(area.yaw_offset, 0.0);
        assert!(area.hotspots.is_empty());
    }
}
