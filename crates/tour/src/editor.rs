use foundation::math::{Vec3, normalize_yaw, round_tenth, to_angles};
use scene::{Hotspot, SceneGraph};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("choose a destination area before placing hotspots")]
    NoDestination,
    #[error("unknown destination area: {0}")]
    UnknownDestination(String),
    #[error("placement radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// A hotspot the editor produced, and the area it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub area_id: String,
    pub hotspot: Hotspot,
}

/// Interactive hotspot authoring.
///
/// Edit mode can only be entered with an existing destination, so a click
/// never reaches placement without one. Placing a hotspot leaves edit mode.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotEditor {
    editing: bool,
    destination_id: Option<String>,
    radius: f64,
    last_placed: Option<Hotspot>,
}

impl HotspotEditor {
    pub fn new(default_radius: f64) -> Self {
        Self {
            editing: false,
            destination_id: None,
            radius: default_radius,
            last_placed: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn destination_id(&self) -> Option<&str> {
        self.destination_id.as_deref()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn last_placed(&self) -> Option<&Hotspot> {
        self.last_placed.as_ref()
    }

    /// Whether the "place" action should be enabled for `destination_id`.
    pub fn can_enter_edit_mode(graph: &SceneGraph, destination_id: Option<&str>) -> bool {
        destination_id.is_some_and(|id| graph.contains(id))
    }

    pub fn enter_edit_mode(
        &mut self,
        graph: &SceneGraph,
        destination_id: Option<&str>,
        radius: f64,
    ) -> Result<(), EditorError> {
        let id = destination_id
            .filter(|id| !id.is_empty())
            .ok_or(EditorError::NoDestination)?;
        if !graph.contains(id) {
            return Err(EditorError::UnknownDestination(id.to_string()));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(EditorError::InvalidRadius(radius));
        }

        self.destination_id = Some(id.to_string());
        self.radius = radius;
        self.editing = true;
        Ok(())
    }

    pub fn exit_edit_mode(&mut self) {
        self.editing = false;
    }

    /// Turn a click on the active area's sphere into a hotspot.
    ///
    /// `point` is in the area's un-rotated space; the yaw offset is removed so
    /// the stored angles do not depend on how the sphere is presented.
    /// Returns `None` outside edit mode, when the destination vanished (edit
    /// mode is then left), or when `point` sits at `center`.
    pub fn place(&mut self, graph: &SceneGraph, point: Vec3, center: Vec3) -> Option<Placement> {
        if !self.editing {
            return None;
        }

        let destination_id = self.destination_id.as_deref()?;
        let Some(destination) = graph.area(destination_id) else {
            self.editing = false;
            return None;
        };

        let angles = to_angles(point, center)?;
        let area = graph.active_area();
        let yaw = round_tenth(normalize_yaw(angles.yaw - area.yaw_offset));

        let hotspot = Hotspot::new(
            destination.id.clone(),
            format!("Go to {}", destination.name),
            yaw,
            angles.pitch,
            self.radius,
        );

        self.editing = false;
        self.last_placed = Some(hotspot.clone());
        Some(Placement {
            area_id: area.id.clone(),
            hotspot,
        })
    }
}
