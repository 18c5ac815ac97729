use foundation::math::{Vec3, normalize_yaw, to_point};

use crate::area::{Area, Hotspot};
use crate::graph::SceneGraph;

/// Where and how to draw one hotspot of the active area.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotMarker {
    /// Index into the owning area's `hotspots`.
    pub index: usize,
    pub target_area_id: String,
    pub label: String,
    pub position: Vec3,
    /// `false` when the target area does not exist (clicking does nothing).
    pub navigable: bool,
}

/// World position of `hotspot`, with the area's yaw offset applied.
pub fn marker_position(area: &Area, hotspot: &Hotspot, base_height: f64) -> Vec3 {
    let yaw = normalize_yaw(hotspot.yaw + area.yaw_offset);
    to_point(yaw, hotspot.pitch, hotspot.radius, base_height)
}

pub fn hotspot_markers(graph: &SceneGraph, area: &Area, base_height: f64) -> Vec<HotspotMarker> {
    area.hotspots
        .iter()
        .enumerate()
        .map(|(index, hotspot)| HotspotMarker {
            index,
            target_area_id: hotspot.target_area_id.clone(),
            label: hotspot.label.clone(),
            position: marker_position(area, hotspot, base_height),
            navigable: graph.resolve_target(hotspot).is_some(),
        })
        .collect()
}
