use std::collections::BTreeSet;

use thiserror::Error;

use crate::area::{Area, Hotspot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneGraphError {
    #[error("scene graph needs at least one area")]
    Empty,
    #[error("duplicate area id: {0}")]
    DuplicateAreaId(String),
}

/// Ordered areas plus the id of the area currently on screen.
///
/// A graph is never empty, so [`SceneGraph::active_area`] always has an answer.
///
/// Ordering contract:
/// - `areas()` yields areas in the order they were supplied.
/// - When the active id is unknown, the first area stands in for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    areas: Vec<Area>,
    active_id: String,
}

impl SceneGraph {
    pub fn new(areas: Vec<Area>) -> Result<Self, SceneGraphError> {
        check_areas(&areas)?;
        let active_id = areas[0].id.clone();
        Ok(Self { areas, active_id })
    }

    /// Install a new set of areas, keeping `preferred_active_id` active when it
    /// still exists and falling back to the first area otherwise.
    ///
    /// On error the current graph is left untouched.
    pub fn replace(
        &mut self,
        areas: Vec<Area>,
        preferred_active_id: Option<&str>,
    ) -> Result<(), SceneGraphError> {
        check_areas(&areas)?;

        let active_id = preferred_active_id
            .filter(|id| areas.iter().any(|a| a.id == *id))
            .map(str::to_string)
            .unwrap_or_else(|| areas[0].id.clone());

        self.areas = areas;
        self.active_id = active_id;
        Ok(())
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.area(id).is_some()
    }

    /// The stored active id; may name a missing area until [`SceneGraph::heal_active`] runs.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active_area(&self) -> &Area {
        self.area(&self.active_id).unwrap_or(&self.areas[0])
    }

    /// Point the active id at the area [`SceneGraph::active_area`] resolves to.
    pub fn heal_active(&mut self) {
        if !self.contains(&self.active_id) {
            self.active_id = self.areas[0].id.clone();
        }
    }

    /// Returns `true` if `id` names an area (and is now active).
    pub fn select_area(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active_id = id.to_string();
        true
    }

    /// Append `hotspot` to the area `area_id`.
    ///
    /// Returns `false` (and drops the hotspot) if the area does not exist.
    pub fn append_hotspot(&mut self, area_id: &str, hotspot: Hotspot) -> bool {
        let Some(area) = self.areas.iter_mut().find(|a| a.id == area_id) else {
            return false;
        };
        area.hotspots.push(hotspot);
        true
    }

    /// The area a hotspot leads to; `None` for dangling targets.
    pub fn resolve_target(&self, hotspot: &Hotspot) -> Option<&Area> {
        self.area(&hotspot.target_area_id)
    }

    /// Construct from areas already known to be non-empty with unique ids.
    pub(crate) fn from_checked(areas: Vec<Area>) -> Self {
        let active_id = areas.first().map(|a| a.id.clone()).unwrap_or_default();
        Self { areas, active_id }
    }
}

/// Check that `areas` could form a graph: non-empty with unique ids.
pub fn check_areas(areas: &[Area]) -> Result<(), SceneGraphError> {
    if areas.is_empty() {
        return Err(SceneGraphError::Empty);
    }

    let mut seen = BTreeSet::new();
    for area in areas {
        if !seen.insert(area.id.as_str()) {
            return Err(SceneGraphError::DuplicateAreaId(area.id.clone()));
        }
    }
    Ok(())
}
