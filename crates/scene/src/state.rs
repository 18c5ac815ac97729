use tracing::debug;

use crate::area::{Area, Hotspot};
use crate::graph::SceneGraph;
use crate::prefabs::hospital_scene_graph;

/// Everything the viewer UI reads: the scene graph and whether the user has
/// left the area menu for the panorama view.
///
/// Transitions consume the state and return the next one; invalid inputs
/// return the state unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    graph: SceneGraph,
    area_selected: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(hospital_scene_graph())
    }
}

impl ViewerState {
    pub fn new(graph: SceneGraph) -> Self {
        Self {
            graph,
            area_selected: false,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn active_area(&self) -> &Area {
        self.graph.active_area()
    }

    /// `true` while the panorama view is showing rather than the area menu.
    pub fn is_area_selected(&self) -> bool {
        self.area_selected
    }

    /// Replace the areas, keeping the current active id when it survives.
    #[must_use]
    pub fn set_areas(mut self, areas: Vec<Area>) -> Self {
        let preferred = self.graph.active_id().to_string();
        // An empty or inconsistent set keeps the last good graph.
        if let Err(err) = self.graph.replace(areas, Some(&preferred)) {
            debug!(%err, "area set ignored");
        }
        self
    }

    #[must_use]
    pub fn select_area(mut self, id: &str) -> Self {
        if self.graph.select_area(id) {
            self.area_selected = true;
        }
        self
    }

    #[must_use]
    pub fn return_to_menu(mut self) -> Self {
        self.area_selected = false;
        self
    }

    #[must_use]
    pub fn sync_active_area(mut self) -> Self {
        self.graph.heal_active();
        self
    }

    #[must_use]
    pub fn append_hotspot(mut self, area_id: &str, hotspot: Hotspot) -> Self {
        self.graph.append_hotspot(area_id, hotspot);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ViewerState;
    use crate::area::{Area, Hotspot};
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_on_menu_with_default_areas() {
        let state = ViewerState::default();
        assert!(!state.is_area_selected());
        assert_eq!(state.active_area().id, "sistemas");
        assert_eq!(state.graph().area_count(), 3);
    }

    #[test]
    fn select_then_return_to_menu() {
        let state = ViewerState::default().select_area("entrada");
        assert!(state.is_area_selected());
        assert_eq!(state.active_area().id, "entrada");

        let state = state.return_to_menu();
        assert!(!state.is_area_selected());
        assert_eq!(state.active_area().id, "entrada");
    }

    #[test]
    fn selecting_unknown_area_changes_nothing() {
        let before = ViewerState::default();
        let after = before.clone().select_area("nope");
        assert_eq!(after, before);
    }

    #[test]
    fn set_areas_preserves_active_area() {
        let state = ViewerState::default()
            .select_area("pasillo")
            .set_areas(vec![
                Area::new("entrada", "Entrada", "/e"),
                Area::new("pasillo", "Pasillo", "/p"),
            ]);
        assert_eq!(state.active_area().id, "pasillo");
        assert_eq!(state.graph().area_count(), 2);
    }

    #[test]
    fn set_areas_with_empty_set_is_ignored() {
        let before = ViewerState::default().select_area("pasillo");
        let after = before.clone().set_areas(vec![]).sync_active_area();
        assert_eq!(after, before);
    }

    #[test]
    fn set_areas_with_duplicate_ids_is_ignored() {
        let before = ViewerState::default();
        let after = before.clone().set_areas(vec![
            Area::new("a", "A", "/a"),
            Area::new("a", "A again", "/a2"),
        ]);
        assert_eq!(after, before);
    }

    #[test]
    fn append_hotspot_goes_through_graph() {
        let state = ViewerState::default()
            .append_hotspot("sistemas", Hotspot::new("pasillo", "Go to Pasillo", 0.0, 0.0, 18.0));
        assert_eq!(state.graph().area("sistemas").unwrap().hotspots.len(), 1);
    }
}
