use foundation::handles::TextureHandle;
use foundation::math::Vec3;
use formats::{ManifestError, validate_manifest};
use runtime::{Event, EventBus, EventKind, Frame};
use scene::{Area, Hotspot, HotspotMarker, SceneGraph, ViewerState, check_areas, hotspot_markers};
use serde_json::Value;
use streaming::{
    BlendView, LoadFailure, LoadTicket, TextureCommand, TextureTransitionController,
    TransitionState,
};
use tracing::{debug, info};

use crate::config::TourConfig;
use crate::editor::{EditorError, HotspotEditor};

/// Host-facing facade over the viewer state, texture transitions and editor.
///
/// The host drives it with [`on_frame`](Self::on_frame), executes the
/// commands from [`drain_texture_commands`](Self::drain_texture_commands) and
/// reports finished loads through [`complete_load`](Self::complete_load).
#[derive(Debug)]
pub struct TourSession {
    config: TourConfig,
    state: ViewerState,
    textures: TextureTransitionController,
    editor: HotspotEditor,
    events: EventBus,
}

impl TourSession {
    /// Start on the built-in areas, warming their panoramas.
    pub fn new(config: TourConfig) -> Self {
        let mut session = Self {
            textures: TextureTransitionController::new(config.transition.clone()),
            editor: HotspotEditor::new(config.default_hotspot_radius),
            state: ViewerState::default(),
            events: EventBus::new(),
            config,
        };
        session.prefetch_areas();
        session
    }

    pub fn with_areas(config: TourConfig, areas: Vec<Area>) -> Self {
        let mut session = Self::new(config);
        session.apply_manifest_areas(areas);
        session
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn graph(&self) -> &SceneGraph {
        self.state.graph()
    }

    pub fn textures(&self) -> &TextureTransitionController {
        &self.textures
    }

    pub fn editor(&self) -> &HotspotEditor {
        &self.editor
    }

    pub fn list_areas(&self) -> &[Area] {
        self.state.graph().areas()
    }

    pub fn active_area(&self) -> &Area {
        self.state.active_area()
    }

    pub fn is_area_selected(&self) -> bool {
        self.state.is_area_selected()
    }

    /// Open the panorama of `id`. Unknown ids change nothing.
    pub fn select_area(&mut self, id: &str) -> bool {
        if !self.state.graph().contains(id) {
            debug!(area_id = id, "selection of unknown area ignored");
            return false;
        }

        self.update_state(|s| s.select_area(id));
        info!(area_id = id, "area selected");
        self.events.emit(EventKind::AreaSelected, id);
        self.show_active_area();
        true
    }

    /// Navigate through the `index`-th hotspot of the active area.
    ///
    /// Dangling targets and out-of-range indices are no-ops.
    pub fn follow_hotspot(&mut self, index: usize) -> bool {
        let graph = self.state.graph();
        let target = graph
            .active_area()
            .hotspots
            .get(index)
            .and_then(|h| graph.resolve_target(h))
            .map(|a| a.id.clone());

        match target {
            Some(id) => self.select_area(&id),
            None => false,
        }
    }

    pub fn return_to_menu(&mut self) {
        self.editor.exit_edit_mode();
        self.update_state(ViewerState::return_to_menu);
        self.events
            .emit(EventKind::ReturnedToMenu, self.state.active_area().id.clone());
    }

    pub fn enter_edit_mode(
        &mut self,
        destination_id: Option<&str>,
        radius: f64,
    ) -> Result<(), EditorError> {
        self.editor
            .enter_edit_mode(self.state.graph(), destination_id, radius)
    }

    pub fn exit_edit_mode(&mut self) {
        self.editor.exit_edit_mode();
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_editing()
    }

    /// Feed a click on the panorama sphere (area-local coordinates).
    ///
    /// In edit mode this places a hotspot on the active area and returns it.
    pub fn handle_surface_click(&mut self, point: Vec3) -> Option<Hotspot> {
        let placement =
            self.editor
                .place(self.state.graph(), point, self.config.sphere_center())?;

        info!(
            area_id = %placement.area_id,
            target = %placement.hotspot.target_area_id,
            yaw = placement.hotspot.yaw,
            pitch = placement.hotspot.pitch,
            "hotspot placed"
        );
        self.events.emit(
            EventKind::HotspotPlaced,
            format!("{} -> {}", placement.area_id, placement.hotspot.target_area_id),
        );

        let hotspot = placement.hotspot.clone();
        self.update_state(|s| s.append_hotspot(&placement.area_id, placement.hotspot));
        Some(hotspot)
    }

    pub fn last_placed_hotspot(&self) -> Option<&Hotspot> {
        self.editor.last_placed()
    }

    pub fn pano_load_error_flag(&self) -> bool {
        self.textures.error_flag()
    }

    pub fn hotspot_markers(&self) -> Vec<HotspotMarker> {
        let graph = self.state.graph();
        hotspot_markers(graph, graph.active_area(), self.config.base_height)
    }

    /// Validate a raw manifest payload and install it.
    ///
    /// On error the session is unchanged; the error is returned so tools can
    /// report it, while the viewer simply ignores it.
    pub fn apply_manifest_payload(&mut self, payload: &Value) -> Result<(), ManifestError> {
        match validate_manifest(payload) {
            Ok(areas) => {
                self.apply_manifest_areas(areas);
                Ok(())
            }
            Err(err) => {
                debug!(kind = ?err.kind(), %err, "manifest rejected");
                self.events.emit(EventKind::ManifestRejected, err.to_string());
                Err(err)
            }
        }
    }

    /// Replace the areas with an already validated set.
    ///
    /// The active area survives when its id is still present. If the panorama
    /// view is open, the (possibly new) active panorama is shown.
    pub fn apply_manifest_areas(&mut self, areas: Vec<Area>) -> bool {
        if let Err(err) = check_areas(&areas) {
            debug!(%err, "area set rejected");
            self.events.emit(EventKind::ManifestRejected, err.to_string());
            return false;
        }

        let count = areas.len();
        self.update_state(|s| s.set_areas(areas).sync_active_area());
        self.events
            .emit(EventKind::ManifestApplied, format!("{count} areas"));

        if self.state.is_area_selected() {
            self.show_active_area();
        }
        self.prefetch_areas();
        true
    }

    /// Advance timers and the cross-fade; returns what to draw.
    pub fn on_frame(&mut self, frame: Frame) -> BlendView {
        self.events.begin_frame(frame);
        let before = self.texture_progress();
        self.textures.tick(frame.dt_s);
        self.note_texture_progress(before);
        self.textures.view()
    }

    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<TextureHandle, LoadFailure>) {
        let before = self.texture_progress();
        self.textures.complete(ticket, result);
        self.note_texture_progress(before);
    }

    pub fn drain_texture_commands(&mut self) -> Vec<TextureCommand> {
        self.textures.drain_commands()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Release every texture; returns the final commands (all disposals).
    pub fn shutdown(&mut self) -> Vec<TextureCommand> {
        self.editor.exit_edit_mode();
        self.textures.shutdown();
        self.textures.drain_commands()
    }

    fn update_state(&mut self, f: impl FnOnce(ViewerState) -> ViewerState) {
        let state = std::mem::take(&mut self.state);
        self.state = f(state);
    }

    fn show_active_area(&mut self) {
        let before = self.texture_progress();
        let area = self.state.active_area();
        self.textures.navigate(&area.id, &area.panorama_ref);
        self.note_texture_progress(before);
    }

    fn prefetch_areas(&mut self) {
        let areas = self.state.graph().areas();
        self.textures
            .prefetch(areas.iter().map(|a| a.panorama_ref.as_str()));
    }

    fn texture_progress(&self) -> (u64, TransitionState) {
        (self.textures.generation(), self.textures.state())
    }

    fn note_texture_progress(&mut self, before: (u64, TransitionState)) {
        let (generation, state) = self.texture_progress();
        if (generation, state) == before {
            return;
        }
        let area_id = self.textures.target_area_id().unwrap_or_default().to_string();
        match state {
            TransitionState::Ready => self.events.emit(EventKind::PanoramaReady, area_id),
            TransitionState::Failed => self.events.emit(EventKind::PanoramaFailed, area_id),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TourSession;
    use crate::config::TourConfig;
    use foundation::handles::TextureHandle;
    use foundation::math::to_point;
    use pretty_assertions::assert_eq;
    use runtime::{EventKind, Frame};
    use scene::{Area, Hotspot};
    use serde_json::json;
    use streaming::{LoadFailure, LoadTicket, TextureCommand, TransitionState};

    fn loads(commands: &[TextureCommand]) -> Vec<(LoadTicket, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                TextureCommand::Load { ticket, path } => Some((*ticket, path.clone())),
                TextureCommand::Dispose(_) => None,
            })
            .collect()
    }

    fn kinds(session: &mut TourSession) -> Vec<EventKind> {
        session.drain_events().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn new_session_warms_default_panoramas() {
        let mut session = TourSession::new(TourConfig::default());
        let paths: Vec<String> = loads(&session.drain_texture_commands())
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(
            paths,
            vec!["/panos/sistemas.jpeg", "/panos/pasillo.jpeg", "/panos/entrada.jpeg"]
        );
        assert!(!session.is_area_selected());
        assert_eq!(session.active_area().id, "sistemas");
    }

    #[test]
    fn select_area_loads_and_reports_ready() {
        let mut session = TourSession::new(TourConfig::default());
        session.drain_texture_commands();

        assert!(session.select_area("pasillo"));
        let issued = loads(&session.drain_texture_commands());
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].1, "/panos/pasillo.jpeg");

        session.complete_load(issued[0].0, Ok(TextureHandle(7)));
        assert_eq!(session.textures().state(), TransitionState::Ready);
        assert_eq!(
            kinds(&mut session),
            vec![EventKind::AreaSelected, EventKind::PanoramaReady]
        );

        let view = session.on_frame(Frame::first(1.0 / 60.0));
        assert_eq!(view.base, Some(TextureHandle(7)));
        assert_eq!(view.blend, 1.0);
    }

    #[test]
    fn prefetched_panorama_shows_immediately() {
        let mut session = TourSession::new(TourConfig::default());
        let warm = loads(&session.drain_texture_commands());
        for (i, (ticket, _)) in warm.into_iter().enumerate() {
            session.complete_load(ticket, Ok(TextureHandle(i as u64 + 1)));
        }

        assert!(session.select_area("entrada"));
        assert!(session.drain_texture_commands().is_empty());
        assert_eq!(session.textures().state(), TransitionState::Ready);
        assert_eq!(session.textures().base().unwrap().handle, TextureHandle(3));
    }

    #[test]
    fn unknown_area_and_dangling_hotspot_are_noops() {
        let areas = vec![
            Area::new("a", "A", "/a.jpg")
                .with_hotspot(Hotspot::new("ghost", "Ghost", 0.0, 0.0, 18.0))
                .with_hotspot(Hotspot::new("b", "B", 90.0, 0.0, 18.0)),
            Area::new("b", "B", "/b.jpg"),
        ];
        let mut session = TourSession::with_areas(TourConfig::default(), areas);
        assert!(!session.select_area("nope"));
        assert!(!session.follow_hotspot(0));
        assert!(!session.follow_hotspot(9));
        assert_eq!(session.active_area().id, "a");

        assert!(session.follow_hotspot(1));
        assert_eq!(session.active_area().id, "b");
        assert!(session.is_area_selected());
    }

    #[test]
    fn failed_panorama_raises_flag_and_keeps_texture() {
        let mut config = TourConfig::default();
        config.transition.max_attempts = 1;
        let areas = vec![Area::new("a", "A", "/a.jpg"), Area::new("b", "B", "/b.jpg")];
        let mut session = TourSession::with_areas(config, areas);
        session.drain_texture_commands();

        session.select_area("a");
        let (ta, _) = loads(&session.drain_texture_commands())[0].clone();
        session.complete_load(ta, Ok(TextureHandle(1)));

        session.select_area("b");
        let (tb, _) = loads(&session.drain_texture_commands())[0].clone();
        session.complete_load(tb, Err(LoadFailure::new("404")));

        assert!(session.pano_load_error_flag());
        assert_eq!(session.textures().base().unwrap().handle, TextureHandle(1));
        assert!(kinds(&mut session).contains(&EventKind::PanoramaFailed));
    }

    #[test]
    fn click_in_edit_mode_places_hotspot_on_active_area() {
        let mut session = TourSession::new(TourConfig::default());
        session.select_area("pasillo");

        assert!(session.handle_surface_click(to_point(0.0, 0.0, 60.0, 1.6)).is_none());

        session.enter_edit_mode(Some("entrada"), 20.0).unwrap();
        let placed = session
            .handle_surface_click(to_point(10.0, -5.0, 60.0, 1.6))
            .unwrap();

        assert_eq!(placed.label, "Go to Entrada");
        assert!(!session.is_editing());
        assert_eq!(session.last_placed_hotspot(), Some(&placed));
        assert_eq!(session.active_area().hotspots, vec![placed]);

        let markers = session.hotspot_markers();
        assert_eq!(markers.len(), 1);
        assert!(markers[0].navigable);
    }

    #[test]
    fn rejected_manifest_leaves_state_alone() {
        let mut session = TourSession::new(TourConfig::default());
        session.select_area("pasillo");
        let before = session.state().clone();

        assert!(session.apply_manifest_payload(&json!([])).is_err());
        assert!(
            session
                .apply_manifest_payload(&json!([{ "id": "a", "nombre": "A" }]))
                .is_err()
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn manifest_keeps_active_area_and_shows_its_new_panorama() {
        let mut session = TourSession::new(TourConfig::default());
        session.select_area("pasillo");
        session.drain_texture_commands();

        session
            .apply_manifest_payload(&json!({ "areas": [
                { "id": "entrada", "nombre": "Entrada", "pano": "/v2/entrada" },
                { "id": "pasillo", "nombre": "Pasillo", "pano": "/v2/pasillo" }
            ]}))
            .unwrap();

        assert_eq!(session.active_area().id, "pasillo");
        let paths: Vec<String> = loads(&session.drain_texture_commands())
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        assert_eq!(paths, vec!["/v2/pasillo.jpg"]);
    }

    #[test]
    fn shutdown_disposes_everything_once() {
        let mut session = TourSession::new(TourConfig::default());
        session.drain_texture_commands();
        session.select_area("pasillo");
        let (t, _) = loads(&session.drain_texture_commands())[0].clone();
        session.complete_load(t, Ok(TextureHandle(5)));

        assert_eq!(
            session.shutdown(),
            vec![TextureCommand::Dispose(TextureHandle(5))]
        );
        assert!(session.shutdown().is_empty());
    }
}
