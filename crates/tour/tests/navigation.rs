use foundation::handles::TextureHandle;
use foundation::math::to_point;
use pretty_assertions::assert_eq;
use runtime::Frame;
use serde_json::json;
use streaming::{LoadFailure, LoadTicket, TextureCommand, TransitionState};
use tour::{TourConfig, TourSession};

fn loads(session: &mut TourSession) -> Vec<(LoadTicket, String)> {
    session
        .drain_texture_commands()
        .into_iter()
        .filter_map(|c| match c {
            TextureCommand::Load { ticket, path } => Some((ticket, path)),
            TextureCommand::Dispose(_) => None,
        })
        .collect()
}

fn two_area_session() -> TourSession {
    let mut session = TourSession::new(TourConfig::default());
    session
        .apply_manifest_payload(&json!([
            { "id": "a", "nombre": "A", "pano": "/panos/a" },
            { "id": "b", "nombre": "B", "pano": "/panos/b",
              "hotspots": [{ "id": "a", "nombre": "Back to A", "yaw": 200, "pitch": 0 }] }
        ]))
        .unwrap();
    session.drain_texture_commands();
    session.drain_events();
    session
}

#[test]
fn rejected_manifests_leave_the_graph_untouched() {
    let mut session = TourSession::new(TourConfig::default());
    let before = session.state().clone();

    assert!(session.apply_manifest_payload(&json!([])).is_err());
    assert!(
        session
            .apply_manifest_payload(&json!([{ "id": "x", "nombre": "X" }]))
            .is_err()
    );
    assert_eq!(session.state(), &before);
}

#[test]
fn accepted_manifest_replaces_areas() {
    let session = two_area_session();
    let ids: Vec<&str> = session.list_areas().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    let b = session.graph().area("b").unwrap();
    assert_eq!(b.description, "Escena 360 del área.");
    assert_eq!(b.hotspots.len(), 1);
    assert_eq!(b.hotspots[0].target_area_id, "a");
    // Stored as published; read normalized.
    assert_eq!(b.hotspots[0].yaw, 200.0);
    assert_eq!(b.hotspots[0].normalized_yaw(), -160.0);
}

#[test]
fn extension_probing_stops_at_first_success() {
    let mut session = two_area_session();
    session.select_area("a");

    let first = loads(&mut session);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].1, "/panos/a.jpg");

    // Three attempts on .jpg, then .jpeg succeeds.
    session.complete_load(first[0].0, Err(LoadFailure::new("404")));
    for _ in 0..2 {
        session.on_frame(Frame::first(0.25));
        let retry = loads(&mut session);
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].1, "/panos/a.jpg");
        session.complete_load(retry[0].0, Err(LoadFailure::new("404")));
    }

    let next = loads(&mut session);
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].1, "/panos/a.jpeg");
    session.complete_load(next[0].0, Ok(TextureHandle(10)));

    assert_eq!(session.textures().state(), TransitionState::Ready);
    assert!(!session.pano_load_error_flag());
    assert_eq!(session.textures().base().unwrap().path, "/panos/a.jpeg");
    assert!(loads(&mut session).is_empty());
}

#[test]
fn late_texture_for_an_abandoned_area_never_shows() {
    let mut session = two_area_session();
    session.select_area("a");
    let (ta, _) = loads(&mut session)[0].clone();

    session.select_area("b");
    let (tb, _) = loads(&mut session)[0].clone();

    session.complete_load(tb, Ok(TextureHandle(2)));
    session.complete_load(ta, Ok(TextureHandle(1)));

    let view = session.on_frame(Frame::first(1.0 / 60.0));
    assert_eq!(view.base, Some(TextureHandle(2)));
    assert_eq!(view.incoming, None);
    assert_eq!(session.textures().target_area_id(), Some("b"));
}

#[test]
fn authored_hotspot_matches_click() {
    let mut session = TourSession::new(TourConfig::default());
    session.select_area("pasillo");
    session.enter_edit_mode(Some("entrada"), 20.0).unwrap();

    let placed = session
        .handle_surface_click(to_point(10.0, -5.0, 60.0, 1.6))
        .unwrap();

    assert_eq!(placed.target_area_id, "entrada");
    assert_eq!(placed.label, "Go to Entrada");
    assert_eq!(placed.radius, 20.0);
    assert_eq!(placed.yaw, 10.0);
    assert_eq!(placed.pitch, -5.0);
    assert!(!session.is_editing());

    assert!(session.follow_hotspot(0));
    assert_eq!(session.active_area().id, "entrada");
}
