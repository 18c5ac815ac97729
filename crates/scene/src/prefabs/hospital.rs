use crate::area::Area;
use crate::graph::SceneGraph;

/// Built-in tour used until a manifest replaces it.
pub fn hospital_areas() -> Vec<Area> {
    vec![
        Area::new("sistemas", "Sistemas", "/panos/sistemas.jpeg")
            .with_description("Área de sistemas del hospital."),
        Area::new("pasillo", "Pasillo", "/panos/pasillo.jpeg")
            .with_description("Conexión principal entre áreas."),
        Area::new("entrada", "Entrada", "/panos/entrada.jpeg")
            .with_description("Acceso principal del hospital."),
    ]
}

pub fn hospital_scene_graph() -> SceneGraph {
    SceneGraph::from_checked(hospital_areas())
}

#[cfg(test)]
mod tests {
    use super::{hospital_areas, hospital_scene_graph};
    use crate::graph::SceneGraph;

    #[test]
    fn default_areas_form_a_valid_graph() {
        let checked = SceneGraph::new(hospital_areas()).unwrap();
        assert_eq!(checked, hospital_scene_graph());
        assert_eq!(checked.active_area().id, "sistemas");
    }

    #[test]
    fn default_panoramas_carry_extensions() {
        for area in hospital_areas() {
            assert!(area.panorama_ref.ends_with(".jpeg"), "{}", area.panorama_ref);
            assert!(area.hotspots.is_empty());
        }
    }
}
