use foundation::math::Vec3;
use formats::DEFAULT_MANIFEST_URL;
use scene::DEFAULT_HOTSPOT_RADIUS;
use serde::Deserialize;
use streaming::TransitionConfig;

/// Environment variable that overrides [`TourConfig::manifest_url`].
pub const MANIFEST_URL_ENV: &str = "SCENES_MANIFEST_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    pub manifest_url: String,
    /// Eye height; the panorama sphere is centered at `(0, base_height, 0)`.
    pub base_height: f64,
    /// Radius of the textured panorama sphere.
    pub sphere_radius: f64,
    /// Placement radius offered by the editor until the user changes it.
    pub default_hotspot_radius: f64,
    pub transition: TransitionConfig,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            base_height: 1.6,
            sphere_radius: 60.0,
            default_hotspot_radius: DEFAULT_HOTSPOT_RADIUS,
            transition: TransitionConfig::default(),
        }
    }
}

impl TourConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(MANIFEST_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.manifest_url = url;
        }
        self
    }

    pub fn sphere_center(&self) -> Vec3 {
        Vec3::new(0.0, self.base_height, 0.0)
    }
}
