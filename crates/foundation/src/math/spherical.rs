//! Spherical placement for panorama hotspots.
//!
//! Conventions (degrees throughout):
//! - `yaw` rotates around +Y; `yaw = 0` looks down +Z and `yaw = 90` down +X.
//! - `pitch` is elevation above the horizon; `+90` is straight up.
//!
//! Known degenerate case: at the poles (`pitch = ±90`) the horizontal
//! components vanish and yaw is mathematically undefined. [`to_angles`]
//! returns whatever `atan2` yields there (typically `0.0`); callers must not
//! rely on yaw for points directly above or below the center.

use super::Vec3;

/// Yaw/pitch pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphericalAngles {
    pub yaw: f64,
    pub pitch: f64,
}

impl SphericalAngles {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }
}

/// Map `(yaw, pitch, radius)` to a point on a sphere centered at `(0, base_height, 0)`.
pub fn to_point(yaw: f64, pitch: f64, radius: f64, base_height: f64) -> Vec3 {
    let phi = (90.0 - pitch).to_radians();
    let theta = yaw.to_radians();

    let x = radius * phi.sin() * theta.sin();
    let y = radius * phi.cos() + base_height;
    let z = radius * phi.sin() * theta.cos();

    Vec3::new(x, y, z)
}

/// Inverse of [`to_point`]: the direction from `center` to `point` as yaw/pitch.
///
/// Both angles are rounded to one decimal place. Yaw is left in `atan2`'s
/// `[-180, 180]` range and is not renormalized here.
///
/// Returns `None` when `point == center` (no direction).
pub fn to_angles(point: Vec3, center: Vec3) -> Option<SphericalAngles> {
    let d = (point - center).normalized()?;
    let dy = d.y.clamp(-1.0, 1.0);

    let pitch = 90.0 - dy.acos().to_degrees();
    let yaw = d.x.atan2(d.z).to_degrees();

    Some(SphericalAngles::new(round_tenth(yaw), round_tenth(pitch)))
}

/// Wrap `yaw` into `(-180, 180]`.
///
/// Non-finite input is returned unchanged.
pub fn normalize_yaw(yaw: f64) -> f64 {
    if !yaw.is_finite() {
        return yaw;
    }

    let wrapped = yaw % 360.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Round to one decimal place.
pub fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
