//! Direction and rotation helpers shared by the scene model and the exporter
//!
//! The viewer addresses hotspots by a spherical direction `(f, o)`: `f` is the
//! azimuth measured in the XY plane and `o` the polar angle measured from +Z.

use glam::{EulerRot, Quat, Vec3};

/// Axis a connection orientation is applied to in order to get its direction
pub const FORWARD: Vec3 = Vec3::Z;

/// Components this close below 360 degrees snap to 0
const DEGREE_WRAP_EPSILON: f32 = 1e-3;

/// Unit direction a connection orientation points at
///
/// Falls back to [`FORWARD`] if the rotated axis degenerates to zero length.
pub fn orientation_direction(orientation: Quat) -> Vec3 {
    (orientation * FORWARD).try_normalize().unwrap_or(FORWARD)
}

/// Encode a unit direction as `(f, o)` in radians
///
/// `f = atan2(y, x)` and `o = acos(z)`. `z` is clamped so rounding noise on a
/// unit vector never produces NaN.
pub fn spherical_angles(direction: Vec3) -> (f32, f32) {
    let f = direction.y.atan2(direction.x);
    let o = direction.z.clamp(-1.0, 1.0).acos();
    (f, o)
}

/// Orientation turning [`FORWARD`] towards `direction`
///
/// Zero-length directions (coincident states) give the identity rotation.
pub fn orientation_towards(direction: Vec3) -> Quat {
    match direction.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(FORWARD, dir),
        None => Quat::IDENTITY,
    }
}

/// Decompose a rotation into Euler angles in degrees
///
/// The decomposition applies Z, then X, then Y, and every component is wrapped
/// into `[0, 360)`.
pub fn euler_degrees(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(wrap_degrees(x), wrap_degrees(y), wrap_degrees(z))
}

/// Build a rotation from Euler angles in degrees (inverse of [`euler_degrees`])
pub fn from_euler_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

fn wrap_degrees(radians: f32) -> f32 {
    // + 0.0 turns -0.0 into 0.0
    let degrees = radians.to_degrees().rem_euclid(360.0) + 0.0;
    if 360.0 - degrees < DEGREE_WRAP_EPSILON {
        0.0
    } else {
        degrees
    }
}
