use crate::constants::MIN_MOVE_SQ;
use crate::types::{ControlInput, Vec2, Vec3, up};

/// Return `v` if every component is finite, otherwise `fallback`.
#[inline]
pub fn finite_or(v: Vec3, fallback: Vec3) -> Vec3 {
    if v.iter().all(|c| c.is_finite()) {
        v
    } else {
        fallback
    }
}

/// Look deltas with NaN/inf components are dropped for the tick.
#[inline]
pub fn sanitize_look_delta(delta: Vec2) -> Vec2 {
    if delta.iter().all(|c| c.is_finite()) {
        delta
    } else {
        Vec2::zeros()
    }
}

/// Clamp a frame delta into `[0, max_dt]`. Non-finite deltas become zero.
#[inline]
pub fn sanitize_delta_time(dt: f32, max_dt: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, max_dt) } else { 0.0 }
}

/// Planar forward/right basis for a yaw angle.
///
/// Yaw zero faces -Z, matching `yaw = atan2(-dx, -dz)`. Pitch never enters the basis so
/// movement stays on the horizontal plane.
#[inline]
pub fn planar_basis(yaw: f32) -> (Vec3, Vec3) {
    let (sin, cos) = yaw.sin_cos();
    let forward = Vec3::new(-sin, 0.0, -cos);
    let right = Vec3::new(cos, 0.0, -sin);
    (forward, right)
}

/// Yaw that faces the planar direction `xz`, if it is long enough to define one.
pub fn yaw_from_xz(xz: Vec2) -> Option<f32> {
    if xz.norm_squared() > MIN_MOVE_SQ {
        return Some((-xz.x).atan2(-xz.y));
    }

    None
}

/// Unit horizontal direction requested by the directional flags.
///
/// Opposing flags cancel; no flags (or a full cancel) yields zero.
pub fn move_direction(input: &ControlInput, yaw: f32) -> Vec3 {
    let (forward, right) = planar_basis(yaw);
    let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;

    let wish = forward * axis(input.forward, input.backward) + right * axis(input.right, input.left);
    if wish.norm_squared() <= MIN_MOVE_SQ {
        return Vec3::zeros();
    }
    wish.normalize()
}

/// Angle between `normal` and world up, in degrees.
#[inline]
pub fn slope_angle_deg(normal: &Vec3) -> f32 {
    normal.dot(&up()).clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn input(forward: bool, backward: bool, left: bool, right: bool) -> ControlInput {
        ControlInput {
            forward,
            backward,
            left,
            right,
            ..Default::default()
        }
    }

    #[test]
    fn yaw_zero_faces_negative_z() {
        let (forward, right) = planar_basis(0.0);
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-6);
        assert!((right - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-6);
    }

    #[test]
    fn basis_round_trips_through_yaw_from_xz() {
        for yaw in [-2.5f32, -1.0, 0.0, 0.7, FRAC_PI_2, 3.0] {
            let (forward, _) = planar_basis(yaw);
            let back = yaw_from_xz(Vec2::new(forward.x, forward.z)).unwrap();
            let diff = (back - yaw).rem_euclid(std::f32::consts::TAU);
            assert!(diff < 1.0e-4 || diff > std::f32::consts::TAU - 1.0e-4);
        }
    }

    #[test]
    fn opposing_flags_cancel() {
        assert_eq!(move_direction(&input(true, true, false, false), 0.0), Vec3::zeros());
        assert_eq!(move_direction(&input(false, false, true, true), 1.0), Vec3::zeros());
        assert_eq!(move_direction(&input(false, false, false, false), 1.0), Vec3::zeros());
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let dir = move_direction(&input(true, false, false, true), 0.0);
        assert!((dir.norm() - 1.0).abs() < 1.0e-6);
        assert!(dir.y.abs() < 1.0e-6);
        assert!(dir.x > 0.0 && dir.z < 0.0);
    }

    #[test]
    fn slope_angle_of_common_normals() {
        assert!(slope_angle_deg(&up()).abs() < 1.0e-3);
        let ramp = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!((slope_angle_deg(&ramp) - 45.0).abs() < 1.0e-3);
        assert!((slope_angle_deg(&Vec3::new(1.0, 0.0, 0.0)) - 90.0).abs() < 1.0e-3);
    }

    #[test]
    fn non_finite_inputs_are_sanitized() {
        assert_eq!(sanitize_delta_time(f32::NAN, 0.1), 0.0);
        assert_eq!(sanitize_delta_time(-1.0, 0.1), 0.0);
        assert_eq!(sanitize_delta_time(5.0, 0.1), 0.1);
        assert_eq!(sanitize_look_delta(Vec2::new(f32::INFINITY, 1.0)), Vec2::zeros());

        let fallback = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(finite_or(Vec3::new(f32::NAN, 0.0, 0.0), fallback), fallback);
    }
}
