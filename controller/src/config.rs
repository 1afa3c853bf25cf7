//! Controller configuration.
//!
//! A single strongly-typed struct replaces loosely typed property bags. Every field has a
//! default from [`crate::constants`], partial configs deserialize with the missing fields
//! defaulted, and [`ControllerConfig::validated`] clamps anything degenerate once at
//! construction so the per-tick code never has to re-check it.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::CapsuleSpec;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Horizontal movement speed (m/s).
    pub move_speed: f32,
    /// Initial upward velocity when jumping (m/s).
    pub jump_speed: f32,
    /// Downward acceleration (m/s^2, positive).
    pub gravity: f32,
    /// Max gap below the capsule bottom that still counts as ground (m).
    pub ground_ray_distance: f32,
    /// Steepest walkable slope (degrees from vertical).
    pub max_slope_deg: f32,
    /// Coyote-time window (s).
    pub coyote_time: f32,
    /// Jump-buffer window (s).
    pub jump_buffer_time: f32,
    /// Lerp factor applied to the height error each grounded tick, in [0, 1].
    pub ground_snap_speed: f32,
    /// Terminal fall speed (m/s, positive).
    pub max_fall_speed: f32,
    /// Wall separation kept by the horizontal sweep (m).
    pub skin: f32,
    /// Ground probe cache lifetime (s).
    pub cache_validity: f32,
    /// Ground probe cache displacement limit (m).
    pub cache_position_threshold: f32,
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    /// Side probe ray offset as a fraction of the radius.
    pub probe_offset_fraction: f32,
    /// Hits this close to the nearest one are averaged into the ground normal (m).
    pub normal_average_tolerance: f32,
    /// Radians per unit of look delta.
    pub look_sensitivity: f32,
    /// Pitch clamp (degrees).
    pub max_pitch_deg: f32,
    /// Longest tick integrated in one step (s).
    pub max_delta_time: f32,
    /// Horizontal speed multiplier while airborne.
    pub air_control: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVEMENT_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            gravity: DEFAULT_GRAVITY_MPS2,
            ground_ray_distance: DEFAULT_GROUND_RAY_DISTANCE,
            max_slope_deg: DEFAULT_MAX_SLOPE_DEG,
            coyote_time: DEFAULT_COYOTE_TIME,
            jump_buffer_time: DEFAULT_JUMP_BUFFER_TIME,
            ground_snap_speed: DEFAULT_GROUND_SNAP_SPEED,
            max_fall_speed: DEFAULT_MAX_FALL_SPEED,
            skin: DEFAULT_SKIN,
            cache_validity: DEFAULT_CACHE_VALIDITY,
            cache_position_threshold: DEFAULT_CACHE_POSITION_THRESHOLD,
            capsule_radius: DEFAULT_CAPSULE_RADIUS,
            capsule_half_height: DEFAULT_CAPSULE_HALF_HEIGHT,
            probe_offset_fraction: DEFAULT_PROBE_OFFSET_FRACTION,
            normal_average_tolerance: DEFAULT_NORMAL_AVERAGE_TOLERANCE,
            look_sensitivity: DEFAULT_LOOK_SENSITIVITY,
            max_pitch_deg: DEFAULT_MAX_PITCH_DEG,
            max_delta_time: DEFAULT_MAX_DELTA_TIME,
            air_control: DEFAULT_AIR_CONTROL,
        }
    }
}

impl ControllerConfig {
    #[inline]
    pub fn capsule(&self) -> CapsuleSpec {
        CapsuleSpec {
            radius: self.capsule_radius,
            half_height: self.capsule_half_height,
        }
    }

    /// Return a copy with every field forced into its valid range.
    ///
    /// Non-finite values fall back to their default; out-of-range values are clamped.
    /// Each correction is logged at `warn` level.
    pub fn validated(self) -> Self {
        let d = Self::default();
        let f = f32::INFINITY;
        Self {
            move_speed: field("move_speed", self.move_speed, d.move_speed, 0.0, f),
            jump_speed: field("jump_speed", self.jump_speed, d.jump_speed, 0.0, f),
            gravity: field("gravity", self.gravity, d.gravity, 0.0, f),
            ground_ray_distance: field(
                "ground_ray_distance",
                self.ground_ray_distance,
                d.ground_ray_distance,
                DIST_EPS,
                f,
            ),
            max_slope_deg: field("max_slope_deg", self.max_slope_deg, d.max_slope_deg, 0.0, 90.0),
            coyote_time: field("coyote_time", self.coyote_time, d.coyote_time, 0.0, f),
            jump_buffer_time: field(
                "jump_buffer_time",
                self.jump_buffer_time,
                d.jump_buffer_time,
                0.0,
                f,
            ),
            ground_snap_speed: field(
                "ground_snap_speed",
                self.ground_snap_speed,
                d.ground_snap_speed,
                0.0,
                1.0,
            ),
            max_fall_speed: field("max_fall_speed", self.max_fall_speed, d.max_fall_speed, 0.0, f),
            skin: field("skin", self.skin, d.skin, 0.0, f),
            cache_validity: field("cache_validity", self.cache_validity, d.cache_validity, 0.0, f),
            cache_position_threshold: field(
                "cache_position_threshold",
                self.cache_position_threshold,
                d.cache_position_threshold,
                0.0,
                f,
            ),
            capsule_radius: field(
                "capsule_radius",
                self.capsule_radius,
                d.capsule_radius,
                MIN_CAPSULE_DIMENSION,
                f,
            ),
            capsule_half_height: field(
                "capsule_half_height",
                self.capsule_half_height,
                d.capsule_half_height,
                MIN_CAPSULE_DIMENSION,
                f,
            ),
            probe_offset_fraction: field(
                "probe_offset_fraction",
                self.probe_offset_fraction,
                d.probe_offset_fraction,
                0.0,
                1.0,
            ),
            normal_average_tolerance: field(
                "normal_average_tolerance",
                self.normal_average_tolerance,
                d.normal_average_tolerance,
                0.0,
                f,
            ),
            look_sensitivity: field(
                "look_sensitivity",
                self.look_sensitivity,
                d.look_sensitivity,
                0.0,
                f,
            ),
            max_pitch_deg: field("max_pitch_deg", self.max_pitch_deg, d.max_pitch_deg, 0.0, 90.0),
            max_delta_time: field(
                "max_delta_time",
                self.max_delta_time,
                d.max_delta_time,
                DIST_EPS,
                f,
            ),
            air_control: field("air_control", self.air_control, d.air_control, 0.0, 1.0),
        }
    }
}

fn field(name: &str, value: f32, default: f32, min: f32, max: f32) -> f32 {
    if !value.is_finite() {
        log::warn!("config `{name}` is not finite ({value}), using default {default}");
        return default;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("config `{name}` = {value} is out of range, clamped to {clamped}");
    }
    clamped
}
