/*!
Kinematic character controller settings and tolerances.

These constants centralize the default parameters used by the ground probe,
vertical integrator, horizontal sweep and ground snapping. `ControllerConfig`
starts from these values and hosts override what they need.

Notes
- Distances are in meters, time in seconds, angles in degrees unless stated otherwise.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Default walking speed in meters per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 5.0;

/// Upward velocity applied when a jump fires (m/s).
pub const DEFAULT_JUMP_SPEED: f32 = 5.0;

/// Gravity magnitude in meters per second squared (positive value).
/// Integrated as a downward acceleration while airborne.
pub const DEFAULT_GRAVITY_MPS2: f32 = 20.0;

/// How far below the capsule bottom ground still counts as support (meters).
pub const DEFAULT_GROUND_RAY_DISTANCE: f32 = 0.2;

/// Steepest walkable surface, measured from vertical (degrees).
pub const DEFAULT_MAX_SLOPE_DEG: f32 = 45.0;

/// Grace period after leaving ground during which a jump is still honored (seconds).
pub const DEFAULT_COYOTE_TIME: f32 = 0.15;

/// Grace period during which an early jump request is remembered (seconds).
pub const DEFAULT_JUMP_BUFFER_TIME: f32 = 0.1;

/// Fraction of the remaining height error removed per tick while grounded.
pub const DEFAULT_GROUND_SNAP_SPEED: f32 = 0.5;

/// Terminal fall speed (positive magnitude, m/s).
/// Keeps a long fall from tunnelling through thin geometry.
pub const DEFAULT_MAX_FALL_SPEED: f32 = 50.0;

/// Separation kept from walls when a horizontal sweep is clipped (meters).
/// Too large creates visible gaps; too small risks jitter on contact.
pub const DEFAULT_SKIN: f32 = 0.02;

/// How long a cached ground probe stays valid (seconds).
pub const DEFAULT_CACHE_VALIDITY: f32 = 0.05;

/// Max displacement before a cached ground probe is discarded (meters).
pub const DEFAULT_CACHE_POSITION_THRESHOLD: f32 = 0.1;

/// Default capsule: 0.3m radius, 1.8m total height.
pub const DEFAULT_CAPSULE_RADIUS: f32 = 0.3;
pub const DEFAULT_CAPSULE_HALF_HEIGHT: f32 = 0.6;

/// Smallest capsule dimension accepted by configuration (meters).
pub const MIN_CAPSULE_DIMENSION: f32 = 0.01;

/// Offset of the four side probe rays, as a fraction of the capsule radius.
pub const DEFAULT_PROBE_OFFSET_FRACTION: f32 = 0.5;

/// Hits within this distance of the closest ground hit contribute to the averaged normal.
pub const DEFAULT_NORMAL_AVERAGE_TOLERANCE: f32 = 0.05;

/// Radians of rotation per unit of look delta.
pub const DEFAULT_LOOK_SENSITIVITY: f32 = 0.002;

/// Look pitch limit (degrees either side of horizontal).
pub const DEFAULT_MAX_PITCH_DEG: f32 = 90.0;

/// Longest single tick the controller will integrate (seconds).
/// Hitches beyond this are clamped rather than integrated in one step.
pub const DEFAULT_MAX_DELTA_TIME: f32 = 0.1;

/// Multiplier for horizontal speed while airborne.
///
/// Convention:
/// - 1.0 = full ground control in air
/// - 0.0 = no air control
pub const DEFAULT_AIR_CONTROL: f32 = 1.0;

/// Minimum squared movement threshold to consider a step meaningful (m^2).
/// Movements below this are treated as zero to avoid tiny oscillations.
pub const MIN_MOVE_SQ: f32 = 1.0e-8;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;
