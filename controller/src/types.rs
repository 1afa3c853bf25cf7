/*!
Core data types shared by the controller components.

This module intentionally contains no algorithms. It defines the data exchanged between:
- the terrain sampler (heightmap lookups)
- the ground probe (grounded state, cached probe results)
- the vertical integrator (jump/gravity timers)
- the orchestrator (per-tick input and the committed result)
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;

/// World up axis. The controller is Y-up.
#[inline]
pub fn up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// Capsule specification for the avatar.
///
/// half_height is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Distance from the capsule center down to its lowest point.
    #[inline]
    pub fn bottom_offset(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// Authoritative per-avatar simulation state.
///
/// Only the orchestrator writes `position` and `velocity`. Other components receive
/// `&mut CharacterState` from it for the fields they own (timers, grounded flag).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterState {
    /// Capsule center in world space.
    pub position: Vec3,
    /// Controller-owned velocity. Never read back from an external body.
    pub velocity: Vec3,
    /// Horizontal look angle (radians). Zero faces -Z.
    pub yaw: f32,
    /// Vertical look angle (radians), clamped to the configured pitch limit.
    pub pitch: f32,
    pub is_grounded: bool,
    /// Unit normal of the supporting surface (up when airborne).
    pub ground_normal: Vec3,
    pub slope_angle_deg: f32,
    /// Seconds left in which a jump is still honored after leaving ground.
    pub coyote_timer: f32,
    /// Seconds left in which a queued jump request is still honored.
    pub jump_buffer_timer: f32,
    /// Set when a jump fires, cleared once the avatar is grounded again.
    pub jump_locked: bool,
    /// True while the upward leg of a jump is in progress.
    pub is_jumping: bool,
}

impl CharacterState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            yaw: 0.0,
            pitch: 0.0,
            is_grounded: false,
            ground_normal: up(),
            slope_angle_deg: 0.0,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jump_locked: false,
            is_jumping: false,
        }
    }
}

/// A single terrain lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSample {
    pub height: f32,
    /// Unit normal approximated from a 4-point finite-difference gradient.
    pub normal: Vec3,
}

/// Result of a ground probe, cached between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundProbeResult {
    /// Whether any ground was found within the probe range.
    pub hit: bool,
    /// Gap between the capsule bottom and the ground (meters).
    pub distance: f32,
    /// Unit normal of the ground (up when nothing was hit).
    pub normal: Vec3,
    /// Probe clock (seconds) at which this result was produced.
    pub timestamp: f32,
}

impl GroundProbeResult {
    /// A probe that found nothing.
    pub fn miss(timestamp: f32) -> Self {
        Self {
            hit: false,
            distance: f32::INFINITY,
            normal: up(),
            timestamp,
        }
    }
}

/// One raycast intersection reported by the scene collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the (unit) ray direction.
    pub distance: f32,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// Opaque identifier of the geometry that was hit.
    pub tag: u32,
}

/// Input flags and look delta for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Raw look delta (x = horizontal, y = vertical) since the last tick.
    pub look_delta: Vec2,
}

/// What the orchestrator committed this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub position: Vec3,
    pub yaw: f32,
    pub grounded: bool,
    /// A jump fired this tick.
    pub jumped: bool,
    /// The avatar became grounded this tick.
    pub landed: bool,
    /// Normal of the wall that shortened this tick's horizontal move, if any.
    pub blocked_by: Option<Vec3>,
}
