/*!
Horizontal sweep.

A single ray along the requested move keeps the capsule `radius + skin` away from any wall
it would otherwise reach this tick.
*/

use crate::{
    config::ControllerConfig,
    constants::MIN_MOVE_SQ,
    providers::RaycastProvider,
    types::Vec3,
};

/// Result of a horizontal sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepResult {
    /// Displacement that can be applied without entering geometry.
    pub allowed: Vec3,
    /// Whether the sweep was shortened by a hit.
    pub clipped: bool,
    /// Normal of the blocking surface, if any.
    pub hit_normal: Option<Vec3>,
}

/// Sweep-tests a horizontal displacement with one ray from the capsule center.
///
/// Algorithm:
/// - Cast along the move direction for `|delta| + radius + skin`.
/// - If the closest hit leaves less than `radius + skin` of clearance at the end of the
///   move, shorten the move to `max(0, hit - radius - skin)` keeping its direction.
///
/// The clipped distance is never larger than `hit - skin`, so the capsule center cannot
/// cross the wall plane however large the requested step is.
#[derive(Clone, Copy, Debug, Default)]
pub struct HorizontalCollisionResolver;

impl HorizontalCollisionResolver {
    pub fn resolve<R: RaycastProvider + ?Sized>(
        &self,
        cfg: &ControllerConfig,
        raycaster: &R,
        position: Vec3,
        desired: Vec3,
    ) -> SweepResult {
        let unchanged = SweepResult {
            allowed: desired,
            clipped: false,
            hit_normal: None,
        };

        let len_sq = desired.norm_squared();
        if len_sq <= MIN_MOVE_SQ || !len_sq.is_finite() {
            return unchanged;
        }

        let len = len_sq.sqrt();
        let dir = desired / len;
        let clearance = cfg.capsule_radius + cfg.skin;

        let closest = raycaster
            .cast(position, dir, len + clearance, true)
            .into_iter()
            .filter(|h| h.distance.is_finite() && h.distance >= 0.0)
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        let Some(hit) = closest else {
            return unchanged;
        };

        let travel = (hit.distance - clearance).max(0.0);
        if travel >= len {
            return unchanged;
        }

        SweepResult {
            allowed: dir * travel,
            clipped: true,
            hit_normal: Some(hit.normal),
        }
    }
}
