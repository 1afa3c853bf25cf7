/*!
Ground snapping.

Pulls a grounded capsule toward its resting height on the highest surface below it.
*/

use crate::{
    config::ControllerConfig,
    providers::RaycastProvider,
    terrain::TerrainHeightSampler,
    types::{Vec3, up},
};

/// Keeps a grounded capsule resting on the surface.
///
/// - Airborne: the position is returned untouched so jump and fall arcs are not disturbed.
/// - Grounded: the target center height is the supporting surface height plus the capsule
///   bottom offset. The supporting surface is the higher of the terrain height and the
///   closest geometry hit of a downward ray from the center, so a box standing on the
///   terrain holds the capsule up.
/// - The current height moves toward the target by `ground_snap_speed` of the remaining
///   error each tick, so small height discontinuities do not pop.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroundSnapper;

impl GroundSnapper {
    pub fn snap<R: RaycastProvider + ?Sized>(
        &self,
        cfg: &ControllerConfig,
        terrain: &TerrainHeightSampler,
        raycaster: &R,
        position: Vec3,
        is_grounded: bool,
    ) -> Vec3 {
        if !is_grounded {
            return position;
        }

        let Some(target_y) = self.target_height(cfg, terrain, raycaster, position) else {
            return position;
        };

        let t = cfg.ground_snap_speed.clamp(0.0, 1.0);
        let y = position.y + (target_y - position.y) * t;
        Vec3::new(position.x, y, position.z)
    }

    /// Center height at which the capsule bottom rests on the ground, if known.
    pub fn target_height<R: RaycastProvider + ?Sized>(
        &self,
        cfg: &ControllerConfig,
        terrain: &TerrainHeightSampler,
        raycaster: &R,
        position: Vec3,
    ) -> Option<f32> {
        let bottom_offset = cfg.capsule().bottom_offset();
        let reach = bottom_offset + cfg.ground_ray_distance;
        surface_height(terrain, raycaster, position, reach).map(|h| h + bottom_offset)
    }
}

/// Highest surface under `position`: terrain height, or geometry hit by a downward ray
/// from `position` within `reach`, whichever is higher.
pub fn surface_height<R: RaycastProvider + ?Sized>(
    terrain: &TerrainHeightSampler,
    raycaster: &R,
    position: Vec3,
    reach: f32,
) -> Option<f32> {
    let terrain_y = terrain.sample_height(position.x, position.z);
    let geometry_y = raycaster
        .cast(position, -up(), reach, true)
        .into_iter()
        .map(|h| h.distance)
        .filter(|d| d.is_finite() && *d >= 0.0 && *d <= reach)
        .min_by(f32::total_cmp)
        .map(|d| position.y - d);

    match (terrain_y, geometry_y) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
