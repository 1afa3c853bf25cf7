/*!
Ground detection and grounded-state bookkeeping.

`GroundProbe` answers "how far below the capsule is the ground" from a short-lived cache,
the bound heightmap or a fan of downward rays. `apply_ground_state` folds that answer into
the character state (grounded flag, slope, coyote timer, jump lock).
*/

use crate::{
    config::ControllerConfig,
    providers::RaycastProvider,
    terrain::TerrainHeightSampler,
    types::{CharacterState, GroundProbeResult, RayHit, Vec3, up},
    utils::slope_angle_deg,
};

/// Last probe result together with the position it was taken at.
#[derive(Clone, Copy, Debug)]
struct CachedProbe {
    position: Vec3,
    result: GroundProbeResult,
}

/// Ground detection for the capsule.
///
/// Tiers, cheapest first:
/// 1. Reuse the cached result if the capsule barely moved and the cache is fresh.
/// 2. Compare the capsule bottom against the bound heightmap.
/// 3. Cast five parallel rays down against scene geometry (center plus four side
///    offsets) and take the closest hit, averaging normals of near-equal hits.
///
/// The probe keeps its own clock, advanced by the `dt` passed to [`GroundProbe::probe`],
/// so cache ages are measured in simulation time.
#[derive(Debug, Default)]
pub struct GroundProbe {
    cache: Option<CachedProbe>,
    clock: f32,
}

impl GroundProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cached result, e.g. after a teleport or a terrain rebind.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Probe for ground below the capsule centered at `position`.
    pub fn probe<R: RaycastProvider + ?Sized>(
        &mut self,
        cfg: &ControllerConfig,
        terrain: &TerrainHeightSampler,
        raycaster: &R,
        position: Vec3,
        dt: f32,
    ) -> GroundProbeResult {
        self.clock += dt.max(0.0);

        if let Some(cached) = self.cache {
            let moved = (position - cached.position).norm();
            let age = self.clock - cached.result.timestamp;
            if moved < cfg.cache_position_threshold
                && age < cfg.cache_validity
                && cached.result.distance < cfg.ground_ray_distance
            {
                return cached.result;
            }
        }

        let result = match self.probe_heightmap(cfg, terrain, position) {
            Some(near) if near.distance < cfg.ground_ray_distance => near,
            // Terrain absent or too far below: let scene geometry answer. If nothing is hit,
            // a far terrain sample still carries the true gap.
            far => self
                .probe_rays(cfg, raycaster, position)
                .or(far)
                .unwrap_or_else(|| GroundProbeResult::miss(self.clock)),
        };

        self.cache = Some(CachedProbe { position, result });
        result
    }

    /// Heightmap tier: gap between the capsule bottom and the terrain under its center.
    fn probe_heightmap(
        &self,
        cfg: &ControllerConfig,
        terrain: &TerrainHeightSampler,
        position: Vec3,
    ) -> Option<GroundProbeResult> {
        let height = terrain.sample_height(position.x, position.z)?;
        let bottom = position.y - cfg.capsule().bottom_offset();
        let normal = terrain
            .sample_normal(position.x, position.z)
            .unwrap_or_else(up);

        Some(GroundProbeResult {
            hit: true,
            distance: bottom - height,
            normal,
            timestamp: self.clock,
        })
    }

    /// Raycast tier: five parallel downward rays from the capsule center line.
    fn probe_rays<R: RaycastProvider + ?Sized>(
        &self,
        cfg: &ControllerConfig,
        raycaster: &R,
        position: Vec3,
    ) -> Option<GroundProbeResult> {
        let capsule = cfg.capsule();
        let bottom_offset = capsule.bottom_offset();
        let max_distance = bottom_offset + cfg.ground_ray_distance;
        let side = capsule.radius * cfg.probe_offset_fraction;
        let down = -up();

        let offsets = [
            Vec3::zeros(),
            Vec3::new(side, 0.0, 0.0),
            Vec3::new(-side, 0.0, 0.0),
            Vec3::new(0.0, 0.0, side),
            Vec3::new(0.0, 0.0, -side),
        ];

        let hits: Vec<RayHit> = offsets
            .iter()
            .flat_map(|offset| raycaster.cast(position + offset, down, max_distance, true))
            .filter(|hit| is_valid_hit(hit, max_distance))
            .collect();

        let closest = hits
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))?;

        // Average near-equal hits so a seam between two faces doesn't flicker the normal.
        let summed: Vec3 = hits
            .iter()
            .filter(|h| h.distance - closest.distance <= cfg.normal_average_tolerance)
            .map(|h| h.normal)
            .sum();
        let normal = summed
            .try_normalize(f32::EPSILON)
            .or_else(|| closest.normal.try_normalize(f32::EPSILON))
            .unwrap_or_else(up);

        Some(GroundProbeResult {
            hit: true,
            distance: closest.distance - bottom_offset,
            normal,
            timestamp: self.clock,
        })
    }
}

fn is_valid_hit(hit: &RayHit, max_distance: f32) -> bool {
    hit.distance.is_finite()
        && hit.distance >= 0.0
        && hit.distance <= max_distance
        && hit.normal.iter().all(|c| c.is_finite())
}

/// Whether a probe result counts as walkable support.
///
/// Grounded only if the gap is below the ground-ray distance and the surface is no steeper
/// than the configured max slope.
pub fn is_walkable(cfg: &ControllerConfig, result: &GroundProbeResult) -> bool {
    result.hit
        && result.distance < cfg.ground_ray_distance
        && slope_angle_deg(&result.normal) <= cfg.max_slope_deg
}

/// Fold a probe result into the character state.
///
/// - An ascending jump suppresses support until vertical velocity stops being positive.
/// - Grounded: coyote timer refreshed, jump lock released.
/// - Leaving the ground (without jumping): coyote timer set to its maximum.
/// - Airborne afterwards: coyote timer counts down.
///
/// Returns the previous grounded flag.
pub fn apply_ground_state(
    cfg: &ControllerConfig,
    state: &mut CharacterState,
    result: &GroundProbeResult,
    dt: f32,
) -> bool {
    let was_grounded = state.is_grounded;

    if state.is_jumping && state.velocity.y <= 0.0 {
        state.is_jumping = false;
    }
    let grounded = is_walkable(cfg, result) && !state.is_jumping;

    state.is_grounded = grounded;
    if grounded {
        state.ground_normal = result.normal;
        state.slope_angle_deg = slope_angle_deg(&result.normal);
        state.coyote_timer = cfg.coyote_time;
        state.jump_locked = false;
    } else {
        state.ground_normal = up();
        state.slope_angle_deg = 0.0;
        // The window opens at full length on the tick support is lost, unless a jump left it.
        state.coyote_timer = if was_grounded && !state.is_jumping {
            cfg.coyote_time
        } else {
            (state.coyote_timer - dt).max(0.0)
        };
    }

    if grounded != was_grounded {
        if grounded {
            log::debug!("landed at y={:.3} (slope {:.1} deg)", state.position.y, state.slope_angle_deg);
        } else {
            log::debug!("left ground at y={:.3}", state.position.y);
        }
    }

    was_grounded
}
