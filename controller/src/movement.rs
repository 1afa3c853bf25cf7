use std::f32::consts::{PI, TAU};

use crate::{
    collision::{
        GroundProbe, GroundSnapper, HorizontalCollisionResolver, apply_ground_state,
        surface_height,
    },
    config::ControllerConfig,
    motion::{JumpKind, VerticalMotionIntegrator},
    providers::{HeightmapProvider, RaycastProvider, TransformSink},
    terrain::TerrainHeightSampler,
    types::{CharacterState, ControlInput, GroundProbeResult, TickReport, Vec3, up},
    utils::{finite_or, move_direction, sanitize_delta_time, sanitize_look_delta},
};

/// Kinematic character controller for one avatar.
///
/// Owns the authoritative [`CharacterState`] and is its only writer. Each [`tick`] runs a
/// fixed pipeline:
///
/// input -> look rotation -> ground probe -> vertical integration -> horizontal sweep
/// -> snapped position -> commit to the transform sink.
///
/// The controller does nothing until a transform sink is attached with
/// [`attach_sink`], and nothing while disabled. Either way the state is left exactly as
/// it was, so re-enabling never introduces a jump or a fall.
///
/// [`tick`]: CharacterController::tick
/// [`attach_sink`]: CharacterController::attach_sink
pub struct CharacterController<R, S> {
    config: ControllerConfig,
    state: CharacterState,
    raycaster: R,
    sink: Option<S>,
    terrain: TerrainHeightSampler,
    probe: GroundProbe,
    integrator: VerticalMotionIntegrator,
    resolver: HorizontalCollisionResolver,
    snapper: GroundSnapper,
    last_probe: Option<GroundProbeResult>,
    enabled: bool,
}

impl<R: RaycastProvider, S: TransformSink> CharacterController<R, S> {
    /// Create a controller at `spawn`. The config is validated once here.
    ///
    /// A non-finite spawn position falls back to the origin.
    pub fn new(config: ControllerConfig, raycaster: R, spawn: Vec3) -> Self {
        let spawn = if spawn.iter().all(|c| c.is_finite()) {
            spawn
        } else {
            log::warn!("spawn position {spawn:?} is not finite, spawning at origin");
            Vec3::zeros()
        };

        Self {
            config: config.validated(),
            state: CharacterState::new(spawn),
            raycaster,
            sink: None,
            terrain: TerrainHeightSampler::new(),
            probe: GroundProbe::new(),
            integrator: VerticalMotionIntegrator,
            resolver: HorizontalCollisionResolver,
            snapper: GroundSnapper,
            last_probe: None,
            enabled: true,
        }
    }

    /// Bind the transform sink and commit the current pose to it.
    ///
    /// Returns the previously attached sink, if any.
    pub fn attach_sink(&mut self, mut sink: S) -> Option<S> {
        sink.set_position(self.state.position);
        sink.set_yaw(self.state.yaw);
        log::debug!("transform sink attached at {:?}", self.state.position);
        self.sink.replace(sink)
    }

    pub fn detach_sink(&mut self) -> Option<S> {
        self.sink.take()
    }

    /// Whether a transform sink is attached. Ticks are ignored until it is.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.sink.is_some()
    }

    /// Read the sink's position back into state (e.g. after the host moved the avatar).
    ///
    /// Non-finite positions are ignored. Returns whether state changed.
    pub fn resync_from_sink(&mut self) -> bool {
        let Some(sink) = self.sink.as_ref() else {
            return false;
        };
        let position = sink.position();
        if !position.iter().all(|c| c.is_finite()) {
            log::warn!("transform sink reported non-finite position {position:?}, keeping state");
            return false;
        }
        self.state.position = position;
        self.probe.invalidate();
        true
    }

    /// Move the avatar instantly, dropping any velocity, and commit it.
    pub fn teleport(&mut self, position: Vec3) {
        self.state.position = finite_or(position, self.state.position);
        self.state.velocity = Vec3::zeros();
        self.state.is_jumping = false;
        self.probe.invalidate();
        if let Some(sink) = self.sink.as_mut() {
            sink.set_position(self.state.position);
        }
    }

    pub fn bind_heightmap<H: HeightmapProvider + 'static>(&mut self, heightmap: H) {
        let layout = heightmap.layout();
        log::debug!(
            "heightmap bound: {}x{} samples over {:?}",
            layout.columns,
            layout.rows,
            layout.size
        );
        self.terrain.bind(Box::new(heightmap));
        self.probe.invalidate();
    }

    pub fn unbind_heightmap(&mut self) -> Option<Box<dyn HeightmapProvider>> {
        self.probe.invalidate();
        let previous = self.terrain.unbind();
        if previous.is_some() {
            log::debug!("heightmap unbound, ground queries fall back to raycasts");
        }
        previous
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.state.yaw
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.state.is_grounded
    }

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Most recent ground probe, cached or fresh.
    #[inline]
    pub fn last_probe(&self) -> Option<&GroundProbeResult> {
        self.last_probe.as_ref()
    }

    pub fn raycaster(&self) -> &R {
        &self.raycaster
    }

    /// Mutable scene access for hosts that keep the avatar's own collider in it.
    pub fn raycaster_mut(&mut self) -> &mut R {
        &mut self.raycaster
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Run one simulation tick.
    ///
    /// Returns `None` (and leaves state untouched) while disabled, before a sink is
    /// attached, or when `delta_time` sanitizes to zero.
    pub fn tick(&mut self, input: &ControlInput, delta_time: f32) -> Option<TickReport> {
        if !self.enabled || self.sink.is_none() {
            return None;
        }
        if !delta_time.is_finite() {
            log::warn!("non-finite delta time {delta_time}, skipping tick");
        }
        let dt = sanitize_delta_time(delta_time, self.config.max_delta_time);
        if dt <= 0.0 {
            return None;
        }

        let cfg = self.config;

        // 1) Look rotation. Pitch is clamped, yaw wrapped to (-PI, PI].
        let look = sanitize_look_delta(input.look_delta);
        if look != input.look_delta {
            log::warn!("non-finite look delta {:?} ignored", input.look_delta);
        }
        let max_pitch = cfg.max_pitch_deg.to_radians();
        self.state.yaw = wrap_angle(self.state.yaw - look.x * cfg.look_sensitivity);
        self.state.pitch =
            (self.state.pitch - look.y * cfg.look_sensitivity).clamp(-max_pitch, max_pitch);

        // 2-3) Planar move direction from yaw only.
        let direction = move_direction(input, self.state.yaw);

        // 4) Ground state, exactly once per tick.
        let probe = self.probe.probe(
            &cfg,
            &self.terrain,
            &self.raycaster,
            self.state.position,
            dt,
        );
        self.last_probe = Some(probe);
        let was_grounded = apply_ground_state(&cfg, &mut self.state, &probe, dt);

        // 5) Vertical velocity.
        let jump = self
            .integrator
            .integrate(&cfg, &mut self.state, input.jump, dt);

        // 6) Horizontal displacement, clipped against geometry.
        let speed = if self.state.is_grounded {
            cfg.move_speed
        } else {
            cfg.move_speed * cfg.air_control
        };
        let sweep = self.resolver.resolve(
            &cfg,
            &self.raycaster,
            self.state.position,
            direction * speed * dt,
        );
        let horizontal = Vec3::new(sweep.allowed.x, 0.0, sweep.allowed.z);

        // 7) Vertical displacement; a fall never ends below the surface under the capsule.
        let after_horizontal = self.state.position + horizontal;
        let dy = self.limit_fall(after_horizontal, self.state.velocity.y * dt);

        // 8) Snap while resting on the ground.
        let moved = after_horizontal + up() * dy;
        let resting = self.state.is_grounded && !self.state.is_jumping;
        let snapped = self
            .snapper
            .snap(&cfg, &self.terrain, &self.raycaster, moved, resting);

        let next = finite_or(snapped, self.state.position);
        self.state.velocity.x = horizontal.x / dt;
        self.state.velocity.z = horizontal.z / dt;
        self.state.position = next;

        // 9) Commit.
        if let Some(sink) = self.sink.as_mut() {
            sink.set_position(next);
            sink.set_yaw(self.state.yaw);
        }

        log::trace!(
            "tick dt={dt:.4} pos={:?} vel={:?} grounded={} clipped={} coyote={:.3} buffer={:.3}",
            self.state.position,
            self.state.velocity,
            self.state.is_grounded,
            sweep.clipped,
            self.state.coyote_timer,
            self.state.jump_buffer_timer
        );

        Some(TickReport {
            position: next,
            yaw: self.state.yaw,
            grounded: self.state.is_grounded,
            jumped: jump.is_some(),
            landed: self.state.is_grounded && !was_grounded,
            blocked_by: sweep.hit_normal,
        })
    }

    /// Shorten a downward step so the capsule bottom stops on the highest surface below it.
    ///
    /// Never raises the capsule; lifting back out of the ground is the snapper's job.
    fn limit_fall(&self, position: Vec3, dy: f32) -> f32 {
        if dy >= 0.0 {
            return dy;
        }

        let bottom_offset = self.config.capsule().bottom_offset();
        let Some(floor) =
            surface_height(&self.terrain, &self.raycaster, position, bottom_offset - dy)
        else {
            return dy;
        };

        let rest_y = (floor + bottom_offset).min(position.y);
        (position.y + dy).max(rest_y) - position.y
    }

    /// Jump kind that would fire if jump were pressed now. Used by hosts for UI hints.
    pub fn jump_available(&self) -> Option<JumpKind> {
        let s = &self.state;
        if s.jump_locked || s.velocity.y > 0.0 {
            return None;
        }
        if s.is_grounded {
            Some(JumpKind::Grounded)
        } else if s.coyote_timer > 0.0 {
            Some(JumpKind::Coyote)
        } else {
            None
        }
    }
}

#[inline]
fn wrap_angle(a: f32) -> f32 {
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI { PI } else { wrapped }
}
