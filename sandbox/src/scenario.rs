//! Scripted run: a hilly heightmap, one wall, and an input timeline played back at an
//! uneven frame rate.

use std::f32::consts::PI;

use kcc_controller::{
    CharacterController, ColliderShapeDef, ControlInput, ControllerConfig, GridLayout, Heightmap,
    RapierQueryWorld, Vec2, Vec3, WorldStaticDef, rapier_world::rapier3d::na::UnitQuaternion,
};

use crate::{avatar::Avatar, error::SandboxError};

/// Near face of the wall the avatar walks into.
const WALL_FACE_Z: f32 = -14.0;

/// Tag of the avatar's own capsule in the query world.
const AVATAR_ID: u32 = 1000;

/// Frame times cycled through, including a hitch longer than the controller's clamp.
const FRAME_TIMES: [f32; 6] = [1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 1.0 / 60.0, 1.0 / 90.0, 0.2];

struct Phase {
    label: &'static str,
    seconds: f32,
    input: ControlInput,
    /// Look delta per second, scaled by the frame time each tick.
    look_rate: Vec2,
}

impl Phase {
    fn new(label: &'static str, seconds: f32, input: ControlInput) -> Self {
        Self {
            label,
            seconds,
            input,
            look_rate: Vec2::zeros(),
        }
    }

    fn turning(mut self, radians: f32, sensitivity: f32) -> Self {
        self.look_rate = Vec2::new(-radians / (sensitivity * self.seconds), 0.0);
        self
    }
}

#[derive(Debug)]
pub struct Summary {
    pub ticks: u64,
    pub elapsed: f32,
    pub jumps: u32,
    pub landings: u32,
    pub blocked_ticks: u32,
    pub final_position: Vec3,
    pub closest_wall_gap: f32,
}

fn terrain() -> Result<Heightmap, SandboxError> {
    let layout = GridLayout {
        columns: 65,
        rows: 65,
        size: Vec2::new(80.0, 80.0),
        center: Vec2::zeros(),
    };
    let map = Heightmap::from_fn(layout, |x, z| {
        0.4 * (x * 0.15).sin() * (z * 0.1).cos() + 0.25 * (z * 0.2).sin()
    })?;
    Ok(map)
}

fn timeline(sensitivity: f32) -> Vec<Phase> {
    let forward = ControlInput {
        forward: true,
        ..Default::default()
    };
    let forward_jump = ControlInput {
        jump: true,
        ..forward
    };
    let jump = ControlInput {
        jump: true,
        ..Default::default()
    };

    vec![
        Phase::new("settle", 1.0, ControlInput::default()),
        Phase::new("walk", 2.0, forward),
        Phase::new("jump", 0.1, forward_jump),
        Phase::new("into wall", 2.0, forward),
        Phase::new("turn around", 0.5, ControlInput::default()).turning(PI, sensitivity),
        Phase::new("walk back", 2.0, forward),
        Phase::new("hold jump", 1.5, jump),
        Phase::new("idle", 1.0, ControlInput::default()),
    ]
}

pub fn run(config: ControllerConfig) -> Result<Summary, SandboxError> {
    let map = terrain()?;
    let wall = WorldStaticDef::cuboid(
        1,
        Vec3::new(0.0, 1.0, WALL_FACE_Z - 0.5),
        Vec3::new(20.0, 2.0, 0.5),
    );
    let spawn = Vec3::new(0.0, 1.5, 0.0);
    let mut world = RapierQueryWorld::build(vec![wall], Some(&map));
    let config = config.validated();
    world.insert_self_collider(WorldStaticDef {
        id: AVATAR_ID,
        translation: spawn,
        rotation: UnitQuaternion::identity(),
        shape: ColliderShapeDef::CapsuleY {
            radius: config.capsule_radius,
            half_height: config.capsule_half_height,
        },
    });

    let mut controller = CharacterController::new(config, world, spawn);
    controller.bind_heightmap(map);
    controller.attach_sink(Avatar::default());

    let radius = controller.config().capsule_radius;
    let sensitivity = controller.config().look_sensitivity;

    let mut summary = Summary {
        ticks: 0,
        elapsed: 0.0,
        jumps: 0,
        landings: 0,
        blocked_ticks: 0,
        final_position: controller.position(),
        closest_wall_gap: f32::INFINITY,
    };
    let mut frames = FRAME_TIMES.iter().copied().cycle();

    for phase in timeline(sensitivity) {
        log::info!("phase '{}' for {:.1}s", phase.label, phase.seconds);
        let mut remaining = phase.seconds;

        while remaining > 0.0 {
            let dt = frames.next().unwrap_or(1.0 / 60.0).min(remaining.max(1.0e-4));
            remaining -= dt;

            let input = ControlInput {
                look_delta: phase.look_rate * dt,
                ..phase.input
            };
            let Some(report) = controller.tick(&input, dt) else {
                continue;
            };
            controller.raycaster_mut().move_self_collider(report.position);

            summary.ticks += 1;
            summary.elapsed += dt;
            summary.jumps += report.jumped as u32;
            summary.landings += report.landed as u32;
            summary.closest_wall_gap = summary
                .closest_wall_gap
                .min(report.position.z - WALL_FACE_Z - radius);

            if report.jumped {
                log::info!("jumped at {:?}", report.position);
            }
            if report.landed {
                log::info!("landed at {:?}", report.position);
            }
            if let Some(normal) = report.blocked_by {
                summary.blocked_ticks += 1;
                log::debug!("blocked by wall with normal {normal:?}");
            }
            log::debug!(
                "dt={dt:.4} pos={:?} yaw={:.3} grounded={}",
                report.position,
                report.yaw,
                report.grounded
            );
        }
    }

    summary.final_position = controller.position();
    if let Some(avatar) = controller.sink() {
        log::info!("avatar received {} pose commits", avatar.commits);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_run_jumps_lands_and_stops_at_the_wall() {
        let summary = run(ControllerConfig::default()).unwrap();
        assert!(summary.ticks > 0);
        assert!(summary.jumps >= 1);
        assert!(summary.landings >= 1);
        assert!(summary.closest_wall_gap > 0.0, "gap {}", summary.closest_wall_gap);
        assert!(summary.blocked_ticks > 0);
        assert!(summary.final_position.iter().all(|c| c.is_finite()));
    }
}
