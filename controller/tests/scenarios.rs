use std::cell::Cell;

use kcc_controller::{
    CharacterController, ControlInput, ControllerConfig, EmptyScene, GridLayout, GroundProbe,
    Heightmap, RayHit, RaycastProvider, TerrainHeightSampler, TickReport, TransformSink, Vec2,
    Vec3,
};

const DT: f32 = 1.0 / 60.0;
const REST_Y: f32 = 0.9;

#[derive(Default)]
struct Avatar {
    position: Vec3,
    yaw: f32,
}

impl TransformSink for Avatar {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }
}

/// Horizontal floor at y = 0 that only exists for `x <= edge_x`.
struct Ledge {
    edge_x: f32,
}

impl RaycastProvider for Ledge {
    fn cast(&self, origin: Vec3, dir: Vec3, max: f32, _: bool) -> Vec<RayHit> {
        if dir.y >= -1.0e-6 || origin.x > self.edge_x {
            return Vec::new();
        }
        let t = origin.y / -dir.y;
        if t < 0.0 || t > max {
            return Vec::new();
        }
        vec![RayHit {
            distance: t,
            normal: Vec3::y(),
            tag: 1,
        }]
    }
}

/// Wall plane `x = x` facing -X. Only horizontal rays can hit it.
struct Wall {
    x: f32,
}

impl RaycastProvider for Wall {
    fn cast(&self, origin: Vec3, dir: Vec3, max: f32, _: bool) -> Vec<RayHit> {
        if dir.x <= 1.0e-6 {
            return Vec::new();
        }
        let t = (self.x - origin.x) / dir.x;
        if t < 0.0 || t > max {
            return Vec::new();
        }
        vec![RayHit {
            distance: t,
            normal: Vec3::new(-1.0, 0.0, 0.0),
            tag: 2,
        }]
    }
}

/// Top face of a platform at `top`, seen by downward rays only.
struct Platform {
    top: f32,
}

impl RaycastProvider for Platform {
    fn cast(&self, origin: Vec3, dir: Vec3, max: f32, _: bool) -> Vec<RayHit> {
        if dir.y >= -1.0e-6 {
            return Vec::new();
        }
        let t = (origin.y - self.top) / -dir.y;
        if t < 0.0 || t > max {
            return Vec::new();
        }
        vec![RayHit {
            distance: t,
            normal: Vec3::y(),
            tag: 3,
        }]
    }
}

/// Floor at y = 0 everywhere, counting casts.
#[derive(Default)]
struct CountingFloor {
    casts: Cell<usize>,
}

impl RaycastProvider for CountingFloor {
    fn cast(&self, origin: Vec3, dir: Vec3, max: f32, _: bool) -> Vec<RayHit> {
        self.casts.set(self.casts.get() + 1);
        if dir.y >= -1.0e-6 {
            return Vec::new();
        }
        let t = origin.y / -dir.y;
        if t < 0.0 || t > max {
            return Vec::new();
        }
        vec![RayHit {
            distance: t,
            normal: Vec3::y(),
            tag: 0,
        }]
    }
}

fn layout() -> GridLayout {
    GridLayout {
        columns: 33,
        rows: 33,
        size: Vec2::new(64.0, 64.0),
        center: Vec2::zeros(),
    }
}

fn controller_with<R: RaycastProvider>(
    raycaster: R,
    terrain: Option<Heightmap>,
    spawn: Vec3,
) -> CharacterController<R, Avatar> {
    configured(ControllerConfig::default(), raycaster, terrain, spawn)
}

fn configured<R: RaycastProvider>(
    config: ControllerConfig,
    raycaster: R,
    terrain: Option<Heightmap>,
    spawn: Vec3,
) -> CharacterController<R, Avatar> {
    let mut c = CharacterController::new(config, raycaster, spawn);
    if let Some(map) = terrain {
        c.bind_heightmap(map);
    }
    c.attach_sink(Avatar::default());
    c
}

fn flat_ground(spawn: Vec3) -> CharacterController<EmptyScene, Avatar> {
    controller_with(EmptyScene, Some(Heightmap::flat(layout(), 0.0).unwrap()), spawn)
}

fn tick(c: &mut CharacterController<impl RaycastProvider, Avatar>, input: ControlInput) -> TickReport {
    c.tick(&input, DT).expect("controller is attached and enabled")
}

fn idle() -> ControlInput {
    ControlInput::default()
}

fn jump() -> ControlInput {
    ControlInput {
        jump: true,
        ..Default::default()
    }
}

fn right() -> ControlInput {
    ControlInput {
        right: true,
        ..Default::default()
    }
}

#[test]
fn flat_spawn_rests_without_drift() {
    let mut c = flat_ground(Vec3::new(0.0, REST_Y, 0.0));
    for _ in 0..60 {
        let report = tick(&mut c, idle());
        assert!(report.grounded);
    }
    assert!((c.position().y - REST_Y).abs() < 1.0e-5, "y = {}", c.position().y);
    assert_eq!(c.state().velocity.y, 0.0);
    assert!(c.is_grounded());
    assert_eq!(c.sink().map(|a| a.yaw), Some(c.yaw()));
}

#[test]
fn free_fall_reaches_expected_velocity() {
    let mut c = controller_with(EmptyScene, None, Vec3::new(0.0, 100.0, 0.0));
    for _ in 0..30 {
        assert!(!tick(&mut c, idle()).grounded);
    }
    assert!((c.state().velocity.y + 10.0).abs() < 1.0e-3, "vy = {}", c.state().velocity.y);
    assert!(c.position().y < 100.0);
}

#[test]
fn slope_classification_follows_max_slope() {
    let walkable = 30.0f32.to_radians().tan();
    let map = Heightmap::from_fn(layout(), |x, _| x * walkable).unwrap();
    let mut c = controller_with(EmptyScene, Some(map), Vec3::new(0.0, REST_Y, 0.0));
    assert!(tick(&mut c, idle()).grounded);
    assert!((c.state().slope_angle_deg - 30.0).abs() < 0.1);

    let steep = 60.0f32.to_radians().tan();
    let map = Heightmap::from_fn(layout(), |x, _| x * steep).unwrap();
    let mut c = controller_with(EmptyScene, Some(map), Vec3::new(0.0, REST_Y, 0.0));
    assert!(!tick(&mut c, idle()).grounded);
}

/// Walk right off the ledge and return the controller on its first airborne tick.
fn walk_off_ledge_with(config: ControllerConfig) -> CharacterController<Ledge, Avatar> {
    let mut c = configured(config, Ledge { edge_x: 0.0 }, None, Vec3::new(-1.0, REST_Y, 0.0));
    assert!(tick(&mut c, right()).grounded);

    for _ in 0..120 {
        if !tick(&mut c, right()).grounded {
            return c;
        }
    }
    panic!("never left the ledge");
}

fn walk_off_ledge() -> CharacterController<Ledge, Avatar> {
    walk_off_ledge_with(ControllerConfig::default())
}

/// Jump `k` ticks after the first airborne tick.
fn late_jump(config: ControllerConfig, k: usize) -> TickReport {
    let mut c = walk_off_ledge_with(config);
    for _ in 1..k {
        assert!(!tick(&mut c, idle()).grounded);
    }
    tick(&mut c, jump())
}

#[test]
fn coyote_jump_inside_window() {
    let mut c = walk_off_ledge();
    let report = tick(&mut c, jump());
    assert!(!report.grounded);
    assert!(report.jumped);
    assert!(c.state().velocity.y > 0.0);
}

#[test]
fn coyote_jump_after_window_is_refused() {
    let mut c = walk_off_ledge();
    for _ in 0..12 {
        tick(&mut c, idle());
    }
    let report = tick(&mut c, jump());
    assert!(!report.jumped);
    assert!(c.state().velocity.y < 0.0);
}

#[test]
fn coyote_window_boundary() {
    // 0.14 s keeps the boundary away from an exact multiple of the tick.
    let config = ControllerConfig {
        coyote_time: 0.14,
        ..Default::default()
    };
    // 8 ticks = 0.133 s, inside the window.
    assert!(late_jump(config, 8).jumped);
    // 9 ticks = 0.15 s, past it.
    assert!(!late_jump(config, 9).jumped);
}

#[test]
fn buffered_jump_fires_on_landing() {
    let mut c = flat_ground(Vec3::new(0.0, REST_Y + 2.0, 0.0));

    // Fall until just above the ground, press once, then release.
    let mut pressed = false;
    for _ in 0..120 {
        if c.position().y - REST_Y < 0.45 {
            pressed = true;
            assert!(!tick(&mut c, jump()).jumped);
            break;
        }
        tick(&mut c, idle());
    }
    assert!(pressed);

    let mut jumped = false;
    for _ in 0..4 {
        let report = tick(&mut c, idle());
        if report.jumped {
            jumped = true;
            break;
        }
    }
    assert!(jumped);
}

#[test]
fn early_press_expires_before_landing() {
    let mut c = flat_ground(Vec3::new(0.0, REST_Y + 2.0, 0.0));
    // 2 m fall takes ~0.45 s, far longer than the buffer.
    assert!(!tick(&mut c, jump()).jumped);
    for _ in 0..90 {
        assert!(!tick(&mut c, idle()).jumped);
    }
    assert!(c.is_grounded());
}

#[test]
fn held_jump_fires_once() {
    let mut c = flat_ground(Vec3::new(0.0, REST_Y, 0.0));
    let jumps = (0..25).filter(|_| tick(&mut c, jump()).jumped).count();
    assert_eq!(jumps, 1);
}

#[test]
fn walking_into_a_wall_never_penetrates() {
    let wall_x = 2.0;
    let mut c = controller_with(
        Wall { x: wall_x },
        Some(Heightmap::flat(layout(), 0.0).unwrap()),
        Vec3::new(0.0, REST_Y, 0.0),
    );
    let mut last = None;
    for _ in 0..120 {
        let report = tick(&mut c, right());
        assert!(report.position.x < wall_x);
        last = Some(report);
    }
    assert_eq!(last.and_then(|r| r.blocked_by), Some(Vec3::new(-1.0, 0.0, 0.0)));
    let cfg = c.config();
    let stop = wall_x - cfg.capsule_radius - cfg.skin;
    assert!((c.position().x - stop).abs() < 1.0e-4, "x = {}", c.position().x);
}

#[test]
fn platform_above_terrain_supports_the_avatar() {
    let mut c = controller_with(
        Platform { top: 1.0 },
        Some(Heightmap::flat(layout(), 0.0).unwrap()),
        Vec3::new(0.0, 1.0 + REST_Y, 0.0),
    );
    for _ in 0..60 {
        assert!(tick(&mut c, idle()).grounded);
    }
    assert!((c.position().y - (1.0 + REST_Y)).abs() < 1.0e-4, "y = {}", c.position().y);
}

#[test]
fn snap_converges_geometrically() {
    let delta = 0.1;
    let mut c = flat_ground(Vec3::new(0.0, REST_Y + delta, 0.0));
    let s = c.config().ground_snap_speed;

    let mut previous = delta;
    for n in 1..=8 {
        let report = tick(&mut c, idle());
        assert!(report.grounded);
        let offset = c.position().y - REST_Y;
        let expected = delta * (1.0 - s).powi(n);
        assert!((offset - expected).abs() < 1.0e-5, "tick {n}: {offset} vs {expected}");
        assert!(offset.abs() < previous.abs());
        previous = offset;
    }
}

#[test]
fn probe_cache_is_idempotent() {
    let cfg = ControllerConfig::default();
    let terrain = TerrainHeightSampler::new();
    let floor = CountingFloor::default();
    let mut probe = GroundProbe::new();

    let a = probe.probe(&cfg, &terrain, &floor, Vec3::new(0.0, REST_Y + 0.05, 0.0), DT);
    let casts = floor.casts.get();
    let b = probe.probe(&cfg, &terrain, &floor, Vec3::new(0.001, REST_Y + 0.05, 0.0), 0.01);

    assert!(a.hit);
    assert_eq!(a, b);
    assert_eq!(floor.casts.get(), casts);
}

#[test]
fn disabled_ticks_leave_state_alone() {
    let mut c = flat_ground(Vec3::new(0.0, REST_Y + 1.0, 0.0));
    tick(&mut c, idle());
    let before = *c.state();

    c.set_enabled(false);
    assert!(c.tick(&jump(), DT).is_none());
    assert_eq!(*c.state(), before);
}
