pub mod collision;
pub mod config;
pub mod constants;
pub mod motion;
pub mod movement;
pub mod providers;
pub mod rapier_world;
pub mod terrain;
pub mod types;
pub mod utils;

pub use collision::{GroundProbe, GroundSnapper, HorizontalCollisionResolver, SweepResult};
pub use config::ControllerConfig;
pub use motion::{JumpKind, VerticalMotionIntegrator};
pub use movement::CharacterController;
pub use providers::{EmptyScene, HeightmapProvider, RaycastProvider, TransformSink};
pub use rapier_world::{ColliderShapeDef, RapierQueryWorld, TERRAIN_TAG, WorldStaticDef};
pub use terrain::{GridLayout, Heightmap, HeightmapError, TerrainHeightSampler};
pub use types::{
    CapsuleSpec, CharacterState, ControlInput, GroundProbeResult, RayHit, TerrainSample,
    TickReport, Vec2, Vec3,
};
