/*!
Collision root module.

The controller never hands motion to a physics solver. Each tick it queries the scene
through the collaborator traits and resolves the capsule itself:

- ground:    ground probe (heightmap, multi-ray fallback, result cache) and walkability
- kinematic: horizontal sweep that clips a displacement against scene geometry
- snap:      smooth vertical correction onto the ground while grounded
*/

pub mod ground;
pub mod kinematic;
pub mod snap;

pub use ground::{GroundProbe, apply_ground_state, is_walkable};
pub use kinematic::{HorizontalCollisionResolver, SweepResult};
pub use snap::{GroundSnapper, surface_height};
