//! Rapier-backed scene for the controller's raycasts.
//!
//! Builds an in-memory Rapier scene from static collider definitions and, optionally, a
//! heightfield mirroring the bound [`Heightmap`]. The scene is immutable after
//! construction and only used for queries; nothing is ever simulated.
//!
//! Every collider carries its definition `id` in `user_data`, which comes back as
//! [`RayHit::tag`].

// Re-export Rapier so hosts can build poses and shapes without depending on it directly.
pub use rapier3d;

use rapier3d::na::{DMatrix, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::{
    providers::{HeightmapProvider, RaycastProvider},
    terrain::Heightmap,
    types::{RayHit, Vec3},
};

/// Tag reported for hits on the terrain heightfield.
pub const TERRAIN_TAG: u32 = u32::MAX;

/// Definition of one immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - For planes the normal is `rotation * +Y` and the plane passes through
///   `translation + normal * offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable identifier; also the hit tag.
    pub id: u32,
    pub translation: Vector<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    /// Axis-aligned box centered at `center`.
    pub fn cuboid(id: u32, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            id,
            translation: center,
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Cuboid { half_extents },
        }
    }

    /// Horizontal ground plane at height `y`.
    pub fn ground_plane(id: u32, y: f32) -> Self {
        Self {
            id,
            translation: Vec3::new(0.0, y, 0.0),
            rotation: UnitQuaternion::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite half-space below the plane.
    Plane { offset_along_normal: f32 },
    Cuboid { half_extents: Vector<f32> },
    Sphere { radius: f32 },
    CapsuleY { radius: f32, half_height: f32 },
    CylinderY { radius: f32, half_height: f32 },
}

/// Static Rapier scene answering the controller's raycasts.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    self_collider: Option<ColliderHandle>,
}

impl RapierQueryWorld {
    /// Build the scene from `defs` (inserted in `id` order) and an optional terrain.
    pub fn build(mut defs: Vec<WorldStaticDef>, terrain: Option<&Heightmap>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs.iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());
            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        if let Some(map) = terrain {
            let layout = map.layout();
            let iso = Isometry::translation(layout.center.x, 0.0, layout.center.y);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());
            colliders.insert_with_parent(heightfield_collider(map), rb_handle, &mut bodies);
            log::debug!(
                "terrain heightfield {}x{} added to query world",
                layout.columns,
                layout.rows
            );
        }

        let mut world = Self {
            bodies,
            colliders,
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            self_collider: None,
        };
        world.refresh();

        log::info!("query world built with {} colliders", world.colliders.len());
        world
    }

    /// Register the avatar's own collider. Casts with `exclude_self` skip it.
    ///
    /// Only one self collider exists; once registered, later calls return its handle.
    pub fn insert_self_collider(&mut self, def: WorldStaticDef) -> ColliderHandle {
        if let Some(existing) = self.self_collider {
            log::warn!("self collider already registered, ignoring {}", def.id);
            return existing;
        }

        let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
        let rb_handle = self
            .bodies
            .insert(RigidBodyBuilder::kinematic_position_based().pose(iso).build());
        let handle =
            self.colliders
                .insert_with_parent(collider_from_def(&def), rb_handle, &mut self.bodies);
        self.self_collider = Some(handle);
        self.refresh();

        log::debug!("self collider {} registered at {:?}", def.id, def.translation);
        handle
    }

    /// Move the registered self collider to `translation`.
    pub fn move_self_collider(&mut self, translation: Vec3) {
        let Some(parent) = self
            .self_collider
            .and_then(|h| self.colliders.get(h))
            .and_then(|c| c.parent())
        else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(parent) {
            body.set_translation(translation, false);
        }
        self.refresh();
    }

    #[inline]
    pub fn self_collider(&self) -> Option<ColliderHandle> {
        self.self_collider
    }

    /// Collision detection only: brings the broad-phase BVH up to date so queries see
    /// every collider at its current pose.
    fn refresh(&mut self) {
        CollisionPipeline::new().step(
            0.0,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &(),
            &(),
        );
    }

    /// Borrowed `QueryPipeline` over the scene.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    fn tag_of(&self, handle: ColliderHandle) -> u32 {
        self.colliders
            .get(handle)
            .map(|c| c.user_data as u32)
            .unwrap_or(0)
    }
}

impl RaycastProvider for RapierQueryWorld {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_self: bool,
    ) -> Vec<RayHit> {
        let Some(dir) = direction.try_normalize(1.0e-6) else {
            return Vec::new();
        };
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Vec::new();
        }

        let mut filter = QueryFilter::default();
        if exclude_self {
            if let Some(handle) = self.self_collider {
                filter = filter.exclude_collider(handle);
            }
        }

        let ray = Ray::new(Point::from(origin), dir);
        self.query_pipeline(filter)
            .cast_ray_and_get_normal(&ray, max_distance, true)
            .map(|(handle, hit)| RayHit {
                distance: hit.time_of_impact,
                normal: hit.normal,
                tag: self.tag_of(handle),
            })
            .into_iter()
            .collect()
    }
}

fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // Collider is parented to the pose, so the plane is expressed in local space.
            let halfspace = HalfSpace::new(Vector::y_axis());
            ColliderBuilder::new(SharedShape::new(halfspace))
                .translation(Vector::y() * *offset_along_normal)
        }
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder.user_data(def.id as u128).build()
}

/// Heightfield matching `map`: rows run along +Z, columns along +X.
fn heightfield_collider(map: &Heightmap) -> Collider {
    let layout = map.layout();
    // Absent samples become flat ground at zero rather than poisoning the BVH.
    let heights = DMatrix::from_fn(layout.rows, layout.columns, |row, col| {
        map.height(col, row).unwrap_or(0.0)
    });
    let scale = Vector::new(layout.size.x, 1.0, layout.size.y);
    ColliderBuilder::heightfield(heights, scale)
        .user_data(TERRAIN_TAG as u128)
        .build()
}
