//! Collaborator interfaces implemented by the scene/physics layer.
//!
//! The controller never searches the scene for what it needs. Hosts hand these in
//! explicitly: the raycaster at construction, the transform sink via
//! `CharacterController::attach_sink` and the heightmap via `bind_heightmap`.

use crate::terrain::GridLayout;
use crate::types::{RayHit, Vec3};

/// Regular grid of terrain heights.
///
/// World-to-grid mapping and interpolation are done by
/// [`TerrainHeightSampler`](crate::terrain::TerrainHeightSampler); providers only answer
/// for grid samples.
pub trait HeightmapProvider {
    fn layout(&self) -> GridLayout;

    /// Height stored at grid sample (`col`, `row`), or `None` when unavailable.
    fn height(&self, col: usize, row: usize) -> Option<f32>;
}

/// Synchronous ray queries against static scene geometry.
pub trait RaycastProvider {
    /// Cast a ray from `origin` along the unit vector `direction`.
    ///
    /// Returns every hit within `max_distance`, in no particular order. When `exclude_self`
    /// is set, the avatar's own geometry must not be reported. An empty result means
    /// "no information", never an error.
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, exclude_self: bool)
    -> Vec<RayHit>;
}

/// Where the committed pose goes every tick.
pub trait TransformSink {
    fn set_position(&mut self, position: Vec3);

    /// Current position of the external transform. Only read when resyncing.
    fn position(&self) -> Vec3;

    fn set_yaw(&mut self, yaw: f32);
}

impl<T: HeightmapProvider + ?Sized> HeightmapProvider for Box<T> {
    fn layout(&self) -> GridLayout {
        (**self).layout()
    }

    fn height(&self, col: usize, row: usize) -> Option<f32> {
        (**self).height(col, row)
    }
}

impl<T: RaycastProvider + ?Sized> RaycastProvider for &T {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_self: bool,
    ) -> Vec<RayHit> {
        (**self).cast(origin, direction, max_distance, exclude_self)
    }
}

impl<T: RaycastProvider + ?Sized> RaycastProvider for Box<T> {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_self: bool,
    ) -> Vec<RayHit> {
        (**self).cast(origin, direction, max_distance, exclude_self)
    }
}

/// A scene with no geometry at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl RaycastProvider for EmptyScene {
    fn cast(&self, _: Vec3, _: Vec3, _: f32, _: bool) -> Vec<RayHit> {
        Vec::new()
    }
}
