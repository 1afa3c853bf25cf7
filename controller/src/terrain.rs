//! Heightmap terrain: grid storage and bilinear sampling.
//!
//! # Model
//! - A terrain is a `columns x rows` grid of height samples covering a rectangle of
//!   `size.x` by `size.y` meters in world XZ, centered on `center`.
//! - Columns run along +X, rows along +Z. Sample (0, 0) sits at the minimum corner.
//! - Samples are stored row-major: `heights[row * columns + col]`.
//!
//! # Sampling
//! World `(x, z)` maps to fractional grid coordinates
//! - `gx = (x - min_x) / size.x * (columns - 1)`
//! - `gz = (z - min_z) / size.y * (rows - 1)`
//!
//! and the four surrounding samples are blended bilinearly. Positions outside the grid
//! have no terrain; callers fall back to raycasting.

use thiserror::Error;

use crate::providers::HeightmapProvider;
use crate::types::{TerrainSample, Vec2, Vec3};

/// Resolution and world placement of a height grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    /// World extent along X (`.x`) and Z (`.y`).
    pub size: Vec2,
    /// World XZ of the grid center.
    pub center: Vec2,
}

impl GridLayout {
    /// World XZ of sample (0, 0).
    #[inline]
    pub fn min_corner(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    /// Spacing between adjacent samples along X and Z.
    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.size.x / (self.columns.max(2) - 1) as f32,
            self.size.y / (self.rows.max(2) - 1) as f32,
        )
    }

    /// Fractional grid coordinates of a world position, `None` outside the grid.
    pub fn to_grid(&self, x: f32, z: f32) -> Option<(f32, f32)> {
        if !x.is_finite() || !z.is_finite() || self.columns < 2 || self.rows < 2 {
            return None;
        }
        let min = self.min_corner();
        let u = (x - min.x) / self.size.x;
        let v = (z - min.y) / self.size.y;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        Some((
            u * (self.columns - 1) as f32,
            v * (self.rows - 1) as f32,
        ))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum HeightmapError {
    #[error("heightmap needs at least 2x2 samples, got {columns}x{rows}")]
    TooSmall { columns: usize, rows: usize },
    #[error("heightmap has {actual} samples but a {columns}x{rows} grid needs {expected}")]
    SampleCount {
        columns: usize,
        rows: usize,
        expected: usize,
        actual: usize,
    },
    #[error("heightmap world size must be positive and finite, got ({x}, {z})")]
    InvalidSize { x: f32, z: f32 },
}

/// In-memory height grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    layout: GridLayout,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Create a heightmap from row-major samples.
    ///
    /// Non-finite samples are kept but reported as absent by [`HeightmapProvider::height`].
    pub fn new(heights: Vec<f32>, layout: GridLayout) -> Result<Self, HeightmapError> {
        let GridLayout { columns, rows, .. } = layout;
        if columns < 2 || rows < 2 {
            return Err(HeightmapError::TooSmall { columns, rows });
        }
        let expected = columns * rows;
        if heights.len() != expected {
            return Err(HeightmapError::SampleCount {
                columns,
                rows,
                expected,
                actual: heights.len(),
            });
        }
        let size = layout.size;
        let valid = |s: f32| s.is_finite() && s > 0.0;
        if !valid(size.x) || !valid(size.y) || !layout.center.iter().all(|c| c.is_finite()) {
            return Err(HeightmapError::InvalidSize {
                x: size.x,
                z: size.y,
            });
        }
        Ok(Self { layout, heights })
    }

    /// A level terrain at `height`.
    pub fn flat(layout: GridLayout, height: f32) -> Result<Self, HeightmapError> {
        Self::new(vec![height; layout.columns * layout.rows], layout)
    }

    /// Build a terrain by evaluating `f(x, z)` at every sample's world position.
    pub fn from_fn<F>(layout: GridLayout, f: F) -> Result<Self, HeightmapError>
    where
        F: Fn(f32, f32) -> f32,
    {
        let min = layout.min_corner();
        let cell = layout.cell_size();
        let mut heights = Vec::with_capacity(layout.columns * layout.rows);
        for row in 0..layout.rows {
            for col in 0..layout.columns {
                let x = min.x + col as f32 * cell.x;
                let z = min.y + row as f32 * cell.y;
                heights.push(f(x, z));
            }
        }
        Self::new(heights, layout)
    }

    /// Raw samples, row-major.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }
}

impl HeightmapProvider for Heightmap {
    fn layout(&self) -> GridLayout {
        self.layout
    }

    fn height(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.layout.columns || row >= self.layout.rows {
            return None;
        }
        self.heights
            .get(row * self.layout.columns + col)
            .copied()
            .filter(|h| h.is_finite())
    }
}

/// Bilinear height and normal lookups over an optionally bound heightmap.
#[derive(Default)]
pub struct TerrainHeightSampler {
    provider: Option<Box<dyn HeightmapProvider>>,
}

impl TerrainHeightSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, provider: Box<dyn HeightmapProvider>) {
        self.provider = Some(provider);
    }

    pub fn unbind(&mut self) -> Option<Box<dyn HeightmapProvider>> {
        self.provider.take()
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.provider.is_some()
    }

    /// Interpolated terrain height at world `(x, z)`.
    ///
    /// Returns `None` when no heightmap is bound, the position lies outside the grid,
    /// or any of the four surrounding samples is absent.
    pub fn sample_height(&self, x: f32, z: f32) -> Option<f32> {
        let provider = self.provider.as_deref()?;
        let layout = provider.layout();
        let (gx, gz) = layout.to_grid(x, z)?;

        // Clamp the base cell so the far edge interpolates inside the last cell.
        let c0 = (gx.floor() as usize).min(layout.columns - 2);
        let r0 = (gz.floor() as usize).min(layout.rows - 2);
        let tx = gx - c0 as f32;
        let tz = gz - r0 as f32;

        let h00 = provider.height(c0, r0)?;
        let h10 = provider.height(c0 + 1, r0)?;
        let h01 = provider.height(c0, r0 + 1)?;
        let h11 = provider.height(c0 + 1, r0 + 1)?;

        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        Some(near + (far - near) * tz)
    }

    /// Surface normal at world `(x, z)` from central differences of the height.
    ///
    /// The gradient is sampled at `±ε` (half a grid cell) along X and Z. Any missing sample
    /// yields `None`.
    pub fn sample_normal(&self, x: f32, z: f32) -> Option<Vec3> {
        let provider = self.provider.as_deref()?;
        let cell = provider.layout().cell_size();
        let eps = 0.5 * cell.x.min(cell.y);
        if !(eps > 0.0) {
            return None;
        }

        let left = self.sample_height(x - eps, z)?;
        let right = self.sample_height(x + eps, z)?;
        let back = self.sample_height(x, z - eps)?;
        let front = self.sample_height(x, z + eps)?;

        let dh_dx = (right - left) / (2.0 * eps);
        let dh_dz = (front - back) / (2.0 * eps);
        Vec3::new(-dh_dx, 1.0, -dh_dz).try_normalize(f32::EPSILON)
    }

    pub fn sample(&self, x: f32, z: f32) -> Option<TerrainSample> {
        let height = self.sample_height(x, z)?;
        let normal = self.sample_normal(x, z)?;
        Some(TerrainSample { height, normal })
    }
}
