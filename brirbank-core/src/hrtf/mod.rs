//! HRTF sets: loading, defaults and nearest-direction lookup

mod container;
mod provider;

pub use container::{read_hrtf_set, write_hrtf_set, HRTF_CONTAINER_EXTENSION};
pub use provider::{default_hrtf_file, provide, HrtfProvider, DEFAULT_HRTF_PROFILES};

use crate::error::{BrirBankError, Result};
use crate::math::{direction, Vec3};
use std::sync::Arc;

/// A measured direction of the HRTF grid, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPosition {
    pub azimuth: f32,
    pub colatitude: f32,
}

impl GridPosition {
    pub fn new(azimuth: f32, colatitude: f32) -> Self {
        Self {
            azimuth,
            colatitude,
        }
    }

    pub fn from_degrees(azimuth: f32, colatitude: f32) -> Self {
        Self::new(azimuth.to_radians(), colatitude.to_radians())
    }

    pub fn direction(&self) -> Vec3 {
        direction(self.azimuth, self.colatitude)
    }
}

/// Builds a regular grid with the given steps in degrees.
///
/// Colatitude runs from 0° to 180° inclusive; the poles carry a single position.
pub fn regular_grid(azimuth_step_deg: u32, colatitude_step_deg: u32) -> Vec<GridPosition> {
    let azimuth_step = azimuth_step_deg.clamp(1, 360);
    let colatitude_step = colatitude_step_deg.clamp(1, 180);

    let mut grid = Vec::new();
    for colatitude in (0..=180).step_by(colatitude_step as usize) {
        if colatitude == 0 || colatitude == 180 {
            grid.push(GridPosition::from_degrees(0.0, colatitude as f32));
            continue;
        }
        for azimuth in (0..360).step_by(azimuth_step as usize) {
            grid.push(GridPosition::from_degrees(azimuth as f32, colatitude as f32));
        }
    }
    grid
}

/// Left/right head-related impulse responses on a spatial grid.
///
/// Immutable once built and cheap to clone; worker threads of the orientation
/// sweep share one instance.
#[derive(Debug, Clone)]
pub struct HrtfSet {
    inner: Arc<HrtfSetInner>,
}

#[derive(Debug)]
struct HrtfSetInner {
    /// Grid-major: position `g` occupies `g * ir_len..(g + 1) * ir_len`
    left: Vec<f32>,
    right: Vec<f32>,
    grid: Vec<GridPosition>,
    /// Unit vectors of `grid`, cached for the nearest-direction search
    directions: Vec<Vec3>,
    ir_len: usize,
    sample_rate: u32,
}

impl HrtfSet {
    /// Builds a set from per-position rows.
    ///
    /// Every row of `left` and `right` must have the same, non-zero length and
    /// there must be exactly one row per grid position.
    pub fn new(
        left: Vec<Vec<f32>>,
        right: Vec<Vec<f32>>,
        grid: Vec<GridPosition>,
        sample_rate: u32,
    ) -> Result<Self> {
        if left.len() != grid.len() || right.len() != grid.len() {
            return Err(BrirBankError::HrtfFormat(format!(
                "Row count mismatch: {} left, {} right, {} grid positions",
                left.len(),
                right.len(),
                grid.len()
            )));
        }
        if grid.is_empty() {
            return Err(BrirBankError::HrtfFormat(
                "HRTF set has no grid positions".to_string(),
            ));
        }

        let ir_len = left[0].len();
        if ir_len == 0 {
            return Err(BrirBankError::HrtfFormat(
                "HRTF impulse responses are empty".to_string(),
            ));
        }
        if let Some(row) = left.iter().chain(right.iter()).position(|r| r.len() != ir_len) {
            return Err(BrirBankError::HrtfFormat(format!(
                "Impulse response {} has a different length than the first ({})",
                row, ir_len
            )));
        }

        Ok(Self::from_flat(
            left.concat(),
            right.concat(),
            grid,
            ir_len,
            sample_rate,
        ))
    }

    pub(crate) fn from_flat(
        left: Vec<f32>,
        right: Vec<f32>,
        grid: Vec<GridPosition>,
        ir_len: usize,
        sample_rate: u32,
    ) -> Self {
        debug_assert_eq!(left.len(), grid.len() * ir_len);
        debug_assert_eq!(right.len(), grid.len() * ir_len);

        let directions = grid.iter().map(GridPosition::direction).collect();
        Self {
            inner: Arc::new(HrtfSetInner {
                left,
                right,
                grid,
                directions,
                ir_len,
                sample_rate,
            }),
        }
    }

    /// Synthetic set with a unit impulse at sample 0 for every grid position.
    pub fn identity(grid: Vec<GridPosition>, ir_len: usize, sample_rate: u32) -> Result<Self> {
        if grid.is_empty() || ir_len == 0 {
            return Err(BrirBankError::HrtfFormat(
                "Identity HRTF set needs at least one grid position and one sample".to_string(),
            ));
        }
        let impulses = identity_rows(grid.len(), ir_len);
        Ok(Self::from_flat(
            impulses.clone(),
            impulses,
            grid,
            ir_len,
            sample_rate,
        ))
    }

    /// Replaces both ears by unit impulses, keeping grid, length and sample rate.
    pub fn into_dummy(self) -> Self {
        let impulses = identity_rows(self.grid_len(), self.ir_len());
        Self::from_flat(
            impulses.clone(),
            impulses,
            self.inner.grid.clone(),
            self.inner.ir_len,
            self.inner.sample_rate,
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    /// Number of samples of every impulse response.
    pub fn ir_len(&self) -> usize {
        self.inner.ir_len
    }

    pub fn grid_len(&self) -> usize {
        self.inner.grid.len()
    }

    pub fn grid(&self) -> &[GridPosition] {
        &self.inner.grid
    }

    pub fn left(&self, index: usize) -> &[f32] {
        let len = self.inner.ir_len;
        &self.inner.left[index * len..(index + 1) * len]
    }

    pub fn right(&self, index: usize) -> &[f32] {
        let len = self.inner.ir_len;
        &self.inner.right[index * len..(index + 1) * len]
    }

    /// Index of the grid position closest to `(azimuth, colatitude)`.
    pub fn nearest(&self, azimuth: f32, colatitude: f32) -> usize {
        self.nearest_to(direction(azimuth, colatitude))
    }

    /// Index of the grid position closest to a unit direction.
    ///
    /// Largest dot product wins; on ties the lowest index is kept.
    pub fn nearest_to(&self, target: Vec3) -> usize {
        let mut best = 0;
        let mut best_dot = f32::NEG_INFINITY;
        for (index, dir) in self.inner.directions.iter().enumerate() {
            let dot = dir.dot(target);
            if dot > best_dot {
                best_dot = dot;
                best = index;
            }
        }
        best
    }

    /// `(left, right)` impulse responses closest to `(azimuth, colatitude)`.
    pub fn nearest_pair(&self, azimuth: f32, colatitude: f32) -> (&[f32], &[f32]) {
        let index = self.nearest(azimuth, colatitude);
        (self.left(index), self.right(index))
    }

    pub(crate) fn left_flat(&self) -> &[f32] {
        &self.inner.left
    }

    pub(crate) fn right_flat(&self) -> &[f32] {
        &self.inner.right
    }
}

fn identity_rows(positions: usize, ir_len: usize) -> Vec<f32> {
    let mut rows = vec![0.0f32; positions * ir_len];
    for row in rows.chunks_exact_mut(ir_len) {
        row[0] = 1.0;
    }
    rows
}
