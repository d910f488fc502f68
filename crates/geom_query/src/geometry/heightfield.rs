//! Height field geometry
//!
//! A height field is a regular grid of height samples spanning the local
//! XZ plane: sample `(row, col)` sits at `(row * row_scale, height *
//! height_scale, col * column_scale)`. Because the grid is regular there
//! is no candidate-index collaborator here: queries clamp their bounds
//! into the grid and enumerate the overlapped cells directly, and a point
//! can be tested against the sampled surface height before any per-cell
//! feature search.

use super::aabb::Aabb;
use super::shape::GeometryError;
use super::triangle::{Triangle, TriangleFlags};
use crate::foundation::math::Vec3;
use std::sync::Arc;

/// Shared height sample grid.
///
/// Row-major storage: `heights[row * columns + col]`. Rows advance along
/// local X, columns along local Z.
#[derive(Debug)]
pub struct HeightFieldData {
    rows: u32,
    columns: u32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightFieldData {
    /// Validate and share a sample grid
    pub fn new(rows: u32, columns: u32, heights: Vec<f32>) -> Result<Arc<Self>, GeometryError> {
        if rows < 2 || columns < 2 {
            return Err(GeometryError::BadGridDimensions { rows, columns });
        }
        let expected = rows as usize * columns as usize;
        if heights.len() != expected {
            return Err(GeometryError::SampleCountMismatch {
                expected,
                got: heights.len(),
            });
        }
        let mut min_height = f32::MAX;
        let mut max_height = f32::MIN;
        for (i, h) in heights.iter().enumerate() {
            if !h.is_finite() {
                return Err(GeometryError::NonFiniteSample(i));
            }
            min_height = min_height.min(*h);
            max_height = max_height.max(*h);
        }
        Ok(Arc::new(Self {
            rows,
            columns,
            heights,
            min_height,
            max_height,
        }))
    }

    /// Number of sample rows (local X)
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of sample columns (local Z)
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Raw sample at `(row, col)`
    pub fn height(&self, row: u32, col: u32) -> f32 {
        self.heights[row as usize * self.columns as usize + col as usize]
    }

    /// Smallest raw sample
    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Largest raw sample
    pub fn max_height(&self) -> f32 {
        self.max_height
    }
}

/// A height field with its scales applied: the shape the queries see.
///
/// Cells are indexed `cell = row * (columns - 1) + col`; each cell splits
/// into two triangles, id `cell * 2` (the corner at the low row/column)
/// and `cell * 2 + 1`. Triangle windings face +Y.
#[derive(Debug, Clone, Copy)]
pub struct HeightFieldView<'a> {
    /// The shared sample grid
    pub data: &'a HeightFieldData,
    /// Spacing between rows (local X)
    pub row_scale: f32,
    /// Spacing between columns (local Z)
    pub column_scale: f32,
    /// Multiplier applied to samples (local Y)
    pub height_scale: f32,
}

impl<'a> HeightFieldView<'a> {
    /// Scaled position of sample `(row, col)`
    pub fn vertex(&self, row: u32, col: u32) -> Vec3 {
        Vec3::new(
            row as f32 * self.row_scale,
            self.data.height(row, col) * self.height_scale,
            col as f32 * self.column_scale,
        )
    }

    /// Total triangle count
    pub fn triangle_count(&self) -> u32 {
        (self.data.rows() - 1) * (self.data.columns() - 1) * 2
    }

    /// Triangle `id` in scaled local space.
    ///
    /// Grid-interior edges (the ones shared with a neighboring triangle)
    /// are inactive; only edges on the field boundary stay active.
    pub fn triangle(&self, id: u32) -> Triangle {
        let cells_per_row = self.data.columns() - 1;
        let cell = id / 2;
        let row = cell / cells_per_row;
        let col = cell % cells_per_row;
        let p00 = self.vertex(row, col);
        let p01 = self.vertex(row, col + 1);
        let p10 = self.vertex(row + 1, col);
        let p11 = self.vertex(row + 1, col + 1);

        if id % 2 == 0 {
            // Lower triangle: (r,c), (r,c+1), (r+1,c); the diagonal edge is internal
            let mut flags = TriangleFlags::empty();
            if row == 0 {
                flags |= TriangleFlags::EDGE01_ACTIVE;
            }
            if col == 0 {
                flags |= TriangleFlags::EDGE20_ACTIVE;
            }
            Triangle::with_flags(p00, p01, p10, flags)
        } else {
            // Upper triangle: (r+1,c), (r,c+1), (r+1,c+1)
            let mut flags = TriangleFlags::empty();
            if row + 1 == self.data.rows() - 1 {
                flags |= TriangleFlags::EDGE20_ACTIVE;
            }
            if col + 1 == self.data.columns() - 1 {
                flags |= TriangleFlags::EDGE12_ACTIVE;
            }
            Triangle::with_flags(p10, p01, p11, flags)
        }
    }

    /// Scaled local bounds of the whole field
    pub fn local_bounds(&self) -> Aabb {
        Aabb::new(
            Vec3::new(0.0, self.data.min_height() * self.height_scale, 0.0),
            Vec3::new(
                (self.data.rows() - 1) as f32 * self.row_scale,
                self.data.max_height() * self.height_scale,
                (self.data.columns() - 1) as f32 * self.column_scale,
            ),
        )
    }

    /// Surface height under a local XZ position, or None outside the grid.
    ///
    /// Interpolates over the triangle of the cell the point falls in, so
    /// the result matches the triangles the narrow phase tests.
    pub fn sample_height(&self, x: f32, z: f32) -> Option<f32> {
        let fr = x / self.row_scale;
        let fc = z / self.column_scale;
        if fr < 0.0 || fc < 0.0 {
            return None;
        }
        let max_row = (self.data.rows() - 2) as f32;
        let max_col = (self.data.columns() - 2) as f32;
        let row = fr.floor().min(max_row);
        let col = fc.floor().min(max_col);
        if fr > max_row + 1.0 || fc > max_col + 1.0 {
            return None;
        }
        let u = fr - row; // along rows (X)
        let v = fc - col; // along columns (Z)
        let (row, col) = (row as u32, col as u32);
        let h00 = self.data.height(row, col);
        let h01 = self.data.height(row, col + 1);
        let h10 = self.data.height(row + 1, col);
        let h11 = self.data.height(row + 1, col + 1);
        // The cell diagonal runs from (r,c+1) to (r+1,c): u + v == 1
        let height = if u + v <= 1.0 {
            h00 + (h10 - h00) * u + (h01 - h00) * v
        } else {
            h11 + (h01 - h11) * (1.0 - u) + (h10 - h11) * (1.0 - v)
        };
        Some(height * self.height_scale)
    }

    /// Visit ids of triangles whose cells overlap `bounds` (scaled local
    /// space). Returning `false` from the visitor aborts the walk.
    pub fn for_each_in_bounds(&self, bounds: &Aabb, visit: &mut dyn FnMut(u32) -> bool) {
        let field = self.local_bounds();
        if !bounds.intersects(&field) {
            return;
        }
        if bounds.min.y > field.max.y || bounds.max.y < field.min.y {
            return;
        }
        let cells_per_row = self.data.columns() - 1;
        let last_row_cell = self.data.rows() - 2;
        let last_col_cell = cells_per_row - 1;
        let row_lo = ((bounds.min.x / self.row_scale).floor().max(0.0) as u32).min(last_row_cell);
        let row_hi = ((bounds.max.x / self.row_scale).floor().max(0.0) as u32).min(last_row_cell);
        let col_lo =
            ((bounds.min.z / self.column_scale).floor().max(0.0) as u32).min(last_col_cell);
        let col_hi =
            ((bounds.max.z / self.column_scale).floor().max(0.0) as u32).min(last_col_cell);
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let cell = row * cells_per_row + col;
                if !visit(cell * 2) || !visit(cell * 2 + 1) {
                    return;
                }
            }
        }
    }
}
