//! Orthographic projection.
//!
//! Builds the transform that maps window pixel coordinates onto normalized
//! device coordinates. Stateless: the window recomputes it whenever its
//! viewport size changes.

use bytemuck::{Pod, Zeroable};

use crate::geometry::Extent;

/// A 4×4 matrix in column-major order (OpenGL/WGPU convention).
///
/// `cols[c][r]` is the element at column `c`, row `r`. The layout matches
/// what a uniform upload expects, so the matrix can be handed to a backend
/// with [`bytemuck::bytes_of`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    /// The four columns.
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Builds the pixel-space projection for a viewport: `(0, w) × (0, h)`
    /// with depth range `[-1, 1]`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn for_viewport(viewport: Extent) -> Self {
        orthographic(
            0.0,
            viewport.width as f32,
            0.0,
            viewport.height as f32,
            -1.0,
            1.0,
        )
    }

    /// Transforms a point (with implicit `w = 1`) and applies the perspective divide.
    #[must_use]
    pub fn transform_point(&self, point: [f32; 3]) -> [f32; 3] {
        let v = [point[0], point[1], point[2], 1.0];
        let mut out = [0.0f32; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = self
                .cols
                .iter()
                .zip(v.iter())
                .map(|(col, component)| col[row] * component)
                .sum();
        }
        let w = if out[3] == 0.0 { 1.0 } else { out[3] };
        [out[0] / w, out[1] / w, out[2] / w]
    }

    /// Returns the 16 elements in column-major order.
    #[must_use]
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut flat = [0.0f32; 16];
        for (c, col) in self.cols.iter().enumerate() {
            flat[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        flat
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Builds an orthographic projection mapping the box
/// `[left, right] × [bottom, top] × [near, far]` onto the `[-1, 1]` cube.
///
/// Degenerate boxes (`left == right` and so on) produce non-finite terms;
/// callers validate their dimensions first.
#[must_use]
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;

    let mut m = Mat4 {
        cols: [[0.0; 4]; 4],
    };

    m.cols[0][0] = 2.0 / width;
    m.cols[1][1] = 2.0 / height;
    m.cols[2][2] = -2.0 / depth;

    // Translation column
    m.cols[3][0] = -(right + left) / width;
    m.cols[3][1] = -(top + bottom) / height;
    m.cols[3][2] = -(far + near) / depth;
    m.cols[3][3] = 1.0;

    m
}
