//! Matrix convention helpers.
//!
//! Importers hand matrices over in row-major order (`m[row][col]`), the
//! engine stores column-major [`Mat4`]. Every conversion between the two goes
//! through this module so the transpose happens in exactly one place.

use glam::Mat4;

/// A 4x4 matrix as delivered by the scene importer, `m[row][col]`.
pub type RowMajorMatrix = [[f32; 4]; 4];

/// Row-major identity, handy for building imported scenes by hand.
pub const ROW_MAJOR_IDENTITY: RowMajorMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Converts an importer matrix into the engine's column-major layout.
#[inline]
#[must_use]
pub fn mat4_from_row_major(m: &RowMajorMatrix) -> Mat4 {
    Mat4::from_cols_array_2d(m).transpose()
}

/// Converts an engine matrix back into the importer's row-major layout.
#[inline]
#[must_use]
pub fn mat4_to_row_major(m: &Mat4) -> RowMajorMatrix {
    m.transpose().to_cols_array_2d()
}
