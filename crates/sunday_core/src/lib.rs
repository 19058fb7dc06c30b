//! Core utilities and foundational types shared by every Sunday crate.

pub mod errors;
pub mod math;
pub mod scene;

pub use errors::{Result, SundayError};
pub use math::{RowMajorMatrix, mat4_from_row_major, mat4_to_row_major};
