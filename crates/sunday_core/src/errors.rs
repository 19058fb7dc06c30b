//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`SundayError`] covers all failure modes of the
//! skinning pipeline:
//! - Reading and writing the binary mesh file format
//! - Importing skinned scenes and their animations
//! - Loading import settings
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, SundayError>`.
//!
//! ```rust,ignore
//! use sunday_core::errors::{SundayError, Result};
//!
//! fn load_asset() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Sunday engine.
#[derive(Error, Debug)]
pub enum SundayError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Mesh File Errors
    // ========================================================================
    /// The mesh file carries a version tag this build cannot read.
    #[error("Unsupported mesh file version: {0:#06x}")]
    UnsupportedMeshFileVersion(u16),

    /// The mesh file ended in the middle of a record.
    #[error("Truncated mesh file while reading {context}")]
    TruncatedMeshFile {
        /// The record or field that was being read
        context: String,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("Invalid string in {context}")]
    InvalidString {
        /// The field that held the string
        context: String,
    },

    // ========================================================================
    // Import Errors
    // ========================================================================
    /// Animation index out of bounds.
    #[error("Animation index {index} out of bounds (source has {count} animations)")]
    AnimationIndexOutOfBounds {
        /// The requested clip index
        index: usize,
        /// Number of clips in the source
        count: usize,
    },

    /// The imported scene is malformed.
    #[error("Import error: {0}")]
    ImportError(String),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SundayError {
    /// Shorthand for [`SundayError::TruncatedMeshFile`].
    pub fn truncated(context: impl Into<String>) -> Self {
        SundayError::TruncatedMeshFile {
            context: context.into(),
        }
    }
}

/// Alias for `Result<T, SundayError>`.
pub type Result<T> = std::result::Result<T, SundayError>;
