//! Error types for redactmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for redactmatch operations.
pub type RedactResult<T> = std::result::Result<T, RedactError>;

/// Errors that can occur while loading, matching or redacting images.
///
/// Only run-aborting conditions are represented here. Per-template problems
/// (undecodable file, template larger than the scene, infeasible scale) are
/// handled where they occur and never surface as an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedactError {
    /// Image dimensions are zero or overflow the addressable range.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Backing buffer is shorter than `width * height`.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A configuration value is outside its accepted range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// The scene image is missing or cannot be decoded.
    #[error("cannot read scene {path:?}: {reason}")]
    SceneUnreadable { path: PathBuf, reason: String },
    /// The template directory is missing or cannot be listed.
    #[error("cannot read template directory {path:?}: {reason}")]
    CatalogUnreadable { path: PathBuf, reason: String },
    /// Decoding or encoding through the `image` crate failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
    /// The output image could not be persisted.
    #[error("cannot write output {path:?}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },
}

