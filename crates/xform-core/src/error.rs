//! Error types for transform loading, configuration, and resampling.
//!
//! Every error is fatal to a resampling run: nothing is retried and no
//! partial output is produced.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving transforms into a chain.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Neither the displacement-field reader nor the generic reader
    /// could load the file.
    #[error("Unreadable transform {path}: {reason}")]
    UnreadableTransform { path: PathBuf, reason: String },

    /// An inverse was requested for a transform that has none.
    #[error("Inverse does not exist for {name}")]
    NoInverseAvailable { name: String },
}

impl TransformError {
    /// Create an unreadable-transform error.
    pub fn unreadable(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::UnreadableTransform {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a missing-inverse error.
    pub fn no_inverse(name: impl Into<String>) -> Self {
        Self::NoInverseAvailable { name: name.into() }
    }
}

/// Errors in user-supplied options.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The interpolation name is not one of the supported strategies.
    #[error("Unrecognized interpolation option: {0}")]
    UnknownInterpolator(String),

    /// An interpolator parameter could not be parsed or is out of range.
    #[error("Invalid parameter for {interpolator} interpolation: {reason}")]
    InvalidInterpolatorParameter { interpolator: String, reason: String },

    /// A required option was not given.
    #[error("Missing required input: {0}")]
    MissingRequiredInput(&'static str),

    /// Only 2, 3 and 4 dimensional images are supported.
    #[error("Unsupported dimension: {0}")]
    UnsupportedDimension(usize),

    /// A transform argument did not match `path` or `[path,useInverse]`.
    #[error("Invalid transform specification: {0}")]
    InvalidTransformSpec(String),
}

impl ConfigError {
    /// Create an invalid interpolator parameter error.
    pub fn invalid_parameter(interpolator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInterpolatorParameter {
            interpolator: interpolator.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error for a resampling run.
#[derive(Error, Debug)]
pub enum ResampleError {
    /// A file could not be read or written.
    #[error("I/O error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Transform chain construction failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Invalid option values.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Image geometry violates the spacing/direction invariants.
    #[error("Invalid image geometry: {0}")]
    InvalidGeometry(String),

    /// Tensor data could not be converted to host samples.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;

impl ResampleError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an invalid geometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}
