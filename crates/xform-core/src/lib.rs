//! Spatial transforms, interpolation and resampling for N-dimensional images.
//!
//! An output grid is filled by mapping each of its voxels through a chain of
//! transforms into an input image and interpolating the input there.

pub mod error;
pub mod spatial;
pub mod image;
pub mod transform;
pub mod interpolation;
pub mod filter;

pub use error::{ConfigError, ResampleError, Result, TransformError};
pub use image::{Image, ImageBuffer, ImageGeometry};
pub use spatial::{Direction, Point, Spacing, Vector};
pub use transform::{CompositeTransform, SpatialTransform, Transform, TransformChainBuilder, TransformSpec};
pub use interpolation::{Interpolator, InterpolatorKind};
pub use filter::ResampleImageFilter;
