//! Transform trait for spatial coordinate transformations.
//!
//! This module defines the core Transform trait that all spatial transforms must implement.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::SpatialTransform;
use crate::spatial::Point;

/// Transform trait for spatial coordinate transformations.
///
/// Maps points from one physical space to another. Transforms are
/// immutable once constructed and shared read-only across resampling
/// workers, hence the `Send + Sync` bound.
///
/// # Type Parameters
/// * `D` - The spatial dimensionality
pub trait Transform<const D: usize>: Send + Sync {
    /// Apply the forward mapping to a single physical point.
    fn transform_point(&self, point: &Point<D>) -> Point<D>;

    /// Apply the forward mapping to a batch of points.
    ///
    /// # Arguments
    /// * `points` - A tensor of shape `[Batch, D]`
    ///
    /// # Returns
    /// A tensor of shape `[Batch, D]` containing transformed points
    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2>;

    /// Class name reported in the transform listing, e.g. `AffineTransform`.
    fn type_name(&self) -> &'static str;

    /// Get the inverse transform (if available).
    ///
    /// Not all transforms are invertible, so this returns an Option.
    fn inverse(&self) -> Option<SpatialTransform<D>> {
        None
    }
}
