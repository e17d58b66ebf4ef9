//! Interpolator trait for sampling values at continuous coordinates.
//!
//! This module defines the core Interpolator trait that all interpolation methods must implement.

use crate::image::ImageBuffer;
use crate::spatial::Point;

/// Interpolator trait for sampling values at continuous coordinates.
///
/// Interpolators reconstruct an image value at a non-integer index, which is
/// the inner step of every resampling operation.
///
/// # Type Parameters
/// * `D` - The spatial dimensionality
pub trait Interpolator<const D: usize>: Send + Sync {
    /// Interpolate a value from `buffer` at a continuous index.
    ///
    /// # Arguments
    /// * `buffer` - Source samples (B-spline coefficients for [`BSplineInterpolator`](super::BSplineInterpolator))
    /// * `cindex` - Continuous index, x first. Callers only pass indices
    ///   that lie inside the buffer's domain.
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64;
}
