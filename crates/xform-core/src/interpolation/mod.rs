//! Interpolation types and operations.
//!
//! This module provides interpolation traits and implementations
//! for sampling values at continuous coordinates.

pub mod trait_;
pub mod nearest;
pub mod linear;
pub mod bspline;
pub mod gaussian;
pub mod label_gaussian;
pub mod windowed_sinc;
pub mod kind;
mod neighborhood;

pub use trait_::Interpolator;
pub use nearest::NearestNeighborInterpolator;
pub use linear::LinearInterpolator;
pub use bspline::BSplineInterpolator;
pub use gaussian::GaussianInterpolator;
pub use label_gaussian::{LabelGaussianInterpolator, LabelValue};
pub use windowed_sinc::{WindowFunction, WindowedSincInterpolator};
pub use kind::InterpolatorKind;

use crate::image::{ImageBuffer, ImageGeometry};
use crate::spatial::Point;

/// Every supported interpolation strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation<const D: usize> {
    NearestNeighbor(NearestNeighborInterpolator),
    Linear(LinearInterpolator),
    BSpline(BSplineInterpolator),
    Gaussian(GaussianInterpolator<D>),
    MultiLabel(LabelGaussianInterpolator<D>),
    WindowedSinc(WindowedSincInterpolator),
}

impl<const D: usize> Interpolator<D> for Interpolation<D> {
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        match self {
            Interpolation::NearestNeighbor(i) => i.interpolate(buffer, cindex),
            Interpolation::Linear(i) => i.interpolate(buffer, cindex),
            Interpolation::BSpline(i) => i.interpolate(buffer, cindex),
            Interpolation::Gaussian(i) => i.interpolate(buffer, cindex),
            Interpolation::MultiLabel(i) => i.interpolate(buffer, cindex),
            Interpolation::WindowedSinc(i) => i.interpolate(buffer, cindex),
        }
    }
}

/// An interpolation strategy bound to the samples of one image.
///
/// Created by [`InterpolatorKind::bind`]. For B-splines the buffer holds the
/// precomputed coefficients rather than the raw samples.
#[derive(Debug, Clone)]
pub struct BoundInterpolator<const D: usize> {
    interpolation: Interpolation<D>,
    buffer: ImageBuffer<D>,
}

impl<const D: usize> BoundInterpolator<D> {
    pub fn new(interpolation: Interpolation<D>, buffer: ImageBuffer<D>) -> Self {
        Self { interpolation, buffer }
    }

    /// Value at a continuous index inside the bound image's domain.
    pub fn evaluate(&self, cindex: &Point<D>) -> f64 {
        self.interpolation.interpolate(&self.buffer, cindex)
    }

    /// Geometry of the bound image.
    pub fn geometry(&self) -> &ImageGeometry<D> {
        self.buffer.geometry()
    }

    pub fn interpolation(&self) -> &Interpolation<D> {
        &self.interpolation
    }

    pub fn buffer(&self) -> &ImageBuffer<D> {
        &self.buffer
    }
}
