//! Gaussian-weighted interpolation.

use super::neighborhood::{for_each_neighbor, AxisWeights};
use super::trait_::Interpolator;
use crate::image::ImageBuffer;
use crate::spatial::{Point, Vector};

/// Cutoff, in standard deviations, used when none is given.
pub const DEFAULT_GAUSSIAN_ALPHA: f64 = 1.0;

/// Gaussian Interpolator.
///
/// Averages the samples within `alpha` standard deviations of the index,
/// weighted by `exp(-d² / 2σ²)` and normalized by the total weight.
/// `sigma` is in physical units, one per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianInterpolator<const D: usize> {
    sigma: Vector<D>,
    alpha: f64,
}

impl<const D: usize> GaussianInterpolator<D> {
    /// Create a new Gaussian interpolator.
    ///
    /// # Arguments
    /// * `sigma` - Standard deviation per axis, in physical units
    /// * `alpha` - Neighborhood radius in standard deviations
    pub fn new(sigma: Vector<D>, alpha: f64) -> Self {
        Self { sigma, alpha }
    }

    /// Get the standard deviations.
    pub fn sigma(&self) -> &Vector<D> {
        &self.sigma
    }

    /// Get the cutoff.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl<const D: usize> Interpolator<D> for GaussianInterpolator<D> {
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        let axes = gaussian_neighborhood(buffer, cindex, &self.sigma, self.alpha);

        let mut weighted = 0.0;
        let mut total = 0.0;
        for_each_neighbor(&axes, |index, weight| {
            weighted += weight * buffer.value_clamped(index);
            total += weight;
        });

        if total > 0.0 {
            weighted / total
        } else {
            // Every weight underflowed; the nearest sample dominates.
            buffer.value_clamped(&std::array::from_fn(|axis| (cindex[axis] + 0.5).floor() as isize))
        }
    }
}

/// Per-axis Gaussian weights over the samples within `alpha · σ` of `cindex`.
///
/// The range is widened to contain the nearest sample and clipped to the grid.
pub(crate) fn gaussian_neighborhood<const D: usize>(
    buffer: &ImageBuffer<D>,
    cindex: &Point<D>,
    sigma: &Vector<D>,
    alpha: f64,
) -> [AxisWeights; D] {
    let spacing = buffer.geometry().spacing();
    std::array::from_fn(|axis| {
        let x = cindex[axis];
        let sigma_index = sigma[axis] / spacing[axis];
        let radius = alpha * sigma_index;
        let last = buffer.axis_len(axis) as isize - 1;
        let nearest = ((x + 0.5).floor() as isize).clamp(0, last);

        let lo = ((x - radius).ceil() as isize).min(nearest).max(0);
        let hi = ((x + radius).floor() as isize).max(nearest).min(last);

        let denominator = 2.0 * sigma_index * sigma_index;
        let weights = (lo..=hi)
            .map(|i| {
                let d = i as f64 - x;
                (-d * d / denominator).exp()
            })
            .collect();
        AxisWeights::new(lo, weights)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageGeometry;
    use crate::spatial::{Direction, Spacing};

    fn line(values: Vec<f64>, spacing: f64) -> ImageBuffer<1> {
        let geometry = ImageGeometry::new(
            Point::origin(),
            Spacing::uniform(spacing),
            Direction::identity(),
            [values.len()],
        )
        .unwrap();
        ImageBuffer::new(geometry, values).unwrap()
    }

    #[test]
    fn test_constant_image_is_preserved() {
        let buffer = ImageBuffer::filled(ImageGeometry::<2>::with_size([6, 6]), 3.0);
        let interp = GaussianInterpolator::new(Vector::new([1.0, 2.0]), 2.0);
        let value = interp.interpolate(&buffer, &Point::new([2.3, 4.9]));
        assert!((value - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_neighborhood_averages() {
        // radius 1 around index 2 covers 1, 2, 3 with weights e^-0.5, 1, e^-0.5
        let buffer = line(vec![0.0, 10.0, 20.0, 30.0, 40.0], 1.0);
        let interp = GaussianInterpolator::new(Vector::new([1.0]), 1.0);
        let value = interp.interpolate(&buffer, &Point::new([2.0]));
        assert!((value - 20.0).abs() < 1e-9);

        let value = interp.interpolate(&buffer, &Point::new([0.0]));
        let e = (-0.5f64).exp();
        assert!((value - 10.0 * e / (1.0 + e)).abs() < 1e-9);
    }

    #[test]
    fn test_sigma_is_scaled_by_spacing() {
        let buffer = line(vec![0.0, 10.0, 20.0, 30.0], 2.0);
        // sigma 2mm on 2mm spacing is one sample
        let axes = gaussian_neighborhood(&buffer, &Point::new([1.5]), &Vector::new([2.0]), 1.0);
        assert_eq!(axes[0].start, 1);
        assert_eq!(axes[0].weights.len(), 2);
    }

    #[test]
    fn test_tiny_sigma_still_includes_nearest_sample() {
        let buffer = line(vec![1.0, 2.0, 3.0], 1.0);
        let interp = GaussianInterpolator::new(Vector::new([1e-4]), 1.0);
        assert_eq!(interp.interpolate(&buffer, &Point::new([1.3])), 2.0);
    }
}
