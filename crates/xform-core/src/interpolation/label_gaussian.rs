//! Label-preserving Gaussian interpolation for categorical images.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::gaussian::gaussian_neighborhood;
use super::neighborhood::for_each_neighbor;
use super::trait_::Interpolator;
use crate::image::ImageBuffer;
use crate::spatial::{Point, Vector};

/// Cutoff, in standard deviations, used when none is given.
pub const DEFAULT_LABEL_ALPHA: f64 = 4.0;

/// A label with `C` components, totally ordered lexicographically.
///
/// Components compare with [`f64::total_cmp`], so every value (including NaN)
/// has a place in the order and vote ties resolve deterministically.
#[derive(Debug, Clone, Copy)]
pub struct LabelValue<const C: usize>(pub [f64; C]);

impl<const C: usize> PartialEq for LabelValue<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<const C: usize> Eq for LabelValue<C> {}

impl<const C: usize> PartialOrd for LabelValue<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const C: usize> Ord for LabelValue<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| a.total_cmp(b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

/// Label image Gaussian interpolator.
///
/// Uses the neighborhood and weights of [`GaussianInterpolator`](super::GaussianInterpolator),
/// but accumulates the weight of each distinct label and returns the label
/// with the greatest mass. Exact ties go to the smallest label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGaussianInterpolator<const D: usize> {
    sigma: Vector<D>,
    alpha: f64,
}

impl<const D: usize> LabelGaussianInterpolator<D> {
    /// Create a new label interpolator.
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

impl<const D: usize> Interpolator<D> for LabelGaussianInterpolator<D> {
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        let axes = gaussian_neighborhood(buffer, cindex, &self.sigma, self.alpha);

        let mut votes: BTreeMap<LabelValue<1>, f64> = BTreeMap::new();
        for_each_neighbor(&axes, |index, weight| {
            let label = LabelValue([buffer.value_clamped(index)]);
            *votes.entry(label).or_insert(0.0) += weight;
        });

        let mut winner: Option<(LabelValue<1>, f64)> = None;
        for (label, mass) in votes {
            match winner {
                Some((_, best)) if mass <= best => {}
                _ => winner = Some((label, mass)),
            }
        }

        match winner {
            Some((label, _)) => label.0[0],
            None => buffer.value_clamped(&std::array::from_fn(|axis| (cindex[axis] + 0.5).floor() as isize)),
        }
    }
}
