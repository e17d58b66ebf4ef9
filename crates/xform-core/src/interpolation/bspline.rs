//! B-Spline interpolation implementation.
//!
//! Interpolation happens in two stages. [`BSplineInterpolator::coefficients`]
//! turns the samples into B-spline coefficients with a separable recursive
//! filter, then [`Interpolator::interpolate`] evaluates the spline from those
//! coefficients. Both stages use mirror boundaries, so the spline passes
//! through every sample.

use smallvec::smallvec;

use super::neighborhood::{for_each_neighbor, AxisWeights};
use super::trait_::Interpolator;
use crate::image::ImageBuffer;
use crate::spatial::Point;

/// Highest supported spline order.
pub const MAX_SPLINE_ORDER: usize = 5;

/// Spline order used when none is given.
pub const DEFAULT_SPLINE_ORDER: usize = 3;

/// Accuracy of the truncated sum that initializes the causal filter.
const INIT_TOLERANCE: f64 = 1e-10;

/// B-Spline interpolator of order 0 to 5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSplineInterpolator {
    order: usize,
}

impl BSplineInterpolator {
    /// Create a B-spline interpolator.
    ///
    /// Returns `None` when `order` exceeds [`MAX_SPLINE_ORDER`].
    pub fn new(order: usize) -> Option<Self> {
        (order <= MAX_SPLINE_ORDER).then_some(Self { order })
    }

    /// Get the spline order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Poles of the prefilter for this order.
    fn poles(&self) -> Vec<f64> {
        match self.order {
            2 => vec![8.0f64.sqrt() - 3.0],
            3 => vec![3.0f64.sqrt() - 2.0],
            4 => vec![
                (664.0 - 438976.0f64.sqrt()).sqrt() + 304.0f64.sqrt() - 19.0,
                (664.0 + 438976.0f64.sqrt()).sqrt() - 304.0f64.sqrt() - 19.0,
            ],
            5 => vec![
                (135.0 / 2.0 - (17745.0f64 / 4.0).sqrt()).sqrt() + (105.0f64 / 4.0).sqrt() - 13.0 / 2.0,
                (135.0 / 2.0 + (17745.0f64 / 4.0).sqrt()).sqrt() - (105.0f64 / 4.0).sqrt() - 13.0 / 2.0,
            ],
            _ => Vec::new(),
        }
    }

    /// Compute the coefficient image for `samples`.
    ///
    /// Orders 0 and 1 interpolate directly, so their coefficients are the samples.
    pub fn coefficients<const D: usize>(&self, samples: &ImageBuffer<D>) -> ImageBuffer<D> {
        let mut coefficients = samples.clone();
        let poles = self.poles();
        if poles.is_empty() {
            return coefficients;
        }

        let geometry = samples.geometry().clone();
        let mut line = Vec::new();
        for axis in 0..D {
            let len = geometry.size()[axis];
            if len < 2 {
                continue;
            }
            let stride = geometry.stride(axis);
            let values = coefficients.values_mut();

            // Every line along `axis` starts at an offset whose `axis` component is zero.
            for start in 0..values.len() {
                if (start / stride) % len != 0 {
                    continue;
                }
                line.clear();
                line.extend((0..len).map(|k| values[start + k * stride]));
                filter_line(&mut line, &poles);
                for (k, c) in line.iter().enumerate() {
                    values[start + k * stride] = *c;
                }
            }
        }
        coefficients
    }

    /// First support index and weights along one axis.
    fn axis_weights(&self, x: f64) -> AxisWeights {
        let half = (self.order / 2) as isize;
        let start = if self.order % 2 == 1 {
            x.floor() as isize - half
        } else {
            (x + 0.5).floor() as isize - half
        };
        let weights = match self.order {
            0 => smallvec![1.0],
            1 => {
                let w = x - start as f64;
                smallvec![1.0 - w, w]
            }
            2 => {
                let w = x - (start + 1) as f64;
                let w1 = 0.75 - w * w;
                let w2 = 0.5 * (w - w1 + 1.0);
                smallvec![1.0 - w1 - w2, w1, w2]
            }
            3 => {
                let w = x - (start + 1) as f64;
                let w3 = w * w * w / 6.0;
                let w0 = 1.0 / 6.0 + 0.5 * w * (w - 1.0) - w3;
                let w2 = w + w0 - 2.0 * w3;
                let w1 = 1.0 - w0 - w2 - w3;
                smallvec![w0, w1, w2, w3]
            }
            4 => {
                let w = x - (start + 2) as f64;
                let w2 = w * w;
                let t = w2 / 6.0;
                let mut w0 = 0.5 - w;
                w0 *= w0;
                w0 *= w0 / 24.0;
                let t0 = w * (t - 11.0 / 24.0);
                let t1 = 19.0 / 96.0 + w2 * (0.25 - t);
                let w1 = t1 + t0;
                let w3 = t1 - t0;
                let w4 = w0 + t0 + 0.5 * w;
                let w2 = 1.0 - w0 - w1 - w3 - w4;
                smallvec![w0, w1, w2, w3, w4]
            }
            _ => {
                let mut w = x - (start + 2) as f64;
                let mut w2 = w * w;
                let w5 = w * w2 * w2 / 120.0;
                w2 -= w;
                let w4 = w2 * w2;
                w -= 0.5;
                let t = w2 * (w2 - 3.0);
                let c0 = (0.2 + w2 + w4) / 24.0 - w5;
                let t0 = (w2 * (w2 - 5.0) + 46.0 / 5.0) / 24.0;
                let t1 = -w * (t + 4.0) / 12.0;
                let c2 = t0 + t1;
                let c3 = t0 - t1;
                let t0 = (9.0 / 5.0 - t) / 16.0;
                let t1 = w * (w4 - w2 - 5.0) / 24.0;
                let c1 = t0 + t1;
                let c4 = t0 - t1;
                smallvec![c0, c1, c2, c3, c4, w5]
            }
        };
        AxisWeights::new(start, weights)
    }
}

impl Default for BSplineInterpolator {
    fn default() -> Self {
        Self {
            order: DEFAULT_SPLINE_ORDER,
        }
    }
}

impl<const D: usize> Interpolator<D> for BSplineInterpolator {
    /// `buffer` must hold coefficients from [`BSplineInterpolator::coefficients`].
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        let axes: [AxisWeights; D] = std::array::from_fn(|axis| self.axis_weights(cindex[axis]));
        let size = buffer.geometry().size();

        let mut sum = 0.0;
        for_each_neighbor(&axes, |index, weight| {
            let mirrored: [usize; D] = std::array::from_fn(|axis| mirror_index(index[axis], size[axis]));
            sum += weight * buffer.value(&mirrored);
        });
        sum
    }
}

/// Reflect an index into `[0, len)` about the first and last samples.
fn mirror_index(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let mut folded = index.rem_euclid(period);
    if folded >= len as isize {
        folded = period - folded;
    }
    folded as usize
}

/// In-place causal and anticausal recursive filtering of one line.
fn filter_line(line: &mut [f64], poles: &[f64]) {
    let n = line.len();
    let gain: f64 = poles.iter().map(|z| (1.0 - z) * (1.0 - 1.0 / z)).product();
    line.iter_mut().for_each(|c| *c *= gain);

    for &z in poles {
        line[0] = initial_causal_coefficient(line, z);
        for k in 1..n {
            line[k] += z * line[k - 1];
        }
        line[n - 1] = (z / (z * z - 1.0)) * (z * line[n - 2] + line[n - 1]);
        for k in (0..n - 1).rev() {
            line[k] = z * (line[k + 1] - line[k]);
        }
    }
}

/// Causal initialization assuming a mirror-symmetric extension of `line`.
fn initial_causal_coefficient(line: &[f64], z: f64) -> f64 {
    let n = line.len();
    let horizon = (INIT_TOLERANCE.ln() / z.abs().ln()).ceil() as usize;

    if horizon < n {
        let mut zn = z;
        let mut sum = line[0];
        for &c in &line[1..horizon] {
            sum += zn * c;
            zn *= z;
        }
        sum
    } else {
        let iz = 1.0 / z;
        let mut zn = z;
        let mut z2n = z.powi(n as i32 - 1);
        let mut sum = line[0] + z2n * line[n - 1];
        z2n *= z2n * iz;
        for &c in &line[1..n - 1] {
            sum += (zn + z2n) * c;
            zn *= z;
            z2n *= iz;
        }
        sum / (1.0 - zn * zn)
    }
}
