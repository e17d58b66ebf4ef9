//! Windowed sinc interpolation.

use std::f64::consts::PI;

use super::neighborhood::{for_each_neighbor, AxisWeights};
use super::trait_::Interpolator;
use crate::image::ImageBuffer;
use crate::spatial::Point;

/// Kernel radius in samples.
pub const SINC_RADIUS: usize = 3;

/// Window applied to the sinc kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowFunction {
    /// `cos(πd / 2m)`
    Cosine,
    /// `1 - d² / m²`
    Welch,
    /// `0.54 + 0.46 cos(πd / m)`
    Hamming,
    /// `sinc(d / m)`
    Lanczos,
    /// `0.42 + 0.5 cos(πd / m) + 0.08 cos(2πd / m)`
    Blackman,
}

impl WindowFunction {
    /// Window value at distance `d` for radius `m`.
    pub fn evaluate(&self, d: f64, m: f64) -> f64 {
        match self {
            WindowFunction::Cosine => (PI * d / (2.0 * m)).cos(),
            WindowFunction::Welch => 1.0 - d * d / (m * m),
            WindowFunction::Hamming => 0.54 + 0.46 * (PI * d / m).cos(),
            WindowFunction::Lanczos => sinc(d / m),
            WindowFunction::Blackman => 0.42 + 0.5 * (PI * d / m).cos() + 0.08 * (2.0 * PI * d / m).cos(),
        }
    }

    /// Option name, e.g. `Lanczos` for `LanczosWindowedSinc`.
    pub fn name(&self) -> &'static str {
        match self {
            WindowFunction::Cosine => "Cosine",
            WindowFunction::Welch => "Welch",
            WindowFunction::Hamming => "Hamming",
            WindowFunction::Lanczos => "Lanczos",
            WindowFunction::Blackman => "Blackman",
        }
    }
}

/// Normalized sinc, `sin(πx) / (πx)`.
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Windowed sinc interpolator with radius [`SINC_RADIUS`].
///
/// Weights are `sinc(d) · window(d)` over the 2m samples around the index,
/// multiplied across axes. They are not renormalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowedSincInterpolator {
    window: WindowFunction,
}

impl WindowedSincInterpolator {
    /// Create a new windowed sinc interpolator.
    pub fn new(window: WindowFunction) -> Self {
        Self { window }
    }

    /// Get the window function.
    pub fn window(&self) -> WindowFunction {
        self.window
    }
}

impl<const D: usize> Interpolator<D> for WindowedSincInterpolator {
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        let m = SINC_RADIUS as isize;
        let radius = SINC_RADIUS as f64;
        let axes: [AxisWeights; D] = std::array::from_fn(|axis| {
            let x = cindex[axis];
            let start = x.floor() as isize - m + 1;
            let weights = (0..2 * m)
                .map(|k| {
                    let d = x - (start + k) as f64;
                    sinc(d) * self.window.evaluate(d, radius)
                })
                .collect();
            AxisWeights::new(start, weights)
        });

        let mut sum = 0.0;
        for_each_neighbor(&axes, |index, weight| {
            if weight != 0.0 {
                sum += weight * buffer.value_clamped(index);
            }
        });
        sum
    }
}
