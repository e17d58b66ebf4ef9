//! Nearest neighbor interpolation implementation.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use super::trait_::Interpolator;
use crate::image::ImageBuffer;
use crate::spatial::Point;

/// Nearest Neighbor Interpolator.
///
/// Rounds each index component half up (`floor(x + 0.5)`) and returns the
/// stored sample, so the output only ever contains values of the input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NearestNeighborInterpolator;

impl NearestNeighborInterpolator {
    /// Create a new nearest neighbor interpolator.
    pub fn new() -> Self {
        Self
    }

    /// Grid index nearest to `cindex`, unclamped.
    pub fn nearest_index<const D: usize>(cindex: &Point<D>) -> [isize; D] {
        std::array::from_fn(|axis| (cindex[axis] + 0.5).floor() as isize)
    }

    /// Look up the nearest sample for a batch of `[Batch, D]` continuous indices.
    ///
    /// `values` holds the samples flattened x-fastest.
    pub fn interpolate_tensor<B: Backend, const D: usize>(
        values: Tensor<B, 1>,
        size: [usize; D],
        cindex: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let [batch, _] = cindex.dims();
        let mut offset = Tensor::<B, 1, Int>::zeros([batch], &cindex.device());
        let mut stride = 1usize;
        for (axis, &len) in size.iter().enumerate() {
            let nearest = cindex
                .clone()
                .narrow(1, axis, 1)
                .squeeze::<1>(1)
                .add_scalar(0.5)
                .floor()
                .clamp(0.0, len.saturating_sub(1) as f64)
                .int();
            offset = offset + nearest.mul_scalar(stride as i64);
            stride *= len;
        }
        values.select(0, offset)
    }
}

impl<const D: usize> Interpolator<D> for NearestNeighborInterpolator {
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        buffer.value_clamped(&Self::nearest_index(cindex))
    }
}
