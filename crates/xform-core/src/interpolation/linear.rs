//! Linear interpolation implementation.
//!
//! This module provides multilinear interpolation (bilinear for 2D,
//! trilinear for 3D, quadrilinear for 4D), point by point on host samples
//! and batched over tensors.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use smallvec::smallvec;

use super::neighborhood::{for_each_neighbor, AxisWeights};
use super::trait_::Interpolator;
use crate::image::ImageBuffer;
use crate::spatial::Point;

/// Linear Interpolator.
///
/// Blends the 2^D samples surrounding the index. Neighbors past the last
/// sample are clamped to the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    /// Create a new linear interpolator.
    pub fn new() -> Self {
        Self
    }

    /// Interpolate at a batch of continuous indices.
    ///
    /// # Arguments
    /// * `values` - Samples flattened x-fastest, shape `[N]`
    /// * `size` - Grid size, x first
    /// * `cindex` - Continuous indices of shape `[Batch, D]`
    ///
    /// # Returns
    /// Tensor of shape `[Batch]` with interpolated values
    pub fn interpolate_tensor<B: Backend, const D: usize>(
        values: Tensor<B, 1>,
        size: [usize; D],
        cindex: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let device = cindex.device();
        let [batch, _] = cindex.dims();
        let widest = size.iter().copied().max().unwrap_or(0) as f64;

        let lower = cindex.clone().floor();
        let frac = cindex - lower.clone();
        // Far-away indices are clipped before the integer cast; they are masked later.
        let lower = lower.clamp(-1.0, widest).int();

        let axis_lower: Vec<Tensor<B, 1, Int>> =
            (0..D).map(|axis| lower.clone().narrow(1, axis, 1).squeeze::<1>(1)).collect();
        let axis_frac: Vec<Tensor<B, 1>> =
            (0..D).map(|axis| frac.clone().narrow(1, axis, 1).squeeze::<1>(1)).collect();

        let mut result = Tensor::<B, 1>::zeros([batch], &device);
        for corner in 0..(1usize << D) {
            let mut offset = Tensor::<B, 1, Int>::zeros([batch], &device);
            let mut weight = Tensor::<B, 1>::ones([batch], &device);
            let mut stride = 1usize;

            for axis in 0..D {
                let upper = (corner >> axis) & 1 == 1;
                let (index, w) = if upper {
                    (axis_lower[axis].clone().add_scalar(1), axis_frac[axis].clone())
                } else {
                    (axis_lower[axis].clone(), axis_frac[axis].clone().neg().add_scalar(1.0))
                };
                let index = index.clamp(0, size[axis] as i64 - 1);
                offset = offset + index.mul_scalar(stride as i64);
                weight = weight * w;
                stride *= size[axis];
            }

            result = result + values.clone().select(0, offset) * weight;
        }
        result
    }
}

impl<const D: usize> Interpolator<D> for LinearInterpolator {
    fn interpolate(&self, buffer: &ImageBuffer<D>, cindex: &Point<D>) -> f64 {
        let axes: [AxisWeights; D] = std::array::from_fn(|axis| {
            let x0 = cindex[axis].floor();
            let w = cindex[axis] - x0;
            AxisWeights::new(x0 as isize, smallvec![1.0 - w, w])
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageGeometry;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type Backend = NdArray<f64>;

    #[test]
    fn test_linear_interpolation_2d() {
        // 2x2 image
        // 0 1
        // 2 3
        let buffer = ImageBuffer::new(ImageGeometry::with_size([2, 2]), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let interp = LinearInterpolator::new();

        assert_eq!(interp.interpolate(&buffer, &Point::new([0.0, 0.0])), 0.0);
        assert_eq!(interp.interpolate(&buffer, &Point::new([1.0, 1.0])), 3.0);
        assert!((interp.interpolate(&buffer, &Point::new([0.5, 0.5])) - 1.5).abs() < 1e-12);
        assert!((interp.interpolate(&buffer, &Point::new([0.25, 0.0])) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_linear_interpolation_3d() {
        // value = x + 10 y + 100 z on a 2x2x2 grid
        let geometry = ImageGeometry::with_size([2, 2, 2]);
        let values = (0..8)
            .map(|i| {
                let index = geometry.index_of_offset(i);
                (index[0] + 10 * index[1] + 100 * index[2]) as f64
            })
            .collect();
        let buffer = ImageBuffer::new(geometry, values).unwrap();

        let value = LinearInterpolator.interpolate(&buffer, &Point::new([0.5, 0.25, 0.75]));
        assert!((value - (0.5 + 2.5 + 75.0)).abs() < 1e-9);
    }

    #[test]
    fn test_linear_at_upper_edge() {
        let buffer = ImageBuffer::new(ImageGeometry::with_size([3]), vec![1.0, 2.0, 4.0]).unwrap();
        assert_eq!(LinearInterpolator.interpolate(&buffer, &Point::new([2.0])), 4.0);
    }

    #[test]
    fn test_tensor_batch_matches_point_evaluation() {
        let device = Default::default();
        let geometry = ImageGeometry::with_size([4, 3, 2]);
        let values: Vec<f64> = (0..24).map(|i| ((i * 7) % 11) as f64 - 3.5).collect();
        let buffer = ImageBuffer::new(geometry, values).unwrap();

        let points = [
            [0.0, 0.0, 0.0],
            [3.0, 2.0, 1.0],
            [1.25, 0.5, 0.75],
            [2.9, 1.1, 0.0],
            [-1e-7, 2.0 + 1e-7, 1.0],
        ];
        let flat: Vec<f64> = points.iter().flatten().copied().collect();
        let cindex = Tensor::<Backend, 2>::from_data(TensorData::new(flat, [points.len(), 3]), &device);

        let batch = LinearInterpolator::interpolate_tensor(buffer.to_tensor::<Backend>(&device), [4, 3, 2], cindex);
        let batch = batch.into_data().into_vec::<f64>().unwrap();
        for (row, p) in points.iter().enumerate() {
            let expected = LinearInterpolator.interpolate(&buffer, &Point::new(*p));
            assert!((batch[row] - expected).abs() < 1e-12, "{p:?}: {} vs {expected}", batch[row]);
        }
    }

    #[test]
    fn test_tensor_batch_tolerates_far_indices() {
        let device = Default::default();
        let values = Tensor::<Backend, 1>::from_data(TensorData::new(vec![1.0, 2.0, 4.0], [3]), &device);
        let cindex = Tensor::<Backend, 2>::from_data(TensorData::new(vec![1e30, -1e30, 1.5], [3, 1]), &device);
        let batch = LinearInterpolator::interpolate_tensor(values, [3], cindex).into_data().into_vec::<f64>().unwrap();
        assert_eq!(batch[2], 3.0);
    }
}
