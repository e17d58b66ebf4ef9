//! Tensor grids of voxel indices, and small constant tensors for batched
//! coordinate mapping.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};

/// Generate every grid index of an image of `size` (x first).
///
/// Returns a tensor of shape `[N, D]` where N is the total number of voxels,
/// one row per voxel in x-fastest order, so row `k` is the voxel stored at
/// linear offset `k`.
///
/// # Arguments
/// * `size` - Number of samples along each axis, x first
/// * `device` - The device to create the tensor on
pub fn generate_grid<B: Backend, const D: usize>(size: [usize; D], device: &B::Device) -> Tensor<B, 2> {
    let total: usize = size.iter().product();
    if total == 0 {
        return Tensor::zeros([0, D], device);
    }

    let offsets = Tensor::<B, 1, Int>::arange(0..total as i64, device);
    let mut stride = 1usize;
    let columns = size
        .iter()
        .map(|&len| {
            let column = offsets.clone().div_scalar(stride as i64).remainder_scalar(len as i64);
            stride *= len;
            column.float().unsqueeze_dim::<2>(1)
        })
        .collect();

    Tensor::cat(columns, 1)
}

/// A `[1, D]` row that broadcasts against `[N, D]` point tensors.
pub(crate) fn row_tensor<B: Backend, const D: usize>(values: [f64; D], device: &B::Device) -> Tensor<B, 2> {
    let data = TensorData::new(values.to_vec(), [1, D]).convert::<B::FloatElem>();
    Tensor::from_data(data, device)
}

/// A `[D, D]` matrix with entry `(r, c)` given by `entry(r, c)`.
pub(crate) fn matrix_tensor<B: Backend, const D: usize>(
    entry: impl Fn(usize, usize) -> f64,
    device: &B::Device,
) -> Tensor<B, 2> {
    let values: Vec<f64> = (0..D * D).map(|i| entry(i / D, i % D)).collect();
    let data = TensorData::new(values, [D, D]).convert::<B::FloatElem>();
    Tensor::from_data(data, device)
}
