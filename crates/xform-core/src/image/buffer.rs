//! Host-side sample buffers.
//!
//! Kernel interpolators and displacement fields evaluate one point at a time,
//! so they read samples from a flat `Vec<f64>` instead of the backend tensor.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use super::{Image, ImageGeometry};
use crate::error::{ResampleError, Result};

/// Flat, x-fastest copy of an image's samples together with its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer<const D: usize> {
    geometry: ImageGeometry<D>,
    values: Vec<f64>,
}

impl<const D: usize> ImageBuffer<D> {
    /// Wrap samples laid out x-fastest.
    ///
    /// Fails when the number of samples does not match the geometry.
    pub fn new(geometry: ImageGeometry<D>, values: Vec<f64>) -> Result<Self> {
        if values.len() != geometry.num_voxels() {
            return Err(ResampleError::invalid_geometry(format!(
                "expected {} samples for size {:?}, got {}",
                geometry.num_voxels(),
                geometry.size(),
                values.len()
            )));
        }
        Ok(Self { geometry, values })
    }

    /// A buffer with every sample set to `value`.
    pub fn filled(geometry: ImageGeometry<D>, value: f64) -> Self {
        let values = vec![value; geometry.num_voxels()];
        Self { geometry, values }
    }

    /// Upload the samples as a flat tensor, x-fastest.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 1> {
        let data = TensorData::new(self.values.clone(), [self.values.len()]);
        Tensor::from_data(data.convert::<B::FloatElem>(), device)
    }

    /// Copy the samples of an image to the host.
    pub fn from_image<B: Backend>(image: &Image<B, D>) -> Result<Self> {
        let geometry = image.geometry()?;
        let values = image
            .data()
            .to_data()
            .convert::<f64>()
            .into_vec::<f64>()
            .map_err(|e| ResampleError::TensorData(format!("{e:?}")))?;
        Self::new(geometry, values)
    }

    /// Get the geometry.
    pub fn geometry(&self) -> &ImageGeometry<D> {
        &self.geometry
    }

    /// Get the samples.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get mutable access to the samples.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Consume the buffer, returning the samples.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of samples along `axis`.
    pub fn axis_len(&self, axis: usize) -> usize {
        self.geometry.size()[axis]
    }

    /// Sample at a grid index.
    pub fn value(&self, index: &[usize; D]) -> f64 {
        self.values[self.geometry.linear_offset(index)]
    }

    /// Sample at a possibly out-of-range index, clamped to the grid.
    pub fn value_clamped(&self, index: &[isize; D]) -> f64 {
        let mut clamped = [0usize; D];
        for axis in 0..D {
            let last = self.axis_len(axis) as isize - 1;
            clamped[axis] = index[axis].clamp(0, last.max(0)) as usize;
        }
        self.value(&clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Direction, Point, Spacing};
    use burn_ndarray::NdArray;

    type Backend = NdArray<f64>;

    #[test]
    fn test_from_image_is_x_fastest() {
        let device = Default::default();
        // shape [y=2, x=3]
        let data = Tensor::<Backend, 2>::from_data(
            TensorData::from([[0.0f64, 1.0, 2.0], [3.0, 4.0, 5.0]]),
            &device,
        );
        let image = Image::new(data, Point::origin(), Spacing::uniform(1.0), Direction::identity());
        let buffer = ImageBuffer::from_image(&image).unwrap();

        assert_eq!(buffer.axis_len(0), 3);
        assert_eq!(buffer.axis_len(1), 2);
        assert_eq!(buffer.value(&[2, 0]), 2.0);
        assert_eq!(buffer.value(&[0, 1]), 3.0);
    }

    #[test]
    fn test_large_labels_survive_host_copy() {
        let device = Default::default();
        let labels = vec![16_777_217.0, 0.1, -3.0, 9_007_199_254_740_991.0];
        let geometry = ImageGeometry::<2>::with_size([2, 2]);
        let image = Image::<Backend, 2>::from_buffer(ImageBuffer::new(geometry, labels.clone()).unwrap(), &device);

        let buffer = ImageBuffer::from_image(&image).unwrap();
        assert_eq!(buffer.values(), labels.as_slice());
        let flat = buffer.to_tensor::<Backend>(&device).into_data().into_vec::<f64>().unwrap();
        assert_eq!(flat, labels);
    }

    #[test]
    fn test_value_clamped() {
        let geometry = ImageGeometry::<2>::with_size([2, 2]);
        let buffer = ImageBuffer::new(geometry, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(buffer.value_clamped(&[-3, 0]), 1.0);
        assert_eq!(buffer.value_clamped(&[5, 7]), 4.0);
    }

    #[test]
    fn test_rejects_wrong_sample_count() {
        let geometry = ImageGeometry::<2>::with_size([2, 2]);
        assert!(ImageBuffer::new(geometry, vec![0.0; 3]).is_err());
    }
}
