//! Image type with physical metadata.
//!
//! This module provides the Image struct which represents scalar images
//! with tensor data and physical space metadata (origin, spacing, direction).

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

use super::{ImageBuffer, ImageGeometry};
use crate::error::Result;
use crate::spatial::{Direction, Point, Spacing};

/// Scalar image with physical metadata.
///
/// The Image type combines tensor data with physical space metadata that
/// describes how image indices map to physical coordinates.
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) for tensor storage
/// * `D` - The dimensionality of the image (2, 3 or 4)
///
/// # Coordinate Systems
/// * **Index Space**: `(x, y, z, ..)`, x varying fastest; the tensor shape is
///   the reverse, `[.., z, y, x]`
/// * **Physical Space**: Continuous coordinates in mm or other units
///
/// # Examples
/// ```rust
/// use xform_core::Image;
/// use xform_core::spatial::{Point3, Spacing3, Direction3};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f64>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 3>::zeros([10, 10, 10], &device);
/// let origin = Point3::new([0.0, 0.0, 0.0]);
/// let spacing = Spacing3::new([1.0, 1.0, 1.0]);
/// let direction = Direction3::identity();
/// let image = Image::new(data, origin, spacing, direction);
/// assert_eq!(image.shape(), [10, 10, 10]);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    /// The pixel data, potentially on GPU.
    data: Tensor<B, D>,
    /// Physical coordinate of the first pixel (index 0,0,0).
    origin: Point<D>,
    /// Physical distance between pixels along each axis.
    spacing: Spacing<D>,
    /// Orientation of the image axes.
    direction: Direction<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image with the given data and metadata.
    pub fn new(
        data: Tensor<B, D>,
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
    ) -> Self {
        Self {
            data,
            origin,
            spacing,
            direction,
        }
    }

    /// Create an image from host samples laid out x-fastest.
    pub fn from_buffer(buffer: ImageBuffer<D>, device: &B::Device) -> Self {
        let geometry = buffer.geometry().clone();
        let data = TensorData::new(buffer.into_values(), Shape::new(geometry.shape())).convert::<B::FloatElem>();
        Self::new(
            Tensor::from_data(data, device),
            *geometry.origin(),
            *geometry.spacing(),
            *geometry.direction(),
        )
    }

    /// Get the image data tensor.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Get the origin (physical coordinate of first pixel).
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing (physical distance between pixels).
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction (orientation matrix).
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Get the image shape in tensor order (`[.., y, x]`).
    pub fn shape(&self) -> [usize; D] {
        self.data.dims()
    }

    /// Validated geometry of this image.
    ///
    /// Fails when spacing is not strictly positive or the direction is not
    /// orthonormal.
    pub fn geometry(&self) -> Result<ImageGeometry<D>> {
        ImageGeometry::from_shape(self.origin, self.spacing, self.direction, self.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type Backend = NdArray<f64>;
    type Point3 = Point<3>;
    type Spacing3 = Spacing<3>;
    type Direction3 = Direction<3>;

    #[test]
    fn test_image_creation() {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::zeros([4, 5, 6], &device);
        let origin = Point3::new([1.0, 2.0, 3.0]);
        let spacing = Spacing3::new([1.0, 2.0, 3.0]);
        let direction = Direction3::identity();

        let image = Image::new(data, origin, spacing, direction);

        assert_eq!(image.shape(), [4, 5, 6]);
        assert_eq!(image.origin(), &origin);
        assert_eq!(image.spacing(), &spacing);
        assert_eq!(image.direction(), &direction);
    }

    #[test]
    fn test_geometry_size_is_axis_ordered() {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::zeros([4, 5, 6], &device);
        let image = Image::new(data, Point3::origin(), Spacing3::uniform(1.0), Direction3::identity());

        let geometry = image.geometry().unwrap();
        assert_eq!(geometry.size(), [6, 5, 4]);
        assert_eq!(geometry.shape(), [4, 5, 6]);
    }

    #[test]
    fn test_from_buffer_preserves_layout() {
        let device = Default::default();
        let geometry = ImageGeometry::<2>::with_size([3, 2]);
        let buffer = ImageBuffer::new(geometry, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let image = Image::<Backend, 2>::from_buffer(buffer, &device);
        assert_eq!(image.shape(), [2, 3]);

        // Row y=1, column x=0 holds sample 3
        let value = image.data().clone().slice([1..2, 0..1]).into_scalar();
        assert_eq!(value, 3.0);
    }
}
