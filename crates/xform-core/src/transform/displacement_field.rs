//! Dense displacement field transform.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::Transform;
use crate::error::{ResampleError, Result};
use crate::image::{Image, ImageBuffer, ImageGeometry};
use crate::interpolation::{Interpolator, LinearInterpolator};
use crate::spatial::{Point, Vector};

/// Displacement Field Transform.
///
/// Maps `p` to `p + v(p)`, where `v` is linearly interpolated from a grid
/// of displacement vectors stored as one scalar image per component.
/// Points outside the grid are not displaced. There is no inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementFieldTransform<const D: usize> {
    components: Vec<ImageBuffer<D>>,
}

impl<const D: usize> DisplacementFieldTransform<D> {
    /// Create a field from `D` component images sharing one geometry.
    pub fn new(components: Vec<ImageBuffer<D>>) -> Result<Self> {
        if components.len() != D {
            return Err(ResampleError::invalid_geometry(format!(
                "displacement field needs {D} components, got {}",
                components.len()
            )));
        }
        if components.iter().any(|c| c.geometry() != components[0].geometry()) {
            return Err(ResampleError::invalid_geometry(
                "displacement field components must share one geometry",
            ));
        }
        Ok(Self { components })
    }

    /// Create a field from one image per component.
    pub fn from_images<B: Backend>(images: &[Image<B, D>]) -> Result<Self> {
        let components = images
            .iter()
            .map(ImageBuffer::from_image)
            .collect::<Result<Vec<_>>>()?;
        Self::new(components)
    }

    /// A field that displaces nothing.
    pub fn zeros(geometry: ImageGeometry<D>) -> Self {
        let components = (0..D).map(|_| ImageBuffer::filled(geometry.clone(), 0.0)).collect();
        Self { components }
    }

    /// Get the grid geometry.
    pub fn geometry(&self) -> &ImageGeometry<D> {
        self.components[0].geometry()
    }

    /// Get the component images, x first.
    pub fn components(&self) -> &[ImageBuffer<D>] {
        &self.components
    }

    /// Interpolated displacement at a physical point; zero outside the grid.
    pub fn displacement_at(&self, point: &Point<D>) -> Vector<D> {
        let geometry = self.geometry();
        let cindex = geometry.transform_physical_point_to_continuous_index(point);
        if !geometry.is_inside(&cindex) {
            return Vector::zeros();
        }

        let mut displacement = Vector::zeros();
        for (axis, component) in self.components.iter().enumerate() {
            displacement[axis] = LinearInterpolator.interpolate(component, &cindex);
        }
        displacement
    }
}

impl<const D: usize> Transform<D> for DisplacementFieldTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        *point + self.displacement_at(point)
    }

    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let geometry = self.geometry();
        if geometry.num_voxels() == 0 {
            return points;
        }
        let device = points.device();
        let cindex = geometry.physical_to_index_tensor(points.clone());
        let outside = geometry
            .inside_mask_tensor(cindex.clone())
            .bool_not()
            .unsqueeze_dim::<2>(1)
            .repeat_dim(1, D);

        let columns = self
            .components
            .iter()
            .map(|component| {
                let values = component.to_tensor::<B>(&device);
                LinearInterpolator::interpolate_tensor(values, geometry.size(), cindex.clone()).unsqueeze_dim::<2>(1)
            })
            .collect();
        let displacement = Tensor::cat(columns, 1).mask_fill(outside, 0.0);
        points + displacement
    }

    fn type_name(&self) -> &'static str {
        "DisplacementFieldTransform"
    }
}
