//! Image geometry: the mapping between grid indices and physical space.
//!
//! Geometry describes how image indices map to physical coordinates and
//! which continuous indices lie inside the image domain.

use burn::tensor::backend::Backend;
use burn::tensor::{Bool, Tensor};

use super::grid::{matrix_tensor, row_tensor};
use crate::error::{ResampleError, Result};
use crate::spatial::{Direction, Point, Spacing, Vector};

/// Tolerance, in index units, applied to the inclusive domain test.
const DOMAIN_TOLERANCE: f64 = 1e-6;

/// Image geometry containing physical space information and grid size.
///
/// `size` is stored in axis order (x first), which is the reverse of the
/// tensor shape returned by [`Image::shape`](crate::image::Image::shape).
///
/// Invariants, checked by [`ImageGeometry::new`]: spacing is strictly
/// positive and the direction matrix is orthonormal.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry<const D: usize> {
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
    inverse_direction: Direction<D>,
    size: [usize; D],
}

impl<const D: usize> ImageGeometry<D> {
    /// Create a new geometry.
    ///
    /// # Arguments
    /// * `origin` - Physical coordinate of index zero
    /// * `spacing` - Physical distance between samples along each axis
    /// * `direction` - Orientation of the image axes (columns)
    /// * `size` - Number of samples along each axis, x first
    pub fn new(
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
        size: [usize; D],
    ) -> Result<Self> {
        if !spacing.is_strictly_positive() {
            return Err(ResampleError::invalid_geometry(format!(
                "spacing must be strictly positive, got {:?}",
                spacing.to_vec()
            )));
        }
        if !direction.is_orthogonal() {
            return Err(ResampleError::invalid_geometry(
                "direction matrix must be orthonormal",
            ));
        }
        Ok(Self {
            origin,
            spacing,
            direction,
            inverse_direction: direction.transpose(),
            size,
        })
    }

    /// Create a geometry from a tensor shape (`[.., y, x]` order).
    pub fn from_shape(
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
        shape: [usize; D],
    ) -> Result<Self> {
        let mut size = shape;
        size.reverse();
        Self::new(origin, spacing, direction, size)
    }

    /// Unit spacing, zero origin, identity direction.
    pub fn with_size(size: [usize; D]) -> Self {
        Self {
            origin: Point::origin(),
            spacing: Spacing::uniform(1.0),
            direction: Direction::identity(),
            inverse_direction: Direction::identity(),
            size,
        }
    }

    /// Get the origin.
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Number of samples along each axis, x first.
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// Tensor shape (`[.., y, x]` order) for this geometry.
    pub fn shape(&self) -> [usize; D] {
        let mut shape = self.size;
        shape.reverse();
        shape
    }

    /// Total number of samples.
    pub fn num_voxels(&self) -> usize {
        self.size.iter().product()
    }

    /// Map a (continuous) index to a physical point.
    ///
    /// `point = origin + Direction * (index * spacing)`
    pub fn transform_index_to_physical_point(&self, index: &Point<D>) -> Point<D> {
        let scaled = index.coords().component_mul(&self.spacing);
        self.origin + self.direction * scaled
    }

    /// Map a physical point to a continuous index.
    ///
    /// `index = (Direction^T * (point - origin)) / spacing`
    pub fn transform_physical_point_to_continuous_index(&self, point: &Point<D>) -> Point<D> {
        let rotated: Vector<D> = self.inverse_direction * (*point - self.origin);
        let scaled = rotated.component_div(&self.spacing);
        Point(scaled.0.into())
    }

    /// Inclusive domain test: every component lies in `[0, size - 1]`.
    pub fn is_inside(&self, cindex: &Point<D>) -> bool {
        (0..D).all(|axis| {
            let c = cindex[axis];
            let upper = self.size[axis] as f64 - 1.0;
            self.size[axis] > 0 && c >= -DOMAIN_TOLERANCE && c <= upper + DOMAIN_TOLERANCE
        })
    }

    /// Batch transform continuous indices to physical points using tensors.
    ///
    /// # Arguments
    /// * `indices` - A tensor of shape `[Batch, D]`, x first
    ///
    /// # Returns
    /// A tensor of shape `[Batch, D]` containing physical points
    pub fn index_to_physical_tensor<B: Backend>(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = indices.device();
        // P = O + I @ M, M_rc = S_r * D_cr
        let m = matrix_tensor::<B, D>(|r, c| self.spacing[r] * self.direction[(c, r)], &device);
        indices.matmul(m) + row_tensor::<B, D>(std::array::from_fn(|axis| self.origin[axis]), &device)
    }

    /// Batch transform physical points to continuous indices using tensors.
    ///
    /// # Arguments
    /// * `points` - A tensor of shape `[Batch, D]`
    ///
    /// # Returns
    /// A tensor of shape `[Batch, D]` containing continuous indices
    pub fn physical_to_index_tensor<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        // I = (P - O) @ T, T_rc = (D^-1)_cr / S_c
        let t = matrix_tensor::<B, D>(|r, c| self.inverse_direction[(c, r)] / self.spacing[c], &device);
        (points - row_tensor::<B, D>(std::array::from_fn(|axis| self.origin[axis]), &device)).matmul(t)
    }

    /// Batch form of [`is_inside`](Self::is_inside): one flag per row of a
    /// `[Batch, D]` tensor of continuous indices.
    pub fn inside_mask_tensor<B: Backend>(&self, cindex: Tensor<B, 2>) -> Tensor<B, 1, Bool> {
        let device = cindex.device();
        let upper = row_tensor::<B, D>(
            self.size.map(|len| len as f64 - 1.0 + DOMAIN_TOLERANCE),
            &device,
        );

        // Distance past either bound, zero for components inside
        let below = cindex.clone().neg().sub_scalar(DOMAIN_TOLERANCE).clamp_min(0.0);
        let above = (cindex - upper).clamp_min(0.0);
        (below + above).sum_dim(1).squeeze::<1>(1).lower_equal_elem(0.0)
    }

    /// Linear offset of a grid index in x-fastest storage order.
    pub fn linear_offset(&self, index: &[usize; D]) -> usize {
        let mut offset = 0;
        let mut stride = 1;
        for axis in 0..D {
            offset += index[axis] * stride;
            stride *= self.size[axis];
        }
        offset
    }

    /// Grid index of a linear offset in x-fastest storage order.
    pub fn index_of_offset(&self, mut offset: usize) -> [usize; D] {
        let mut index = [0usize; D];
        for axis in 0..D {
            index[axis] = offset % self.size[axis];
            offset /= self.size[axis];
        }
        index
    }

    /// Distance in storage between neighbors along `axis`.
    pub fn stride(&self, axis: usize) -> usize {
        self.size[..axis].iter().product()
    }
}
