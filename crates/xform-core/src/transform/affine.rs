//! Affine transform implementation.
//!
//! This module provides an affine transform (linear transformation + translation).

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use nalgebra::SMatrix;

use super::trait_::Transform;
use crate::image::grid::{matrix_tensor, row_tensor};
use super::SpatialTransform;
use crate::spatial::{Point, Vector};

/// Affine Transform (Linear transformation + Translation).
///
/// Represents a general affine transformation with a fixed center:
/// T(x) = A(x - c) + c + t
///
/// where:
/// * A is a D×D matrix (linear transformation: rotation, scale, shear)
/// * t is a D-dimensional translation vector
/// * c is a D-dimensional fixed center of rotation/scaling
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform<const D: usize> {
    matrix: SMatrix<f64, D, D>,
    translation: Vector<D>,
    center: Point<D>,
}

impl<const D: usize> AffineTransform<D> {
    /// Create a new affine transform.
    ///
    /// # Arguments
    /// * `matrix` - The linear transformation matrix
    /// * `translation` - The translation vector
    /// * `center` - The fixed center
    pub fn new(matrix: SMatrix<f64, D, D>, translation: Vector<D>, center: Point<D>) -> Self {
        Self {
            matrix,
            translation,
            center,
        }
    }

    /// Create an identity affine transform centered at the origin.
    pub fn identity() -> Self {
        Self::new(SMatrix::identity(), Vector::zeros(), Point::origin())
    }

    /// Pure translation by `translation`.
    pub fn from_translation(translation: Vector<D>) -> Self {
        Self::new(SMatrix::identity(), translation, Point::origin())
    }

    /// Get the transformation matrix.
    pub fn matrix(&self) -> &SMatrix<f64, D, D> {
        &self.matrix
    }

    /// Get the translation vector.
    pub fn translation(&self) -> &Vector<D> {
        &self.translation
    }

    /// Get the center of rotation.
    pub fn center(&self) -> &Point<D> {
        &self.center
    }

    /// Effective offset `o` such that T(x) = A x + o.
    pub fn offset(&self) -> Vector<D> {
        let c = self.center.0.coords;
        Vector(self.translation.0 + c - self.matrix * c)
    }
}

impl AffineTransform<2> {
    /// Rotation by `angle` radians about `center`, followed by `translation`.
    pub fn from_rotation_2d(angle: f64, translation: Vector<2>, center: Point<2>) -> Self {
        let (s, c) = angle.sin_cos();
        let matrix = SMatrix::<f64, 2, 2>::new(
            c, -s,
            s, c,
        );
        Self::new(matrix, translation, center)
    }
}

impl AffineTransform<3> {
    /// Rotation from Euler angles (radians about x, y, z) about `center`,
    /// followed by `translation`.
    ///
    /// With `zyx` the rotation is `Rz * Ry * Rx`, otherwise `Rz * Rx * Ry`.
    pub fn from_euler_3d(angles: [f64; 3], translation: Vector<3>, center: Point<3>, zyx: bool) -> Self {
        let (sx, cx) = angles[0].sin_cos();
        let (sy, cy) = angles[1].sin_cos();
        let (sz, cz) = angles[2].sin_cos();

        let rx = SMatrix::<f64, 3, 3>::new(
            1.0, 0.0, 0.0,
            0.0, cx, -sx,
            0.0, sx, cx,
        );
        let ry = SMatrix::<f64, 3, 3>::new(
            cy, 0.0, sy,
            0.0, 1.0, 0.0,
            -sy, 0.0, cy,
        );
        let rz = SMatrix::<f64, 3, 3>::new(
            cz, -sz, 0.0,
            sz, cz, 0.0,
            0.0, 0.0, 1.0,
        );

        let matrix = if zyx { rz * ry * rx } else { rz * rx * ry };
        Self::new(matrix, translation, center)
    }
}

impl<const D: usize> Transform<D> for AffineTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        let centered = point.0 - self.center.0;
        Point(self.center.0 + self.matrix * centered + self.translation.0)
    }

    /// Rows map as `p @ A^T + o`, with `o` the [`offset`](Self::offset).
    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        let offset = self.offset();
        let a_t = matrix_tensor::<B, D>(|r, c| self.matrix[(c, r)], &device);
        points.matmul(a_t) + row_tensor::<B, D>(std::array::from_fn(|axis| offset[axis]), &device)
    }

    fn type_name(&self) -> &'static str {
        "AffineTransform"
    }

    /// T^-1(y) = A^-1(y - c) + c - A^-1 t; absent when A is singular.
    fn inverse(&self) -> Option<SpatialTransform<D>> {
        let inverse = self.matrix.try_inverse()?;
        let translation = Vector(-(inverse * self.translation.0));
        Some(SpatialTransform::Affine(Self::new(inverse, translation, self.center)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_affine_transform_identity() {
        let transform = AffineTransform::<3>::identity();
        let p = Point::new([1.0, 2.0, 3.0]);
        assert_eq!(transform.transform_point(&p), p);
    }

    #[test]
    fn test_affine_transform_translation_with_center() {
        let transform = AffineTransform::<2>::new(
            SMatrix::identity(),
            Vector::new([1.0, 1.0]),
            Point::new([10.0, 10.0]),
        );

        // T(c) = c + t
        let transformed = transform.transform_point(&Point::new([10.0, 10.0]));
        assert_eq!(transformed, Point::new([11.0, 11.0]));
    }

    #[test]
    fn test_affine_transform_scale_with_center() {
        let transform = AffineTransform::<2>::new(
            SMatrix::identity() * 2.0,
            Vector::zeros(),
            Point::new([1.0, 1.0]),
        );

        // x - c = [1, 0]; A(x - c) = [2, 0]; + c = [3, 1]
        let transformed = transform.transform_point(&Point::new([2.0, 1.0]));
        assert!((transformed[0] - 3.0).abs() < 1e-12);
        assert!((transformed[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_matches_forward_map() {
        let transform = AffineTransform::<2>::from_rotation_2d(
            0.3,
            Vector::new([2.0, -1.0]),
            Point::new([5.0, 4.0]),
        );
        let p = Point::new([0.7, -3.0]);
        let direct = transform.matrix() * p.0.coords + transform.offset().0;
        let mapped = transform.transform_point(&p);
        assert!((direct[0] - mapped[0]).abs() < 1e-12);
        assert!((direct[1] - mapped[1]).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_2d() {
        // Point (1, 0) -> Rotation(90) -> (0, 1) -> Translation(1, 1) -> (1, 2)
        let transform = AffineTransform::<2>::from_rotation_2d(PI / 2.0, Vector::new([1.0, 1.0]), Point::origin());
        let p = transform.transform_point(&Point::new([1.0, 0.0]));
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_euler_3d_about_z() {
        // Point (1, 0, 0) -> (0, 1, 0) -> + (1, 2, 3) = (1, 3, 3)
        for zyx in [true, false] {
            let transform = AffineTransform::<3>::from_euler_3d(
                [0.0, 0.0, PI / 2.0],
                Vector::new([1.0, 2.0, 3.0]),
                Point::origin(),
                zyx,
            );
            let p = transform.transform_point(&Point::new([1.0, 0.0, 0.0]));
            assert!(p.max_abs_diff(&Point::new([1.0, 3.0, 3.0])) < 1e-12);
        }
    }

    #[test]
    fn test_inverse_roundtrip() {
        let matrix = SMatrix::<f64, 3, 3>::new(
            1.2, 0.1, 0.0,
            -0.2, 0.9, 0.3,
            0.0, 0.4, 1.1,
        );
        let transform = AffineTransform::new(matrix, Vector::new([3.0, -2.0, 0.5]), Point::new([1.0, 1.0, 1.0]));
        let inverse = transform.inverse().unwrap();

        let p = Point::new([4.0, -7.5, 2.25]);
        let roundtrip = inverse.transform_point(&transform.transform_point(&p));
        assert!(p.max_abs_diff(&roundtrip) < 1e-10);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let transform = AffineTransform::<2>::new(SMatrix::zeros(), Vector::zeros(), Point::origin());
        assert!(transform.inverse().is_none());
    }

    #[test]
    fn test_batch_matches_point_mapping() {
        use burn::tensor::TensorData;
        use burn_ndarray::NdArray;

        let transform = AffineTransform::<3>::from_euler_3d(
            [0.2, -0.4, 1.1],
            Vector::new([3.0, -2.0, 0.5]),
            Point::new([10.0, -4.0, 2.0]),
            false,
        );
        let points = [[0.0, 0.0, 0.0], [1.5, -2.0, 7.25], [-30.0, 12.0, 4.0]];
        let flat: Vec<f64> = points.iter().flatten().copied().collect();
        let device = Default::default();
        let batch = Tensor::<NdArray<f64>, 2>::from_data(TensorData::new(flat, [3, 3]), &device);

        let mapped = transform.transform_points(batch).into_data().into_vec::<f64>().unwrap();
        for (row, p) in points.iter().enumerate() {
            let expected = transform.transform_point(&Point::new(*p));
            for axis in 0..3 {
                assert!((mapped[row * 3 + axis] - expected[axis]).abs() < 1e-10);
            }
        }
    }
}
