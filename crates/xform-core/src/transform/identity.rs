//! Identity transform.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::Transform;
use super::SpatialTransform;
use crate::spatial::Point;

/// Maps every point to itself. Seeds every composite chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityTransform;

impl<const D: usize> Transform<D> for IdentityTransform {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        *point
    }

    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        points
    }

    fn type_name(&self) -> &'static str {
        "IdentityTransform"
    }

    fn inverse(&self) -> Option<SpatialTransform<D>> {
        Some(SpatialTransform::Identity(*self))
    }
}
