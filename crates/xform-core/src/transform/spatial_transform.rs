//! The closed set of transforms a chain can hold.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::Transform;
use super::{AffineTransform, DisplacementFieldTransform, IdentityTransform};
use crate::spatial::Point;

/// Any transform that can appear in a [`CompositeTransform`](super::CompositeTransform).
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialTransform<const D: usize> {
    Identity(IdentityTransform),
    Affine(AffineTransform<D>),
    DisplacementField(DisplacementFieldTransform<D>),
}

impl<const D: usize> Transform<D> for SpatialTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        match self {
            SpatialTransform::Identity(t) => t.transform_point(point),
            SpatialTransform::Affine(t) => t.transform_point(point),
            SpatialTransform::DisplacementField(t) => t.transform_point(point),
        }
    }

    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            SpatialTransform::Identity(t) => Transform::<D>::transform_points(t, points),
            SpatialTransform::Affine(t) => t.transform_points(points),
            SpatialTransform::DisplacementField(t) => t.transform_points(points),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            SpatialTransform::Identity(t) => Transform::<D>::type_name(t),
            SpatialTransform::Affine(t) => t.type_name(),
            SpatialTransform::DisplacementField(t) => t.type_name(),
        }
    }

    fn inverse(&self) -> Option<SpatialTransform<D>> {
        match self {
            SpatialTransform::Identity(t) => Transform::<D>::inverse(t),
            SpatialTransform::Affine(t) => t.inverse(),
            SpatialTransform::DisplacementField(t) => t.inverse(),
        }
    }
}

impl<const D: usize> From<IdentityTransform> for SpatialTransform<D> {
    fn from(t: IdentityTransform) -> Self {
        SpatialTransform::Identity(t)
    }
}

impl<const D: usize> From<AffineTransform<D>> for SpatialTransform<D> {
    fn from(t: AffineTransform<D>) -> Self {
        SpatialTransform::Affine(t)
    }
}

impl<const D: usize> From<DisplacementFieldTransform<D>> for SpatialTransform<D> {
    fn from(t: DisplacementFieldTransform<D>) -> Self {
        SpatialTransform::DisplacementField(t)
    }
}
