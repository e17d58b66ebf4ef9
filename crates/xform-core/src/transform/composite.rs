//! Composite transform implementation.
//!
//! This module provides an ordered chain of transforms evaluated last-in, first-out.
//! T(x) = T1(T2(...Tk(x)))

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::Transform;
use super::{IdentityTransform, SpatialTransform};
use crate::spatial::Point;

/// A transform together with the name it is listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTransform<const D: usize> {
    pub name: String,
    pub transform: SpatialTransform<D>,
}

impl<const D: usize> NamedTransform<D> {
    pub fn new(name: impl Into<String>, transform: impl Into<SpatialTransform<D>>) -> Self {
        Self {
            name: name.into(),
            transform: transform.into(),
        }
    }
}

/// Composite Transform.
///
/// Element 0 is always an identity. Transforms are appended in the order
/// given, and [`transform_point`](Transform::transform_point) applies the
/// most recently appended one first:
/// y = T1(T2(...Tk(Identity(x))))
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTransform<const D: usize> {
    transforms: Vec<NamedTransform<D>>,
}

impl<const D: usize> CompositeTransform<D> {
    /// Create a chain holding only the identity.
    pub fn new() -> Self {
        Self {
            transforms: vec![NamedTransform::new("identity", IdentityTransform)],
        }
    }

    /// Append a transform; it will be applied before every earlier one.
    pub fn push(&mut self, transform: NamedTransform<D>) {
        self.transforms.push(transform);
    }

    /// Number of elements, counting the leading identity.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// True when the chain holds only the leading identity.
    pub fn is_empty(&self) -> bool {
        self.transforms.len() <= 1
    }

    /// Elements in append order, starting with the identity.
    pub fn iter(&self) -> impl Iterator<Item = &NamedTransform<D>> {
        self.transforms.iter()
    }

    /// One listing line per element: `  n. <name> (type = <type>)`.
    pub fn describe(&self) -> Vec<String> {
        self.transforms
            .iter()
            .enumerate()
            .map(|(i, t)| format!("  {}. {} (type = {})", i + 1, t.name, t.transform.type_name()))
            .collect()
    }
}

impl<const D: usize> Default for CompositeTransform<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Transform<D> for CompositeTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        self.transforms
            .iter()
            .rev()
            .fold(*point, |p, t| t.transform.transform_point(&p))
    }

    fn transform_points<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        self.transforms
            .iter()
            .rev()
            .fold(points, |p, t| t.transform.transform_points(p))
    }

    fn type_name(&self) -> &'static str {
        "CompositeTransform"
    }
}
