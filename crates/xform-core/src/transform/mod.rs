//! Transform types and operations.
//!
//! This module provides transform traits and implementations
//! for spatial coordinate transformations, and the chain that composes them.

pub mod trait_;
pub mod identity;
pub mod affine;
pub mod displacement_field;
pub mod spatial_transform;
pub mod composite;
pub mod builder;

pub use trait_::Transform;
pub use identity::IdentityTransform;
pub use affine::AffineTransform;
pub use displacement_field::DisplacementFieldTransform;
pub use spatial_transform::SpatialTransform;
pub use composite::{CompositeTransform, NamedTransform};
pub use builder::{TransformChainBuilder, TransformSource, TransformSpec};
