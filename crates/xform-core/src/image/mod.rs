//! Image types and operations.
//!
//! This module provides the Image type, its validated geometry, index grids
//! for batched resampling, and host-side sample buffers.

pub mod image;
pub mod geometry;
pub mod buffer;
pub mod grid;

pub use image::Image;
pub use geometry::ImageGeometry;
pub use buffer::ImageBuffer;
pub use grid::generate_grid;
