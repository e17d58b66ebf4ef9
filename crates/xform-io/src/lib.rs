//! File formats for xform: NIfTI images and displacement fields, and ITK
//! text transform files.

pub mod nifti_io;
pub mod transform_io;
pub mod loader;

pub use nifti_io::{read_dimensionality, read_displacement_field, read_nifti, write_displacement_field, write_nifti};
pub use transform_io::read_transform;
pub use loader::FileTransformSource;
