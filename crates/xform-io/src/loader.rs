//! Transform loading from files on disk.

use std::path::Path;
use xform_core::error::TransformError;
use xform_core::transform::{DisplacementFieldTransform, SpatialTransform, TransformSource};

use crate::{nifti_io, transform_io};

/// Reads displacement fields from NIfTI files and other transforms from ITK
/// text transform files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransformSource;

impl FileTransformSource {
    pub fn new() -> Self {
        Self
    }
}

impl<const D: usize> TransformSource<D> for FileTransformSource {
    fn read_displacement_field(&self, path: &Path) -> Result<DisplacementFieldTransform<D>, TransformError> {
        nifti_io::read_displacement_field::<D, _>(path).map_err(|e| TransformError::unreadable(path, format!("{e:#}")))
    }

    fn read_transform(&self, path: &Path) -> Result<SpatialTransform<D>, TransformError> {
        transform_io::read_transform::<D, _>(path).map_err(|e| TransformError::unreadable(path, format!("{e:#}")))
    }
}
