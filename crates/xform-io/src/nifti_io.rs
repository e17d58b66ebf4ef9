//! NIfTI image and displacement field I/O.
//!
//! NIfTI stores geometry in RAS (x to the right, y anterior) while images
//! here use ITK's LPS frame, so the x and y rows of the stored affine flip
//! sign on the way in and out. Displacement vectors are stored in LPS already
//! and pass through unchanged.

use anyhow::{bail, Context, Result};
use burn::tensor::backend::Backend;
use nalgebra::SMatrix;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;
use xform_core::image::{Image, ImageBuffer, ImageGeometry};
use xform_core::spatial::{Direction, Point, Spacing};
use xform_core::transform::DisplacementFieldTransform;

/// `NIFTI_XFORM_ALIGNED_ANAT`, the sform code written with every image.
const SFORM_ALIGNED: i16 = 2;

/// `NIFTI_INTENT_VECTOR`, used for displacement fields.
const INTENT_VECTOR: i16 = 1007;

/// Columns of a direction shorter than this are treated as degenerate.
const MIN_AXIS_NORM: f64 = 1e-9;

/// Read the number of dimensions recorded in a NIfTI header.
pub fn read_dimensionality<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let header = NiftiHeader::from_file(path)
        .with_context(|| format!("Failed to read NIfTI header from {}", path.display()))?;
    Ok(header.dim[0] as usize)
}

/// Read a scalar NIfTI image with `D` spatial dimensions.
///
/// Geometry comes from the sform when present, then the qform, then pixdim
/// alone. Voxels are converted to `f64`.
pub fn read_nifti<B: Backend, const D: usize, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Image<B, D>> {
    let path = path.as_ref();
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI file {}", path.display()))?;
    let header = obj.header().clone();

    let volume = obj
        .into_volume()
        .into_ndarray::<f64>()
        .context("Failed to convert volume to ndarray")?;
    let size = spatial_size::<D>(volume.shape())
        .with_context(|| format!("Unexpected NIfTI shape in {}", path.display()))?;

    let geometry = geometry_from_header(&header, size)?;
    // Reversing the axes makes standard iteration order x-fastest.
    let values: Vec<f64> = volume.t().iter().copied().collect();

    let buffer = ImageBuffer::new(geometry, values)?;
    tracing::debug!("Read {} with size {:?}", path.display(), buffer.geometry().size());
    Ok(Image::from_buffer(buffer, device))
}

/// Write an image to a NIfTI file, compressed when the path ends in `.gz`.
pub fn write_nifti<B: Backend, const D: usize, P: AsRef<Path>>(path: P, image: &Image<B, D>) -> Result<()> {
    let path = path.as_ref();
    let buffer = ImageBuffer::from_image(image)?;
    let header = header_for_geometry(buffer.geometry());

    let size = buffer.geometry().size();
    let array = ArrayD::from_shape_vec(IxDyn(&size).f(), buffer.into_values())
        .context("Failed to create ndarray")?;

    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(&array)
        .with_context(|| format!("Failed to write NIfTI file {}", path.display()))?;
    Ok(())
}

/// Read a displacement field stored as a 5-D vector image `[x, y, (z), 1, D]`.
pub fn read_displacement_field<const D: usize, P: AsRef<Path>>(path: P) -> Result<DisplacementFieldTransform<D>> {
    let path = path.as_ref();
    let obj = ReaderOptions::new()
        .read_file(path)
        .with_context(|| format!("Failed to read NIfTI file {}", path.display()))?;
    let header = obj.header().clone();

    if header.dim[0] != 5 || header.dim[5] as usize != D {
        bail!(
            "{} is not a {}-D displacement field (dim = {:?})",
            path.display(),
            D,
            &header.dim[..6]
        );
    }

    let volume = obj
        .into_volume()
        .into_ndarray::<f64>()
        .context("Failed to convert displacement field to ndarray")?;
    let shape = volume.shape().to_vec();
    let size: [usize; D] = std::array::from_fn(|axis| shape[axis]);
    let voxels: usize = shape[..shape.len() - 1].iter().product();
    if voxels != size.iter().product::<usize>() {
        bail!("Displacement field {} has more than one time point", path.display());
    }

    let geometry = geometry_from_header(&header, size)?;
    let values: Vec<f64> = volume.t().iter().copied().collect();

    let components = values
        .chunks(voxels)
        .map(|chunk| ImageBuffer::new(geometry.clone(), chunk.to_vec()))
        .collect::<xform_core::Result<Vec<_>>>()?;

    tracing::debug!("Read displacement field {} with size {:?}", path.display(), size);
    Ok(DisplacementFieldTransform::new(components)?)
}

/// Write a displacement field as a 5-D vector image.
pub fn write_displacement_field<const D: usize, P: AsRef<Path>>(
    path: P,
    field: &DisplacementFieldTransform<D>,
) -> Result<()> {
    let path = path.as_ref();
    let geometry = field.geometry();
    let mut header = header_for_geometry(geometry);
    header.intent_code = INTENT_VECTOR;

    let mut shape = vec![1usize; 5];
    for (axis, len) in geometry.size().iter().enumerate() {
        shape[axis] = *len;
    }
    shape[4] = D;

    let mut values = Vec::with_capacity(geometry.num_voxels() * D);
    for component in field.components() {
        values.extend_from_slice(component.values());
    }

    let array = ArrayD::from_shape_vec(IxDyn(&shape).f(), values).context("Failed to create ndarray")?;
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(&array)
        .with_context(|| format!("Failed to write NIfTI file {}", path.display()))?;
    Ok(())
}

/// Spatial size of a volume with `D` dimensions, ignoring trailing singleton axes.
fn spatial_size<const D: usize>(shape: &[usize]) -> Result<[usize; D]> {
    if shape[D.min(shape.len())..].iter().any(|&len| len != 1) {
        bail!("expected {} spatial dimensions, found shape {:?}", D, shape);
    }
    Ok(std::array::from_fn(|axis| shape.get(axis).copied().unwrap_or(1)))
}

/// The stored voxel-to-RAS affine as three rows of `[m0, m1, m2, t]`.
fn ras_affine(header: &NiftiHeader) -> [[f64; 4]; 3] {
    let widen = |row: [f32; 4]| row.map(f64::from);

    if header.sform_code > 0 {
        [widen(header.srow_x), widen(header.srow_y), widen(header.srow_z)]
    } else if header.qform_code > 0 {
        // Quaternion representation, see the NIfTI-1 standard
        let b = header.quatern_b as f64;
        let c = header.quatern_c as f64;
        let d = header.quatern_d as f64;
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();

        let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let dx = header.pixdim[1] as f64;
        let dy = header.pixdim[2] as f64;
        let dz = header.pixdim[3] as f64 * qfac;

        [
            [
                (a * a + b * b - c * c - d * d) * dx,
                (2.0 * b * c - 2.0 * a * d) * dy,
                (2.0 * b * d + 2.0 * a * c) * dz,
                header.quatern_x as f64,
            ],
            [
                (2.0 * b * c + 2.0 * a * d) * dx,
                (a * a + c * c - b * b - d * d) * dy,
                (2.0 * c * d - 2.0 * a * b) * dz,
                header.quatern_y as f64,
            ],
            [
                (2.0 * b * d - 2.0 * a * c) * dx,
                (2.0 * c * d + 2.0 * a * b) * dy,
                (a * a + d * d - c * c - b * b) * dz,
                header.quatern_z as f64,
            ],
        ]
    } else {
        // Fallback: use pixdim scaling only
        let p = |i: usize| header.pixdim[i] as f64;
        [
            [p(1), 0.0, 0.0, 0.0],
            [0.0, p(2), 0.0, 0.0],
            [0.0, 0.0, p(3), 0.0],
        ]
    }
}

/// Geometry in LPS from the header affine.
///
/// Only the first three axes are oriented; a fourth axis keeps unit direction,
/// zero origin and its pixdim spacing.
fn geometry_from_header<const D: usize>(header: &NiftiHeader, size: [usize; D]) -> Result<ImageGeometry<D>> {
    let mut affine = ras_affine(header);
    for row in affine.iter_mut().take(2) {
        row.iter_mut().for_each(|v| *v = -*v);
    }

    let mut origin = Point::<D>::origin();
    let mut spacing = Spacing::<D>::uniform(1.0);
    let mut direction = Direction::<D>::identity();

    for col in 0..D.min(3) {
        let column = nalgebra::Vector3::new(affine[0][col], affine[1][col], affine[2][col]);
        let norm = column.norm();
        if norm > MIN_AXIS_NORM {
            spacing[col] = norm;
            for row in 0..D.min(3) {
                direction[(row, col)] = column[row] / norm;
            }
        } else {
            let pixdim = header.pixdim[col + 1] as f64;
            spacing[col] = if pixdim > 0.0 { pixdim } else { 1.0 };
        }
    }
    for axis in 0..D.min(3) {
        origin[axis] = affine[axis][3];
    }
    for axis in 3..D {
        let pixdim = header.pixdim[axis + 1] as f64;
        spacing[axis] = if pixdim > 0.0 { pixdim } else { 1.0 };
    }

    Ok(ImageGeometry::new(origin, spacing, direction, size)?)
}

/// A header carrying `geometry` as an aligned sform, converted back to RAS.
fn header_for_geometry<const D: usize>(geometry: &ImageGeometry<D>) -> NiftiHeader {
    let mut scaled = SMatrix::<f64, 3, 3>::identity();
    let mut translation = [0.0f64; 3];
    for row in 0..D.min(3) {
        for col in 0..D.min(3) {
            scaled[(row, col)] = geometry.direction()[(row, col)] * geometry.spacing()[col];
        }
        translation[row] = geometry.origin()[row];
    }
    for row in 0..2 {
        for col in 0..3 {
            scaled[(row, col)] = -scaled[(row, col)];
        }
        translation[row] = -translation[row];
    }

    let srow = |row: usize| {
        [
            scaled[(row, 0)] as f32,
            scaled[(row, 1)] as f32,
            scaled[(row, 2)] as f32,
            translation[row] as f32,
        ]
    };

    let mut header = NiftiHeader::default();
    header.pixdim = [1.0; 8];
    for axis in 0..D {
        header.pixdim[axis + 1] = geometry.spacing()[axis] as f32;
    }
    header.sform_code = SFORM_ALIGNED;
    header.qform_code = 0;
    header.srow_x = srow(0);
    header.srow_y = srow(1);
    header.srow_z = srow(2);
    header
}
