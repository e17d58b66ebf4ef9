//! ITK text transform files (`#Insight Transform File V1.0`).
//!
//! Only the first transform of a file is used. Supported classes are the
//! linear ones that map onto [`AffineTransform`] plus the identity.

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::SMatrix;
use std::path::Path;
use xform_core::spatial::{Point, Vector};
use xform_core::transform::{AffineTransform, IdentityTransform, SpatialTransform};

const FILE_MAGIC: &str = "#Insight Transform File";

/// One `Transform:` block of a transform file.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRecord {
    /// Full class name, e.g. `AffineTransform_double_3_3`.
    pub class_name: String,
    pub parameters: Vec<f64>,
    pub fixed_parameters: Vec<f64>,
}

impl TransformRecord {
    /// Class without precision and dimension suffixes, e.g. `AffineTransform`.
    pub fn base_name(&self) -> &str {
        self.class_name.split('_').next().unwrap_or(&self.class_name)
    }

    /// Input and output dimensions encoded in the class name.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        let mut parts = self.class_name.rsplit('_');
        let output = parts.next()?.parse().ok()?;
        let input = parts.next()?.parse().ok()?;
        Some((input, output))
    }
}

/// Read the first transform in an ITK text transform file.
pub fn read_transform<const D: usize, P: AsRef<Path>>(path: P) -> Result<SpatialTransform<D>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transform file {}", path.display()))?;
    let records = parse_transform_file(&text).with_context(|| format!("Failed to parse {}", path.display()))?;

    if records.len() > 1 {
        tracing::warn!(
            "{} holds {} transforms; only the first is used",
            path.display(),
            records.len()
        );
    }
    let record = records
        .first()
        .ok_or_else(|| anyhow!("{} contains no transform", path.display()))?;
    to_spatial_transform(record)
}

/// Split an ITK text transform file into its transform records.
pub fn parse_transform_file(text: &str) -> Result<Vec<TransformRecord>> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    match lines.next() {
        Some(first) if first.starts_with(FILE_MAGIC) => {}
        _ => bail!("missing '{}' header", FILE_MAGIC),
    }

    let mut records: Vec<TransformRecord> = Vec::new();
    for line in lines {
        if line.starts_with('#') {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| anyhow!("malformed line '{}'", line))?;
        let value = value.trim();

        match key.trim() {
            "Transform" => records.push(TransformRecord {
                class_name: value.to_string(),
                parameters: Vec::new(),
                fixed_parameters: Vec::new(),
            }),
            "Parameters" => {
                let record = records.last_mut().ok_or_else(|| anyhow!("Parameters before Transform"))?;
                record.parameters = parse_numbers(value)?;
            }
            "FixedParameters" => {
                let record = records
                    .last_mut()
                    .ok_or_else(|| anyhow!("FixedParameters before Transform"))?;
                record.fixed_parameters = parse_numbers(value)?;
            }
            other => tracing::debug!("Ignoring transform file key '{}'", other),
        }
    }
    Ok(records)
}

fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|n| n.parse::<f64>().with_context(|| format!("invalid number '{}'", n)))
        .collect()
}

/// Build a transform from one record.
pub fn to_spatial_transform<const D: usize>(record: &TransformRecord) -> Result<SpatialTransform<D>> {
    match record.dimensions() {
        Some((input, output)) if input == D && output == D => {}
        _ => bail!("{} is not a {}-D transform", record.class_name, D),
    }

    let center = fixed_center::<D>(record)?;
    let params = &record.parameters;
    let transform = match record.base_name() {
        "IdentityTransform" => return Ok(SpatialTransform::Identity(IdentityTransform)),
        "AffineTransform" | "MatrixOffsetTransformBase" => {
            expect_parameters(record, D * D + D)?;
            let matrix = SMatrix::<f64, D, D>::from_row_slice(&params[..D * D]);
            AffineTransform::new(matrix, Vector::from_slice(&params[D * D..]), center)
        }
        "TranslationTransform" => {
            expect_parameters(record, D)?;
            AffineTransform::new(SMatrix::identity(), Vector::from_slice(params), center)
        }
        "Euler2DTransform" => {
            expect_parameters(record, 3)?;
            let rotation = AffineTransform::<2>::from_rotation_2d(params[0], Vector::zeros(), Point::origin());
            let matrix = SMatrix::<f64, D, D>::from_row_slice(rotation.matrix().transpose().as_slice());
            AffineTransform::new(matrix, Vector::from_slice(&params[1..]), center)
        }
        "Euler3DTransform" => {
            expect_parameters(record, 6)?;
            let zyx = record.fixed_parameters.get(3).is_some_and(|flag| *flag != 0.0);
            let rotation = AffineTransform::<3>::from_euler_3d(
                [params[0], params[1], params[2]],
                Vector::zeros(),
                Point::origin(),
                zyx,
            );
            let matrix = SMatrix::<f64, D, D>::from_row_slice(rotation.matrix().transpose().as_slice());
            AffineTransform::new(matrix, Vector::from_slice(&params[3..]), center)
        }
        other => bail!("Unsupported transform type {}", other),
    };
    Ok(SpatialTransform::Affine(transform))
}

fn expect_parameters(record: &TransformRecord, count: usize) -> Result<()> {
    if record.parameters.len() != count {
        bail!(
            "{} expects {} parameters, found {}",
            record.class_name,
            count,
            record.parameters.len()
        );
    }
    Ok(())
}

/// Center of rotation from the fixed parameters; the origin when absent.
fn fixed_center<const D: usize>(record: &TransformRecord) -> Result<Point<D>> {
    match record.fixed_parameters.len() {
        0 => Ok(Point::origin()),
        n if n >= D => Ok(Point::from_slice(&record.fixed_parameters[..D])),
        n => bail!("{} needs {} fixed parameters, found {}", record.class_name, D, n),
    }
}
