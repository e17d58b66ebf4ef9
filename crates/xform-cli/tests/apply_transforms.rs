use std::fs;
use std::path::Path;

use anyhow::Result;
use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use tempfile::tempdir;
use xform_cli::{execute, RunConfig};
use xform_core::{Direction, Image, InterpolatorKind, Point, ResampleError, Spacing, TransformError, TransformSpec};
use xform_io::{read_nifti, write_nifti};

type Backend = NdArray<f64>;

const FAR_SHIFT_2D: &str = "#Insight Transform File V1.0
#Transform 0
Transform: AffineTransform_double_2_2
Parameters: 1 0 0 1 100 100
FixedParameters: 0 0
";

fn values<const D: usize>(image: &Image<Backend, D>) -> Vec<f64> {
    image.data().to_data().into_vec::<f64>().unwrap()
}

fn write_image_2d(path: &Path, data: Vec<f64>, size: [usize; 2]) -> Result<()> {
    let device = Default::default();
    let tensor = Tensor::<Backend, 2>::from_data(TensorData::new(data, [size[1], size[0]]), &device);
    let image = Image::new(tensor, Point::origin(), Spacing::uniform(1.0), Direction::identity());
    write_nifti(path, &image)
}

fn config(input: &Path, output: &Path) -> RunConfig {
    RunConfig {
        dimensionality: None,
        input: input.to_path_buf(),
        reference_image: None,
        output: output.to_path_buf(),
        interpolation: InterpolatorKind::Linear,
        transforms: Vec::new(),
        default_value: 0.0,
    }
}

#[test]
fn test_identity_run_reproduces_input() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("constant.nii.gz");
    let output = dir.path().join("warped.nii.gz");
    write_image_2d(&input, vec![5.0; 100], [10, 10])?;

    let mut config = config(&input, &output);
    config.default_value = -1.0;
    execute(&config)?;

    let warped = read_nifti::<Backend, 2, _>(&output, &Default::default())?;
    assert_eq!(warped.shape(), [10, 10]);
    assert!(values(&warped).iter().all(|v| *v == 5.0));
    Ok(())
}

#[test]
fn test_far_translation_fills_default_value() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("constant.nii.gz");
    let output = dir.path().join("warped.nii.gz");
    let transform = dir.path().join("far.txt");
    write_image_2d(&input, vec![5.0; 100], [10, 10])?;
    fs::write(&transform, FAR_SHIFT_2D)?;

    let mut config = config(&input, &output);
    config.dimensionality = Some(2);
    config.transforms = vec![TransformSpec::forward(&transform)];
    config.interpolation = InterpolatorKind::NearestNeighbor;
    config.default_value = -2.0;
    execute(&config)?;

    let warped = read_nifti::<Backend, 2, _>(&output, &Default::default())?;
    assert!(values(&warped).iter().all(|v| *v == -2.0));
    Ok(())
}

#[test]
fn test_reference_image_sets_output_grid() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("ramp.nii");
    let reference = dir.path().join("reference.nii");
    let output = dir.path().join("warped.nii");
    write_image_2d(&input, (0..12).map(|v| v as f64).collect(), [4, 3])?;
    write_image_2d(&reference, vec![0.0; 6], [2, 3])?;

    let mut config = config(&input, &output);
    config.reference_image = Some(reference);
    execute(&config)?;

    let warped = read_nifti::<Backend, 2, _>(&output, &Default::default())?;
    assert_eq!(warped.shape(), [3, 2]);
    assert_eq!(values(&warped), vec![0.0, 1.0, 4.0, 5.0, 8.0, 9.0]);
    Ok(())
}

#[test]
fn test_dimensionality_is_read_from_input() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("volume.nii.gz");
    let output = dir.path().join("warped.nii.gz");

    let device = Default::default();
    let data: Vec<f64> = (0..24).map(|v| v as f64).collect();
    let tensor = Tensor::<Backend, 3>::from_data(TensorData::new(data.clone(), [2, 3, 4]), &device);
    write_nifti(&input, &Image::new(tensor, Point::origin(), Spacing::uniform(2.0), Direction::identity()))?;

    execute(&config(&input, &output))?;

    let warped = read_nifti::<Backend, 3, _>(&output, &device)?;
    assert_eq!(warped.shape(), [2, 3, 4]);
    for (a, b) in values(&warped).iter().zip(&data) {
        assert!((a - b).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn test_large_labels_and_default_value_are_exact() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("labels.nii.gz");
    let output = dir.path().join("warped.nii.gz");
    let labels = vec![16_777_217.0, 16_777_219.0, 0.0, 4_294_967_297.0, 16_777_217.0, 3.0];
    write_image_2d(&input, labels.clone(), [3, 2])?;

    let mut config = config(&input, &output);
    config.interpolation = InterpolatorKind::NearestNeighbor;
    execute(&config)?;
    let warped = read_nifti::<Backend, 2, _>(&output, &Default::default())?;
    assert_eq!(values(&warped), labels);

    let transform = dir.path().join("far.txt");
    fs::write(&transform, FAR_SHIFT_2D)?;
    config.transforms = vec![TransformSpec::forward(&transform)];
    config.default_value = 0.1;
    execute(&config)?;
    let warped = read_nifti::<Backend, 2, _>(&output, &Default::default())?;
    assert!(values(&warped).iter().all(|v| *v == 0.1));
    Ok(())
}

#[test]
fn test_failed_run_writes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("constant.nii.gz");
    let output = dir.path().join("warped.nii.gz");
    write_image_2d(&input, vec![5.0; 100], [10, 10])?;

    let mut config = config(&input, &output);
    config.transforms = vec![TransformSpec::forward(dir.path().join("missing.txt"))];

    match execute(&config) {
        Err(ResampleError::Transform(TransformError::UnreadableTransform { .. })) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempdir().unwrap();
    let config = config(&dir.path().join("absent.nii"), &dir.path().join("out.nii"));
    assert!(matches!(execute(&config), Err(ResampleError::Io { .. })));
}
