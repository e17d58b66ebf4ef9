//! The resampling pipeline behind `apply-transforms`.

use burn_ndarray::{NdArray, NdArrayDevice};
use std::path::Path;
use xform_core::{ConfigError, Image, ResampleError, ResampleImageFilter, Result, TransformChainBuilder};
use xform_io::{read_nifti, write_nifti, FileTransformSource};

use crate::config::RunConfig;

/// Backend images are loaded onto. Double precision keeps integer labels
/// above 2^24 and default values such as 0.1 exact.
pub type CpuBackend = NdArray<f64>;

/// Run `config` in the dimension given by the options or the input header.
pub fn execute(config: &RunConfig) -> Result<()> {
    match config.resolve_dimensionality()? {
        2 => run::<2>(config),
        3 => run::<3>(config),
        4 => run::<4>(config),
        d => Err(ConfigError::UnsupportedDimension(d).into()),
    }
}

/// Read, resample and write in `D` dimensions.
///
/// The output file is written only after every other step succeeded.
pub fn run<const D: usize>(config: &RunConfig) -> Result<()> {
    let device = NdArrayDevice::default();

    tracing::info!("Input object: {}", config.input.display());
    let input = load::<D>(&config.input, &device)?;

    let geometry = match &config.reference_image {
        Some(path) => {
            tracing::info!("Reference image: {}", path.display());
            load::<D>(path, &device)?.geometry()?
        }
        None => {
            tracing::info!("Reference image: {} (input)", config.input.display());
            input.geometry()?
        }
    };

    let chain = TransformChainBuilder::new(&FileTransformSource).build::<D>(&config.transforms)?;

    tracing::info!("Interpolation type: {}", config.interpolation.name());
    tracing::info!("Default pixel value: {}", config.default_value);

    let filter = ResampleImageFilter::new_from_reference(geometry, chain, config.interpolation.clone())
        .with_default_pixel_value(config.default_value);
    let output = filter.apply(&input)?;

    tracing::info!("Output warped image: {}", config.output.display());
    write_nifti(&config.output, &output).map_err(|e| ResampleError::io(&config.output, format!("{e:#}")))
}

fn load<const D: usize>(path: &Path, device: &NdArrayDevice) -> Result<Image<CpuBackend, D>> {
    read_nifti::<CpuBackend, D, _>(path, device).map_err(|e| ResampleError::io(path, format!("{e:#}")))
}
