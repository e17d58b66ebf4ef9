//! Command line options and their validated form.

use clap::Parser;
use std::path::{Path, PathBuf};
use xform_core::{ConfigError, InterpolatorKind, ResampleError, Result, TransformSpec};

/// Dimensions a run can be dispatched to.
pub const SUPPORTED_DIMENSIONS: [usize; 3] = [2, 3, 4];

#[derive(Parser, Debug)]
#[command(name = "apply-transforms")]
#[command(about = "Resample an image through a chain of pre-computed transforms")]
pub struct Cli {
    /// Image dimensionality (2, 3 or 4); read from the input header when omitted
    #[arg(short, long)]
    pub dimensionality: Option<usize>,

    /// Image to be resampled
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Image defining the output grid; defaults to the input
    #[arg(short, long)]
    pub reference_image: Option<PathBuf>,

    /// Resampled image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Interpolation, e.g. Linear, NearestNeighbor, BSpline[3], Gaussian[1x1x2,1],
    /// MultiLabel[2,4] or LanczosWindowedSinc
    #[arg(short = 'n', long, default_value = "Linear")]
    pub interpolation: String,

    /// Transform file or [file,useInverse]; repeat in application order, last applied first
    #[arg(short, long = "transform")]
    pub transforms: Vec<String>,

    /// Value for output voxels that map outside the input
    #[arg(short = 'v', long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub default_value: f64,
}

/// Options for one resampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub dimensionality: Option<usize>,
    pub input: PathBuf,
    pub reference_image: Option<PathBuf>,
    pub output: PathBuf,
    pub interpolation: InterpolatorKind,
    pub transforms: Vec<TransformSpec>,
    pub default_value: f64,
}

impl TryFrom<Cli> for RunConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> std::result::Result<Self, Self::Error> {
        let input = cli.input.ok_or(ConfigError::MissingRequiredInput("input"))?;
        let output = cli.output.ok_or(ConfigError::MissingRequiredInput("output"))?;

        if let Some(d) = cli.dimensionality {
            check_dimension(d)?;
        }

        let interpolation = cli.interpolation.parse::<InterpolatorKind>()?;
        let transforms = cli
            .transforms
            .iter()
            .map(|t| t.parse::<TransformSpec>())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            dimensionality: cli.dimensionality,
            input,
            reference_image: cli.reference_image,
            output,
            interpolation,
            transforms,
            default_value: cli.default_value,
        })
    }
}

impl RunConfig {
    /// Image that defines the output grid.
    pub fn reference(&self) -> &Path {
        self.reference_image.as_deref().unwrap_or(&self.input)
    }

    /// Dimension to run in, from the options or else the input header.
    pub fn resolve_dimensionality(&self) -> Result<usize> {
        let d = match self.dimensionality {
            Some(d) => d,
            None => {
                let d = xform_io::read_dimensionality(&self.input)
                    .map_err(|e| ResampleError::io(&self.input, format!("{e:#}")))?;
                tracing::debug!("Inferred dimensionality {} from {}", d, self.input.display());
                d
            }
        };
        check_dimension(d)?;
        Ok(d)
    }
}

fn check_dimension(d: usize) -> std::result::Result<(), ConfigError> {
    if SUPPORTED_DIMENSIONS.contains(&d) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedDimension(d))
    }
}
