//! Interpolator selection from option strings.

use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::Backend;

use super::bspline::{BSplineInterpolator, DEFAULT_SPLINE_ORDER, MAX_SPLINE_ORDER};
use super::gaussian::{GaussianInterpolator, DEFAULT_GAUSSIAN_ALPHA};
use super::label_gaussian::{LabelGaussianInterpolator, DEFAULT_LABEL_ALPHA};
use super::windowed_sinc::{WindowFunction, WindowedSincInterpolator};
use super::{BoundInterpolator, Interpolation, LinearInterpolator, NearestNeighborInterpolator};
use crate::error::{ConfigError, Result};
use crate::image::{Image, ImageBuffer};
use crate::spatial::Vector;

/// An interpolation strategy chosen by name, not yet bound to an image.
///
/// Parsed from `Name` or `Name[p0,p1,...]`, case-insensitively:
///
/// | option | parameters |
/// |--------|------------|
/// | `Linear` | none |
/// | `NearestNeighbor` | none |
/// | `BSpline` | `[order=3]`, 0 to 5 |
/// | `Gaussian` | `[sigma=spacing, alpha=1.0]` |
/// | `MultiLabel` | `[sigma=spacing, alpha=4.0]` |
/// | `<Window>WindowedSinc` | none; window is Cosine, Welch, Hamming, Lanczos or Blackman |
///
/// Sigma is one value for every axis or `s0xs1x...` for one per axis.
///
/// ```
/// use xform_core::interpolation::InterpolatorKind;
///
/// let kind: InterpolatorKind = "bspline[5]".parse().unwrap();
/// assert_eq!(kind, InterpolatorKind::BSpline { order: 5 });
/// assert!("BSpline[two]".parse::<InterpolatorKind>().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InterpolatorKind {
    #[default]
    Linear,
    NearestNeighbor,
    BSpline { order: usize },
    Gaussian { sigma: Option<Vec<f64>>, alpha: f64 },
    MultiLabel { sigma: Option<Vec<f64>>, alpha: f64 },
    WindowedSinc(WindowFunction),
}

impl InterpolatorKind {
    /// Class name of the interpolator, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            InterpolatorKind::Linear => "LinearInterpolateImageFunction",
            InterpolatorKind::NearestNeighbor => "NearestNeighborInterpolateImageFunction",
            InterpolatorKind::BSpline { .. } => "BSplineInterpolateImageFunction",
            InterpolatorKind::Gaussian { .. } => "GaussianInterpolateImageFunction",
            InterpolatorKind::MultiLabel { .. } => "LabelImageGaussianInterpolateImageFunction",
            InterpolatorKind::WindowedSinc(_) => "WindowedSincInterpolateImageFunction",
        }
    }

    /// Bind to the samples of `image`.
    pub fn bind<B: Backend, const D: usize>(&self, image: &Image<B, D>) -> Result<BoundInterpolator<D>> {
        self.bind_buffer(ImageBuffer::from_image(image)?)
    }

    /// Bind to host samples.
    ///
    /// Missing Gaussian sigmas default to the buffer's spacing. B-spline
    /// coefficients are computed here, once per image.
    pub fn bind_buffer<const D: usize>(&self, buffer: ImageBuffer<D>) -> Result<BoundInterpolator<D>> {
        let interpolation = match self {
            InterpolatorKind::Linear => Interpolation::Linear(LinearInterpolator::new()),
            InterpolatorKind::NearestNeighbor => Interpolation::NearestNeighbor(NearestNeighborInterpolator::new()),
            InterpolatorKind::BSpline { order } => {
                let interp = BSplineInterpolator::new(*order).ok_or_else(|| invalid_order(&order.to_string()))?;
                let coefficients = interp.coefficients(&buffer);
                return Ok(BoundInterpolator::new(Interpolation::BSpline(interp), coefficients));
            }
            InterpolatorKind::Gaussian { sigma, alpha } => {
                let sigma = resolve_sigma(sigma.as_deref(), &buffer);
                Interpolation::Gaussian(GaussianInterpolator::new(sigma, *alpha))
            }
            InterpolatorKind::MultiLabel { sigma, alpha } => {
                let sigma = resolve_sigma(sigma.as_deref(), &buffer);
                Interpolation::MultiLabel(LabelGaussianInterpolator::new(sigma, *alpha))
            }
            InterpolatorKind::WindowedSinc(window) => {
                Interpolation::WindowedSinc(WindowedSincInterpolator::new(*window))
            }
        };
        Ok(BoundInterpolator::new(interpolation, buffer))
    }
}

/// Per-axis sigma: the given vector when it has one entry per axis, its first
/// entry broadcast otherwise, or the image spacing when absent.
fn resolve_sigma<const D: usize>(sigma: Option<&[f64]>, buffer: &ImageBuffer<D>) -> Vector<D> {
    match sigma {
        Some(values) if values.len() == D => Vector::from_slice(values),
        Some(values) if !values.is_empty() => Vector::new([values[0]; D]),
        _ => *buffer.geometry().spacing(),
    }
}

fn invalid_order(text: &str) -> ConfigError {
    ConfigError::invalid_parameter(
        "BSpline",
        format!("order must be an integer from 0 to {MAX_SPLINE_ORDER}, got '{text}'"),
    )
}

fn parse_sigma(interpolator: &str, text: &str) -> std::result::Result<Vec<f64>, ConfigError> {
    let sigma = text
        .split('x')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::invalid_parameter(interpolator, format!("cannot parse sigma '{text}'")))?;
    if sigma.iter().any(|s| !(*s > 0.0) || !s.is_finite()) {
        return Err(ConfigError::invalid_parameter(
            interpolator,
            format!("sigma must be positive, got '{text}'"),
        ));
    }
    Ok(sigma)
}

fn parse_alpha(interpolator: &str, text: &str) -> std::result::Result<f64, ConfigError> {
    match text.trim().parse::<f64>() {
        Ok(alpha) if alpha > 0.0 && alpha.is_finite() => Ok(alpha),
        _ => Err(ConfigError::invalid_parameter(
            interpolator,
            format!("alpha must be a positive number, got '{text}'"),
        )),
    }
}

/// Split `Name[a,b]` into the name and its parameters.
fn split_parameters(text: &str) -> std::result::Result<(&str, Vec<&str>), ConfigError> {
    let text = text.trim();
    let Some(open) = text.find('[') else {
        return Ok((text, Vec::new()));
    };
    let name = text[..open].trim();
    let Some(inner) = text[open + 1..].strip_suffix(']') else {
        return Err(ConfigError::invalid_parameter(name, format!("unbalanced brackets in '{text}'")));
    };
    let params = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(str::trim).collect()
    };
    Ok((name, params))
}

impl FromStr for InterpolatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, params) = split_parameters(s)?;
        let lower = name.to_ascii_lowercase();

        let too_many = |max: usize| -> std::result::Result<(), ConfigError> {
            if params.len() > max {
                Err(ConfigError::invalid_parameter(
                    name,
                    format!("expected at most {max} parameter(s), got {}", params.len()),
                ))
            } else {
                Ok(())
            }
        };

        let window = match lower.as_str() {
            "cosinewindowedsinc" => Some(WindowFunction::Cosine),
            "welchwindowedsinc" => Some(WindowFunction::Welch),
            "hammingwindowedsinc" => Some(WindowFunction::Hamming),
            "lanczoswindowedsinc" => Some(WindowFunction::Lanczos),
            "blackmanwindowedsinc" => Some(WindowFunction::Blackman),
            _ => None,
        };
        if let Some(window) = window {
            too_many(0)?;
            return Ok(InterpolatorKind::WindowedSinc(window));
        }

        match lower.as_str() {
            "linear" => {
                too_many(0)?;
                Ok(InterpolatorKind::Linear)
            }
            "nearestneighbor" => {
                too_many(0)?;
                Ok(InterpolatorKind::NearestNeighbor)
            }
            "bspline" => {
                too_many(1)?;
                let order = match params.first() {
                    None => DEFAULT_SPLINE_ORDER,
                    Some(text) => match text.parse::<usize>() {
                        Ok(order) if order <= MAX_SPLINE_ORDER => order,
                        _ => return Err(invalid_order(text)),
                    },
                };
                Ok(InterpolatorKind::BSpline { order })
            }
            "gaussian" | "multilabel" => {
                too_many(2)?;
                let sigma = params.first().map(|text| parse_sigma(name, text)).transpose()?;
                let default_alpha = if lower == "gaussian" {
                    DEFAULT_GAUSSIAN_ALPHA
                } else {
                    DEFAULT_LABEL_ALPHA
                };
                let alpha = params
                    .get(1)
                    .map(|text| parse_alpha(name, text))
                    .transpose()?
                    .unwrap_or(default_alpha);
                if lower == "gaussian" {
                    Ok(InterpolatorKind::Gaussian { sigma, alpha })
                } else {
                    Ok(InterpolatorKind::MultiLabel { sigma, alpha })
                }
            }
            _ => Err(ConfigError::UnknownInterpolator(s.trim().to_string())),
        }
    }
}

impl fmt::Display for InterpolatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolatorKind::Linear => write!(f, "Linear"),
            InterpolatorKind::NearestNeighbor => write!(f, "NearestNeighbor"),
            InterpolatorKind::BSpline { order } => write!(f, "BSpline[{order}]"),
            InterpolatorKind::Gaussian { sigma, alpha } | InterpolatorKind::MultiLabel { sigma, alpha } => {
                let label = if matches!(self, InterpolatorKind::Gaussian { .. }) {
                    "Gaussian"
                } else {
                    "MultiLabel"
                };
                match sigma {
                    Some(sigma) => {
                        let sigma: Vec<String> = sigma.iter().map(|s| s.to_string()).collect();
                        write!(f, "{label}[{},{alpha}]", sigma.join("x"))
                    }
                    None => write!(f, "{label}"),
                }
            }
            InterpolatorKind::WindowedSinc(window) => write!(f, "{}WindowedSinc", window.name()),
        }
    }
}
