//! Building a transform chain from files.
//!
//! Each transform argument names a file and optionally asks for its inverse.
//! Files are first tried as displacement fields, then as generic transforms.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::trait_::Transform;
use super::{CompositeTransform, DisplacementFieldTransform, NamedTransform, SpatialTransform};
use crate::error::{ConfigError, TransformError};

/// One transform argument: `path` or `[path,useInverse]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    pub path: PathBuf,
    pub use_inverse: Option<bool>,
}

impl TransformSpec {
    /// Use the transform in `path` as stored.
    pub fn forward(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_inverse: None,
        }
    }

    /// Use the inverse of the transform in `path`.
    pub fn inverse(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_inverse: Some(true),
        }
    }

    /// True when the inverse was requested.
    pub fn wants_inverse(&self) -> bool {
        self.use_inverse == Some(true)
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

impl FromStr for TransformSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ConfigError::InvalidTransformSpec(s.to_string()));
        }
        let Some(rest) = text.strip_prefix('[') else {
            return Ok(Self::forward(text));
        };
        let inner = rest
            .strip_suffix(']')
            .ok_or_else(|| ConfigError::InvalidTransformSpec(s.to_string()))?;

        let (path, flag) = match inner.rsplit_once(',') {
            Some((path, flag)) => {
                let flag = parse_flag(flag).ok_or_else(|| ConfigError::InvalidTransformSpec(s.to_string()))?;
                (path.trim(), Some(flag))
            }
            None => (inner.trim(), None),
        };
        if path.is_empty() {
            return Err(ConfigError::InvalidTransformSpec(s.to_string()));
        }
        Ok(Self {
            path: PathBuf::from(path),
            use_inverse: flag,
        })
    }
}

impl fmt::Display for TransformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.use_inverse {
            None => write!(f, "{}", self.path.display()),
            Some(flag) => write!(f, "[{},{}]", self.path.display(), u8::from(flag)),
        }
    }
}

/// Loads transforms for the chain builder.
pub trait TransformSource<const D: usize> {
    /// Load `path` as a dense displacement field.
    fn read_displacement_field(&self, path: &Path) -> Result<DisplacementFieldTransform<D>, TransformError>;

    /// Load `path` as any other supported transform.
    fn read_transform(&self, path: &Path) -> Result<SpatialTransform<D>, TransformError>;
}

/// Resolves transform arguments into a [`CompositeTransform`].
pub struct TransformChainBuilder<'a, S> {
    source: &'a S,
}

impl<'a, S> TransformChainBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Load a single transform, probing for a displacement field first.
    pub fn resolve<const D: usize>(&self, spec: &TransformSpec) -> Result<NamedTransform<D>, TransformError>
    where
        S: TransformSource<D>,
    {
        let path_name = spec.path.display().to_string();

        match self.source.read_displacement_field(&spec.path) {
            Ok(field) => {
                if spec.wants_inverse() {
                    return Err(TransformError::no_inverse(path_name));
                }
                return Ok(NamedTransform::new(path_name, field));
            }
            Err(err) => {
                tracing::trace!("{} is not a displacement field: {}", path_name, err);
            }
        }

        let transform = self.source.read_transform(&spec.path).map_err(|err| match err {
            TransformError::UnreadableTransform { .. } => err,
            other => TransformError::unreadable(&spec.path, other.to_string()),
        })?;

        if spec.wants_inverse() {
            let inverse = transform
                .inverse()
                .ok_or_else(|| TransformError::no_inverse(path_name.clone()))?;
            Ok(NamedTransform::new(format!("inverse of {path_name}"), inverse))
        } else {
            Ok(NamedTransform::new(path_name, transform))
        }
    }

    /// Load every transform in order and append each to a fresh chain.
    ///
    /// The first failure aborts; no partial chain is returned.
    pub fn build<const D: usize>(&self, specs: &[TransformSpec]) -> Result<CompositeTransform<D>, TransformError>
    where
        S: TransformSource<D>,
    {
        let mut chain = CompositeTransform::new();
        for spec in specs {
            chain.push(self.resolve(spec)?);
        }

        tracing::info!("The composite transform comprises the following transforms (in order):");
        for line in chain.describe() {
            tracing::info!("{}", line);
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageGeometry;
    use crate::spatial::{Point, Vector};
    use crate::transform::AffineTransform;
    use nalgebra::SMatrix;
    use std::collections::HashMap;

    /// Transforms held in memory, keyed by path.
    #[derive(Default)]
    struct MemorySource {
        fields: HashMap<PathBuf, DisplacementFieldTransform<2>>,
        transforms: HashMap<PathBuf, SpatialTransform<2>>,
    }

    impl TransformSource<2> for MemorySource {
        fn read_displacement_field(&self, path: &Path) -> Result<DisplacementFieldTransform<2>, TransformError> {
            self.fields
                .get(path)
                .cloned()
                .ok_or_else(|| TransformError::unreadable(path, "not a field"))
        }

        fn read_transform(&self, path: &Path) -> Result<SpatialTransform<2>, TransformError> {
            self.transforms
                .get(path)
                .cloned()
                .ok_or_else(|| TransformError::unreadable(path, "no such file"))
        }
    }

    fn source() -> MemorySource {
        let mut source = MemorySource::default();
        source.transforms.insert(
            PathBuf::from("shift.tfm"),
            AffineTransform::from_translation(Vector::new([1.0, 2.0])).into(),
        );
        source.transforms.insert(
            PathBuf::from("singular.tfm"),
            AffineTransform::new(SMatrix::zeros(), Vector::zeros(), Point::origin()).into(),
        );
        source.fields.insert(
            PathBuf::from("warp.nii.gz"),
            DisplacementFieldTransform::zeros(ImageGeometry::with_size([3, 3])),
        );
        source
    }

    #[test]
    fn test_parse_transform_spec() {
        assert_eq!("A.tfm".parse::<TransformSpec>().unwrap(), TransformSpec::forward("A.tfm"));
        assert_eq!("[A.tfm,1]".parse::<TransformSpec>().unwrap(), TransformSpec::inverse("A.tfm"));
        assert_eq!(
            "[A.tfm, False]".parse::<TransformSpec>().unwrap(),
            TransformSpec { path: "A.tfm".into(), use_inverse: Some(false) }
        );
        assert_eq!(
            "[dir,with,commas/A.tfm,yes]".parse::<TransformSpec>().unwrap(),
            TransformSpec::inverse("dir,with,commas/A.tfm")
        );
        for bad in ["[A.tfm,maybe]", "[A.tfm,1", "[,1]", ""] {
            assert!(
                matches!(bad.parse::<TransformSpec>(), Err(ConfigError::InvalidTransformSpec(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_spec_display() {
        assert_eq!(TransformSpec::inverse("A.tfm").to_string(), "[A.tfm,1]");
        assert_eq!(TransformSpec::forward("A.tfm").to_string(), "A.tfm");
    }

    #[test]
    fn test_build_names_inverse() {
        let source = source();
        let builder = TransformChainBuilder::new(&source);
        let chain: CompositeTransform<2> = builder
            .build(&[TransformSpec::forward("warp.nii.gz"), TransformSpec::inverse("shift.tfm")])
            .unwrap();

        assert_eq!(
            chain.describe(),
            vec![
                "  1. identity (type = IdentityTransform)",
                "  2. warp.nii.gz (type = DisplacementFieldTransform)",
                "  3. inverse of shift.tfm (type = AffineTransform)",
            ]
        );
        let p = chain.transform_point(&Point::new([5.0, 5.0]));
        assert!(p.max_abs_diff(&Point::new([4.0, 3.0])) < 1e-12);
    }

    #[test]
    fn test_singular_inverse_is_rejected() {
        let source = source();
        let result: Result<CompositeTransform<2>, _> =
            TransformChainBuilder::new(&source).build(&[TransformSpec::inverse("singular.tfm")]);
        match result {
            Err(TransformError::NoInverseAvailable { name }) => assert_eq!(name, "singular.tfm"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_field_inverse_is_rejected() {
        let source = source();
        let result: Result<CompositeTransform<2>, _> =
            TransformChainBuilder::new(&source).build(&[TransformSpec::inverse("warp.nii.gz")]);
        assert!(matches!(result, Err(TransformError::NoInverseAvailable { .. })));
    }

    #[test]
    fn test_unreadable_transform_aborts() {
        let source = source();
        let result: Result<CompositeTransform<2>, _> = TransformChainBuilder::new(&source)
            .build(&[TransformSpec::forward("shift.tfm"), TransformSpec::forward("missing.tfm")]);
        match result {
            Err(TransformError::UnreadableTransform { path, reason }) => {
                assert_eq!(path, PathBuf::from("missing.tfm"));
                assert_eq!(reason, "no such file");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
