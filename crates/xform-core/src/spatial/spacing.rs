//! Spacing type for representing physical distances between pixels/voxels.

use super::Vector;

/// Spacing between adjacent pixels/voxels along each axis.
///
/// This is a type alias to Vector for semantic clarity.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Create uniform spacing (same value for all dimensions).
    pub fn uniform(value: f64) -> Self {
        Self::new([value; D])
    }

    /// True when every component is finite and strictly positive.
    pub fn is_strictly_positive(&self) -> bool {
        (0..D).all(|i| self[i].is_finite() && self[i] > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Spacing3 = Spacing<3>;

    #[test]
    fn test_spacing_uniform() {
        assert_eq!(Spacing3::uniform(1.5), Spacing3::new([1.5, 1.5, 1.5]));
    }

    #[test]
    fn test_spacing_positivity() {
        assert!(Spacing3::new([0.5, 1.0, 2.0]).is_strictly_positive());
        assert!(!Spacing3::new([0.5, 0.0, 2.0]).is_strictly_positive());
        assert!(!Spacing3::new([0.5, -1.0, 2.0]).is_strictly_positive());
        assert!(!Spacing3::new([f64::NAN, 1.0, 1.0]).is_strictly_positive());
    }
}
