//! Separable neighborhoods shared by the kernel-based interpolators.

use smallvec::SmallVec;

/// Inline capacity of one axis; covers every fixed-support kernel.
pub(crate) const AXIS_CAPACITY: usize = 8;

/// Per-axis weights, kept off the heap for the fixed-support kernels.
pub(crate) type Weights = SmallVec<[f64; AXIS_CAPACITY]>;

/// Consecutive indices along one axis, starting at `start`, each with a weight.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AxisWeights {
    pub start: isize,
    pub weights: Weights,
}

impl AxisWeights {
    pub fn new(start: isize, weights: Weights) -> Self {
        Self { start, weights }
    }
}

/// Visit every index of the outer product of `axes`, passing the product of
/// the per-axis weights. Axis 0 varies fastest.
pub(crate) fn for_each_neighbor<const D: usize>(
    axes: &[AxisWeights; D],
    mut visit: impl FnMut(&[isize; D], f64),
) {
    if axes.iter().any(|axis| axis.weights.is_empty()) {
        return;
    }

    let mut counters = [0usize; D];
    let mut index = [0isize; D];
    loop {
        let mut weight = 1.0;
        for axis in 0..D {
            index[axis] = axes[axis].start + counters[axis] as isize;
            weight *= axes[axis].weights[counters[axis]];
        }
        visit(&index, weight);

        let mut axis = 0;
        loop {
            if axis == D {
                return;
            }
            counters[axis] += 1;
            if counters[axis] < axes[axis].weights.len() {
                break;
            }
            counters[axis] = 0;
            axis += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_visits_outer_product_x_fastest() {
        let axes = [
            AxisWeights::new(0, smallvec![0.25, 0.75]),
            AxisWeights::new(5, smallvec![0.5, 0.5]),
        ];
        let mut seen = Vec::new();
        for_each_neighbor(&axes, |index, weight| seen.push((*index, weight)));

        assert_eq!(
            seen,
            vec![
                ([0, 5], 0.125),
                ([1, 5], 0.375),
                ([0, 6], 0.125),
                ([1, 6], 0.375),
            ]
        );
    }

    #[test]
    fn test_empty_axis_visits_nothing() {
        let axes = [AxisWeights::new(0, smallvec![1.0]), AxisWeights::new(0, Weights::new())];
        let mut count = 0;
        for_each_neighbor(&axes, |_, _| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_fixed_kernels_stay_inline() {
        let axis = AxisWeights::new(-2, (0..6).map(f64::from).collect());
        assert!(!axis.weights.spilled());
    }
}
