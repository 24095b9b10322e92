//! 3-parameter logistic response model.
//!
//! P(θ) = c + (1 - c) / (1 + exp(-a(θ - b)))
//!
//! Everything here is a pure function of its arguments.

/// Probability of a correct response under the 3PL model.
///
/// The result lies in `[c, 1)` for finite inputs and is strictly increasing
/// in `theta` when `a > 0` and `c < 1`.
#[inline]
pub fn probability_correct(theta: f64, b: f64, a: f64, c: f64) -> f64 {
    let exponent = -a * (theta - b);
    c + (1.0 - c) / (1.0 + exponent.exp())
}

/// Fisher information of an item at `theta`.
///
/// I(θ) = a² (p - c)² (1 - p) / ((1 - c)² p)
///
/// Returns `0.0` in the degenerate region `p <= c` or `p >= 1`, where the
/// item carries no discriminating power.
#[inline]
pub fn information(theta: f64, b: f64, a: f64, c: f64) -> f64 {
    let p = probability_correct(theta, b, a, c);
    if p <= c || p >= 1.0 {
        return 0.0;
    }
    let q = 1.0 - p;
    let numerator = a * a * (p - c) * (p - c) * q;
    let denominator = (1.0 - c) * (1.0 - c) * p;
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Total information of a set of difficulties at `theta`, using the shared
/// discrimination and guessing parameters.
pub fn test_information<I>(theta: f64, difficulties: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    use crate::model::{DEFAULT_DISCRIMINATION, DEFAULT_GUESSING};

    difficulties
        .into_iter()
        .map(|b| information(theta, b, DEFAULT_DISCRIMINATION, DEFAULT_GUESSING))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_DISCRIMINATION as A, DEFAULT_GUESSING as C};

    #[test]
    fn probability_at_difficulty_is_midpoint() {
        let p = probability_correct(0.5, 0.5, A, C);
        assert!((p - 0.625).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn probability_approaches_guessing_floor() {
        let p = probability_correct(-40.0, 0.0, A, C);
        assert!(p >= C);
        assert!((p - C).abs() < 1e-9);
    }

    #[test]
    fn information_zero_in_degenerate_region() {
        // exp(800) overflows to infinity, so p == c exactly.
        assert_eq!(information(-800.0, 0.0, A, C), 0.0);
        // p rounds to exactly 1.0 far above the item.
        assert_eq!(information(800.0, 0.0, A, C), 0.0);
    }

    #[test]
    fn information_peaks_slightly_above_difficulty() {
        // With guessing, the 3PL information maximum sits above b.
        let at_b = information(0.0, 0.0, A, C);
        let above = information(0.3, 0.0, A, C);
        let far = information(3.0, 0.0, A, C);
        assert!(above > at_b);
        assert!(at_b > far);
    }

    #[test]
    fn test_information_sums_items() {
        let single = information(0.0, 1.0, A, C);
        let total = test_information(0.0, [1.0, 1.0, 1.0]);
        assert!((total - 3.0 * single).abs() < 1e-12);
        assert_eq!(test_information(0.0, std::iter::empty()), 0.0);
    }

    mod proptest_irt {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Probability stays within the [c, 1] envelope.
            #[test]
            fn probability_bounded(
                theta in -10.0f64..10.0,
                b in -5.0f64..5.0,
                a in 0.1f64..3.0,
                c in 0.01f64..0.99,
            ) {
                let p = probability_correct(theta, b, a, c);
                prop_assert!(p >= c, "p={} < c={}", p, c);
                prop_assert!(p <= 1.0);
            }

            /// Probability is strictly increasing in theta away from saturation.
            #[test]
            fn probability_monotone(
                theta in -4.0f64..4.0,
                step in 0.01f64..1.0,
                b in -3.0f64..3.0,
            ) {
                let lo = probability_correct(theta, b, A, C);
                let hi = probability_correct(theta + step, b, A, C);
                prop_assert!(hi > lo);
            }

            /// Information is finite and non-negative, zero exactly when p <= c.
            #[test]
            fn information_nonnegative(
                theta in -50.0f64..50.0,
                b in -5.0f64..5.0,
            ) {
                let info = information(theta, b, A, C);
                prop_assert!(info.is_finite());
                prop_assert!(info >= 0.0);
                let p = probability_correct(theta, b, A, C);
                if p <= C || p >= 1.0 {
                    prop_assert_eq!(info, 0.0);
                } else {
                    prop_assert!(info > 0.0);
                }
            }
        }
    }
}
