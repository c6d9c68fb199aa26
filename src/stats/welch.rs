//! Welch's two-sample t-test with a normal-tail p-value approximation
//!
//! The p-value deliberately approximates the Student-t distribution with the
//! standard normal tail (Abramowitz–Stegun erf), scaling `t` by
//! `sqrt(df / (df + t²))` for small degrees of freedom. This matches the
//! original product's numeric fixtures and is documented as a simplification,
//! not an exact t-distribution.

use super::VariantStatistics;

/// Floor applied to a zero standard error when the two means differ.
///
/// A zero spread with distinct means is complete separation, not "no
/// detectable difference"; flooring the denominator drives the p-value to
/// zero instead of dividing by zero.
pub(crate) const SE_FLOOR: f64 = 1e-9;

/// Degrees-of-freedom boundary below which the t statistic is scaled before
/// applying the normal tail.
const SMALL_SAMPLE_DF: f64 = 30.0;

/// Outcome of a Welch two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTest {
    /// Welch t statistic.
    pub t_statistic: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value (normal approximation).
    pub p_value: f64,
}

/// Run Welch's t-test of `variant` against `control`.
///
/// Degenerate inputs never panic:
/// - empty groups behave as zero-mean, zero-spread samples;
/// - `se == 0` with equal means yields `t = 0`, `p = 1`;
/// - `se == 0` with distinct means yields a floored standard error, so the
///   difference registers as maximally significant.
#[must_use]
pub fn welch_t_test(control: &VariantStatistics, variant: &VariantStatistics) -> WelchTest {
    #[allow(clippy::cast_precision_loss)]
    let (n1, n2) = (control.sample_size.max(1) as f64, variant.sample_size.max(1) as f64);
    let (var1, var2) = (control.variance(), variant.variance());

    let mean_diff = variant.mean - control.mean;
    let se = (var1 / n1 + var2 / n2).sqrt();

    let t_statistic = if se == 0.0 {
        if mean_diff == 0.0 {
            0.0
        } else {
            mean_diff / SE_FLOOR
        }
    } else {
        mean_diff / se
    };

    let degrees_of_freedom = satterthwaite(var1, n1, var2, n2);
    let p_value = two_tailed_p(t_statistic, degrees_of_freedom);

    WelchTest {
        t_statistic,
        degrees_of_freedom,
        p_value,
    }
}

/// Welch–Satterthwaite degrees of freedom.
///
/// Falls back to the pooled `n1 + n2 - 2` when the formula degenerates
/// (zero variances or single-sample groups).
fn satterthwaite(var1: f64, n1: f64, var2: f64, n2: f64) -> f64 {
    let a = var1 / n1;
    let b = var2 / n2;
    let numerator = (a + b) * (a + b);
    let denominator = a * a / (n1 - 1.0).max(1.0) + b * b / (n2 - 1.0).max(1.0);
    let df = numerator / denominator;
    if df.is_finite() && df > 0.0 {
        df
    } else {
        (n1 + n2 - 2.0).max(1.0)
    }
}

/// Two-tailed p-value via the normal tail: `2 · (1 − Φ(|t|))`.
///
/// For `df ≤ 30` the statistic is first shrunk by `sqrt(df / (df + t²))` to
/// partially account for the heavier small-sample tails.
fn two_tailed_p(t: f64, df: f64) -> f64 {
    let z = if df > SMALL_SAMPLE_DF {
        t.abs()
    } else {
        t.abs() * (df / (df + t * t)).sqrt()
    };
    (2.0 * (1.0 - normal_cdf(z))).clamp(0.0, 1.0)
}

/// Standard normal CDF.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz–Stegun error function approximation (formula 7.1.26,
/// max absolute error 1.5e-7).
fn erf(x: f64) -> f64 {
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
