//! Special functions shared by every estimator family.
//!
//! - digamma ψ(x) and trigamma ψ'(x)
//! - their pairwise differences ψ(x) − ψ(y), ψ'(x) − ψ'(y)
//! - the real log-gamma lnΓ(x)
//!
//! Scalar forms are total on the positive reals. Poles and domain errors
//! on the non-positive axis surface as inf/NaN and are not caught here.
//! The `_vec` forms apply the same functions element-wise.

use crate::error::{EstimatorError, Result};
use nalgebra::DVector;
use std::f64::consts::PI;

/// Digamma function ψ(x) = d/dx lnΓ(x)
#[inline]
pub fn digamma(x: f64) -> f64 {
    statrs::function::gamma::digamma(x)
}

/// Trigamma function ψ'(x) = d²/dx² lnΓ(x)
///
/// Recurrence ψ'(x) = ψ'(x+1) + 1/x² up to x ≥ 8, then the asymptotic series
/// 1/x + 1/2x² + 1/6x³ − 1/30x⁵ + 1/42x⁷ − 1/30x⁹ + 5/66x¹¹.
pub fn trigamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == f64::INFINITY {
        return 0.0;
    }
    if x <= 0.0 {
        if x == x.floor() {
            return f64::INFINITY;
        }
        // Reflection: ψ'(1-x) + ψ'(x) = π² / sin²(πx)
        let s = (PI * x).sin();
        return PI * PI / (s * s) - trigamma(1.0 - x);
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < 8.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }

    let z = 1.0 / x;
    let z2 = z * z;
    let z3 = z2 * z;
    let z5 = z3 * z2;
    let z7 = z5 * z2;
    let z9 = z7 * z2;
    let z11 = z9 * z2;
    acc + z + 0.5 * z2 + z3 / 6.0 - z5 / 30.0 + z7 / 42.0 - z9 / 30.0 + 5.0 * z11 / 66.0
}

/// ψ(x) − ψ(y)
#[inline]
pub fn d_digamma(x: f64, y: f64) -> f64 {
    digamma(x) - digamma(y)
}

/// ψ'(x) − ψ'(y)
#[inline]
pub fn d_trigamma(x: f64, y: f64) -> f64 {
    trigamma(x) - trigamma(y)
}

/// Real part of the natural log-gamma, lnΓ(x)
#[inline]
pub fn ln_gamma(x: f64) -> f64 {
    statrs::function::gamma::ln_gamma(x)
}

pub fn digamma_vec(x: &DVector<f64>) -> DVector<f64> {
    x.map(digamma)
}

pub fn trigamma_vec(x: &DVector<f64>) -> DVector<f64> {
    x.map(trigamma)
}

pub fn ln_gamma_vec(x: &DVector<f64>) -> DVector<f64> {
    x.map(ln_gamma)
}

/// Element-wise ψ(x_i) − ψ(y_i)
pub fn d_digamma_vec(x: &DVector<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_len(x, y)?;
    Ok(x.zip_map(y, d_digamma))
}

/// Element-wise ψ'(x_i) − ψ'(y_i)
pub fn d_trigamma_vec(x: &DVector<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check_len(x, y)?;
    Ok(x.zip_map(y, d_trigamma))
}

fn check_len(x: &DVector<f64>, y: &DVector<f64>) -> Result<()> {
    if x.len() != y.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

    #[test]
    fn test_digamma_known_values() {
        assert_abs_diff_eq!(digamma(1.0), -EULER_GAMMA, epsilon = 1e-10);
        // ψ(n+1) = H_n − γ
        assert_abs_diff_eq!(digamma(4.0), 1.0 + 0.5 + 1.0 / 3.0 - EULER_GAMMA, epsilon = 1e-10);
    }

    #[test]
    fn test_trigamma_known_values() {
        assert_abs_diff_eq!(trigamma(1.0), PI * PI / 6.0, epsilon = 1e-10);
        assert_abs_diff_eq!(trigamma(0.5), PI * PI / 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(trigamma(2.0), PI * PI / 6.0 - 1.0, epsilon = 1e-10);
        // large argument: ψ'(x) ~ 1/x
        assert_abs_diff_eq!(trigamma(1e6), 1e-6, epsilon = 1e-11);
    }

    #[test]
    fn test_trigamma_poles_and_reflection() {
        assert!(trigamma(0.0).is_infinite());
        assert!(trigamma(-2.0).is_infinite());
        // ψ'(-0.5) = π²/sin²(-π/2) − ψ'(1.5) = π² − (π²/2 − 4)
        assert_abs_diff_eq!(trigamma(-0.5), PI * PI / 2.0 + 4.0, epsilon = 1e-10);
        assert!(trigamma(f64::NAN).is_nan());
    }

    #[test]
    fn test_ln_gamma() {
        assert_abs_diff_eq!(ln_gamma(1.0), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(ln_gamma(5.0), 24.0_f64.ln(), epsilon = 1e-10);
        assert_abs_diff_eq!(ln_gamma(0.5), PI.sqrt().ln(), epsilon = 1e-10);
    }

    #[test]
    fn test_differences() {
        // ψ(x+1) − ψ(x) = 1/x
        assert_abs_diff_eq!(d_digamma(3.5, 2.5), 1.0 / 2.5, epsilon = 1e-10);
        // ψ'(x) − ψ'(x+1) = 1/x²
        assert_abs_diff_eq!(d_trigamma(2.0, 3.0), 0.25, epsilon = 1e-10);
    }

    #[test]
    fn test_vectorized_forms() {
        let x = DVector::from_vec(vec![1.0, 2.0, 5.0]);
        let y = DVector::from_vec(vec![2.0, 3.0, 6.0]);

        let d = d_digamma_vec(&x, &y).unwrap();
        assert_abs_diff_eq!(d[0], -1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(d[1], -0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(d[2], -0.2, epsilon = 1e-10);

        let t = d_trigamma_vec(&x, &y).unwrap();
        assert_abs_diff_eq!(t[2], 1.0 / 25.0, epsilon = 1e-10);

        let lg = ln_gamma_vec(&y);
        assert_abs_diff_eq!(lg[2], 120.0_f64.ln(), epsilon = 1e-10);

        assert_eq!(digamma_vec(&x).len(), 3);
        assert_eq!(trigamma_vec(&x).len(), 3);
    }

    #[test]
    fn test_vectorized_dimension_mismatch() {
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let y = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            d_digamma_vec(&x, &y),
            Err(EstimatorError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            d_trigamma_vec(&x, &y),
            Err(EstimatorError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            d_trigamma_vec(&y, &x),
            Err(EstimatorError::DimensionMismatch { expected: 1, got: 2 })
        ));
    }
}
