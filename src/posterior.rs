//! Dirichlet posterior weight and integration against it.
//!
//! For a symmetric Dirichlet prior with concentration α over K categories,
//! the marginal likelihood of a histogram (up to a multinomial constant) is
//!
//! ```text
//! ln μ(α) = lnΓ(Kα) − K lnΓ(α) + Σ ff · lnΓ(nn + α) − lnΓ(N + Kα)
//! ```
//!
//! `μ` itself over- or underflows `f64` for moderate N and K, so it is
//! returned as an [`ExtendedFloat`]. Integrals over an α grid are computed with
//! the trapezoidal rule in the same representation.

use crate::error::{EstimatorError, Result};
use crate::precision::ExtendedFloat;
use crate::special::ln_gamma;
use crate::summary::ExperimentSummary;
use nalgebra::DVector;

/// ln μ(α) from a raw frequency-of-frequencies table.
///
/// `n` and `k` are taken as given; they are not re-derived from `nn` and `ff`.
pub fn log_measure_mu_from_parts(
    alpha: f64,
    n: f64,
    k: f64,
    nn: &DVector<f64>,
    ff: &DVector<f64>,
) -> Result<f64> {
    if nn.len() != ff.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: nn.len(),
            got: ff.len(),
        });
    }

    Ok(log_mu(alpha, n, k, nn, ff))
}

/// ln μ(α) for a single-experiment summary
pub fn log_measure_mu(alpha: f64, summary: &ExperimentSummary) -> f64 {
    log_mu(alpha, summary.n() as f64, summary.k() as f64, summary.nn(), summary.ff())
}

fn log_mu(alpha: f64, n: f64, k: f64, nn: &DVector<f64>, ff: &DVector<f64>) -> f64 {
    let prior = ln_gamma(k * alpha) - k * ln_gamma(alpha);
    let likelihood = ff.dot(&nn.map(|c| ln_gamma(c + alpha))) - ln_gamma(n + k * alpha);
    prior + likelihood
}

/// μ(α) in extended precision
#[inline]
pub fn measure_mu(alpha: f64, summary: &ExperimentSummary) -> ExtendedFloat {
    ExtendedFloat::exp(log_measure_mu(alpha, summary))
}

/// μ evaluated on every point of an α grid
pub fn measure_mu_grid(alphas: &[f64], summary: &ExperimentSummary) -> Vec<ExtendedFloat> {
    alphas.iter().map(|&a| measure_mu(a, summary)).collect()
}

/// Trapezoidal ∫ μ(x) f(x) dx over the abscissae `x`.
///
/// The abscissae need not be evenly spaced. Fewer than two points give zero.
pub fn integral_with_mu(mu: &[ExtendedFloat], func: &[f64], x: &[f64]) -> Result<ExtendedFloat> {
    for len in [func.len(), x.len()] {
        if len != mu.len() {
            return Err(EstimatorError::DimensionMismatch {
                expected: mu.len(),
                got: len,
            });
        }
    }

    let mut total = ExtendedFloat::ZERO;
    for i in 1..x.len() {
        let dx = x[i] - x[i - 1];
        let left = mu[i - 1] * func[i - 1];
        let right = mu[i] * func[i];
        total = total + (left + right) * (0.5 * dx);
    }
    Ok(total)
}

/// Posterior mean of `func`: ∫ μ f dx / ∫ μ dx.
pub fn posterior_average(mu: &[ExtendedFloat], func: &[f64], x: &[f64]) -> Result<f64> {
    let ones = vec![1.0; mu.len()];
    let norm = integral_with_mu(mu, &ones, x)?;
    if norm.is_zero() || !norm.is_finite() {
        return Err(EstimatorError::NumericalError(format!(
            "posterior normalization is {}",
            norm
        )));
    }
    let weighted = integral_with_mu(mu, func, x)?;
    Ok((weighted / norm).to_f64())
}
