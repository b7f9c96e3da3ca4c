//! Inversion of the implicit prior relations.
//!
//! The expected entropy of a symmetric Dirichlet(α) prior over K categories,
//! and the expected cross-entropy for concentration β, are monotone in the
//! concentration:
//!
//! ```text
//! H(α)  = ψ(Kα + 1) − ψ(α + 1)        increasing, 0 → ln K
//! CE(β) = ψ(Kβ) − ψ(β)                decreasing, ∞ → ln K
//! ```
//!
//! Going back from a target value to the concentration has no closed form, so
//! it is done with Brent's bracketed root finder.

use crate::error::{EstimatorError, Result, SolverError};
use crate::special::d_digamma;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Relative tolerance floor, as in the reference Brent implementation
const RTOL: f64 = 4.0 * f64::EPSILON;

/// Stopping rule for [`brentq`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum number of function evaluations after the two endpoints
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,

    /// Absolute tolerance on the root
    #[serde(default = "default_xtol")]
    pub xtol: f64,
}

fn default_maxiter() -> usize {
    100
}

fn default_xtol() -> f64 {
    1e-20
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            maxiter: default_maxiter(),
            xtol: default_xtol(),
        }
    }
}

/// Find a root of `f` in `[lower, upper]` with Brent's method.
///
/// `f(lower)` and `f(upper)` must differ in sign. The result `x` satisfies
/// `|x − x*| ≤ xtol + 4ε|x|` for some true root `x*`.
pub fn brentq<F>(f: F, lower: f64, upper: f64, config: &SolverConfig) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if !(config.xtol > 0.0) {
        return Err(EstimatorError::InvalidHyperparameter {
            name: "xtol",
            value: config.xtol,
        });
    }

    let eval = |x: f64| -> Result<f64> {
        let y = f(x);
        if y.is_nan() {
            return Err(SolverError::NonFinite { x }.into());
        }
        Ok(y)
    };

    let (mut xpre, mut xcur) = (lower, upper);
    let mut fpre = eval(xpre)?;
    let mut fcur = eval(xcur)?;

    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }
    if fpre.is_sign_negative() == fcur.is_sign_negative() {
        return Err(SolverError::NoSignChange {
            lower,
            upper,
            f_lower: fpre,
            f_upper: fcur,
        }
        .into());
    }

    // xblk is the far end of the bracket, spre/scur the last two step sizes
    let (mut xblk, mut fblk) = (0.0, 0.0);
    let (mut spre, mut scur) = (0.0, 0.0);

    for iter in 0..config.maxiter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (config.xtol + RTOL * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            debug!("brentq converged to {} after {} iterations", xcur, iter);
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };

            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = eval(xcur)?;
        trace!("brentq iter {}: x = {}, f(x) = {}", iter, xcur, fcur);
    }

    Err(SolverError::MaxIterations {
        maxiter: config.maxiter,
        last: xcur,
    }
    .into())
}

/// The implicit relations that link a prior concentration to an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImplicitRelation {
    /// ψ(Kα + 1) − ψ(α + 1) − target
    EntropyVsAlpha,
    /// ψ(Kβ) − ψ(β) − target
    CrossEntropyVsBeta,
}

impl ImplicitRelation {
    /// Residual of the relation at concentration `x`.
    #[inline]
    pub fn evaluate(&self, x: f64, target: f64, k: f64) -> f64 {
        match self {
            ImplicitRelation::EntropyVsAlpha => d_digamma(k * x + 1.0, x + 1.0) - target,
            ImplicitRelation::CrossEntropyVsBeta => d_digamma(k * x, x) - target,
        }
    }

    /// Value of the expected quantity at `x` (the residual with zero target)
    #[inline]
    pub fn expected(&self, x: f64, k: f64) -> f64 {
        self.evaluate(x, 0.0, k)
    }
}

/// Concentration at which `relation` reaches `target`, searched in `[lower, upper]`.
pub fn get_from_implicit(
    relation: ImplicitRelation,
    target: f64,
    lower: f64,
    upper: f64,
    k: f64,
    config: &SolverConfig,
) -> Result<f64> {
    debug!(
        "inverting {:?} for target {} with K = {} in [{}, {}]",
        relation, target, k, lower, upper
    );
    brentq(|x| relation.evaluate(x, target, k), lower, upper, config)
}

/// Flat form of [`get_from_implicit`] taking the solver settings inline.
pub fn invert_implicit_relation(
    relation: ImplicitRelation,
    target: f64,
    categories: u64,
    bounds: (f64, f64),
    maxiter: usize,
    xtol: f64,
) -> Result<f64> {
    let config = SolverConfig { maxiter, xtol };
    get_from_implicit(relation, target, bounds.0, bounds.1, categories as f64, &config)
}
