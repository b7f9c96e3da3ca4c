//! Closed-form Shannon entropy estimators on a single histogram.
//!
//! All values are in nats. The integral NSB estimator is not implemented here;
//! it plugs into the [`Switchboard`](crate::switchboard::Switchboard) as an
//! external [`EntropyEstimator`](crate::switchboard::EntropyEstimator).

use crate::summary::ExperimentSummary;

/// −x ln x with 0 ln 0 = 0
#[inline]
fn neg_xlogx(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        -x * x.ln()
    }
}

/// Plug-in entropy −Σ h ln h with h = n/N.
pub fn naive(summary: &ExperimentSummary) -> f64 {
    let n = summary.n() as f64;
    summary
        .nn()
        .iter()
        .zip(summary.ff().iter())
        .map(|(&c, &f)| f * neg_xlogx(c / n))
        .sum()
}

/// Miller-Madow bias correction: naive + (Kobs − 1) / 2N
pub fn miller_madow(summary: &ExperimentSummary) -> f64 {
    naive(summary) + (summary.kobs() as f64 - 1.0) / (2.0 * summary.n() as f64)
}

/// Chao-Shen coverage-adjusted estimator.
///
/// Frequencies are shrunk by the Good-Turing coverage `C = 1 − f1/N` and
/// each term is divided by its inclusion probability `1 − (1 − p)^N`.
/// When every observation is a singleton, `f1` is taken as `N − 1` so the
/// coverage stays positive.
pub fn chao_shen(summary: &ExperimentSummary) -> f64 {
    let n = summary.n() as f64;
    let mut f1 = summary.singletons() as f64;
    if f1 == n {
        f1 = n - 1.0;
    }
    let coverage = 1.0 - f1 / n;

    summary
        .nn()
        .iter()
        .zip(summary.ff().iter())
        .filter(|&(&c, _)| c > 0.0)
        .map(|(&c, &f)| {
            let p = coverage * c / n;
            let inclusion = 1.0 - (1.0 - p).powf(n);
            f * neg_xlogx(p) / inclusion
        })
        .sum()
}

/// James-Stein shrinkage estimator.
///
/// The plug-in frequencies `u = n/N` are pulled toward the uniform target
/// `t = 1/K` by the intensity
///
/// ```text
/// λ = Σ u(1 − u) / (N − 1)  /  Σ (u − t)²      clamped to [0, 1]
/// ```
///
/// with both sums over all K categories, and the entropy of
/// `p = λt + (1 − λ)u` is returned. λ is 1 for a single observation or when
/// `u` already is uniform.
pub fn shrink(summary: &ExperimentSummary) -> f64 {
    let n = summary.n() as f64;
    let target = 1.0 / summary.k() as f64;
    let u = summary.nn().map(|c| c / n);
    let ff = summary.ff();

    let msp = ff.dot(&u.map(|x| (x - target) * (x - target)));
    let lambda = if summary.n() <= 1 || msp == 0.0 {
        1.0
    } else {
        let var = ff.dot(&u.map(|x| x * (1.0 - x))) / (n - 1.0);
        (var / msp).clamp(0.0, 1.0)
    };

    ff.dot(&u.map(|x| neg_xlogx(lambda * target + (1.0 - lambda) * x)))
}

/// Posterior-mean frequencies under a symmetric Dirichlet(α) prior, plugged in.
///
/// h = (n + α) / (N + Kα) over all K categories. α = 0 gives back [`naive`].
pub fn dirichlet(summary: &ExperimentSummary, alpha: f64) -> f64 {
    let norm = summary.n() as f64 + alpha * summary.k() as f64;
    summary
        .nn()
        .iter()
        .zip(summary.ff().iter())
        .map(|(&c, &f)| f * neg_xlogx((c + alpha) / norm))
        .sum()
}
