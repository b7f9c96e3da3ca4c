//! Estimator dispatch.
//!
//! The switchboard validates a (method, unit, measure) choice, resolves the
//! method's pseudocounts from the summary, runs the estimator and converts the
//! result from nats into the requested unit.
//!
//! The integral estimators (CMW for divergences, NSB for entropies) are not
//! part of this crate. Callers that have them register implementations of
//! [`DivergenceEstimator`] / [`EntropyEstimator`]; asking for one that was
//! never registered fails with [`EstimatorError::EstimatorUnavailable`].
//!
//! ## Example
//!
//! ```rust
//! use bayes_divergence::{DivergenceMethod, DivergenceSummary, Measure, Switchboard, Unit};
//!
//! let summary = DivergenceSummary::from_counts(&[12, 3, 0, 5], &[7, 1, 4, 4], Some(6)).unwrap();
//! let kl = Switchboard::new()
//!     .divergence(&summary, DivergenceMethod::Jeffreys, Unit::Log2, Measure::KullbackLeibler)
//!     .unwrap();
//! assert!(kl > 0.0);
//! ```

use crate::config::{DivergenceMethod, EntropyMethod, EstimatorConfig, Measure, Pseudocounts, Unit};
use crate::divergence::{self, DivergenceReport, PairedFrequencies};
use crate::entropy;
use crate::error::{EstimatorError, Result};
use crate::summary::{CompactSummary, DivergenceSummary, ExperimentSummary};
use log::debug;
use std::fmt;

pub use crate::posterior::measure_mu_grid as posterior_weight;

/// Measure name accepted for single-experiment summaries
pub const SHANNON: &str = "Shannon";

/// An externally supplied Kullback-Leibler estimator (e.g. CMW).
pub trait DivergenceEstimator {
    /// Method name used in error messages
    fn name(&self) -> &str;

    /// D_KL(A ‖ B) in nats
    fn estimate(&self, summary: &DivergenceSummary) -> Result<f64>;
}

/// An externally supplied entropy estimator (e.g. NSB).
pub trait EntropyEstimator {
    fn name(&self) -> &str;

    /// Shannon entropy in nats
    fn estimate(&self, summary: &ExperimentSummary) -> Result<f64>;
}

/// Dispatcher over the closed-form estimators plus any registered external ones.
#[derive(Default)]
pub struct Switchboard {
    cmw: Option<Box<dyn DivergenceEstimator>>,
    nsb: Option<Box<dyn EntropyEstimator>>,
}

impl fmt::Debug for Switchboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switchboard")
            .field("cmw", &self.cmw.as_ref().map(|e| e.name().to_string()))
            .field("nsb", &self.nsb.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

impl Switchboard {
    /// Closed-form estimators only
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the estimator behind [`DivergenceMethod::Cmw`]
    pub fn with_cmw(mut self, estimator: Box<dyn DivergenceEstimator>) -> Self {
        self.cmw = Some(estimator);
        self
    }

    /// Register the estimator behind [`EntropyMethod::Nsb`]
    pub fn with_nsb(mut self, estimator: Box<dyn EntropyEstimator>) -> Self {
        self.nsb = Some(estimator);
        self
    }

    /// Estimate a logarithmic divergence between the two experiments of `summary`.
    ///
    /// Only Kullback-Leibler and Jensen-Shannon are accepted; Hellinger has no
    /// unit and goes through [`Switchboard::hellinger`].
    pub fn divergence(
        &self,
        summary: &DivergenceSummary,
        method: DivergenceMethod,
        unit: Unit,
        measure: Measure,
    ) -> Result<f64> {
        if !measure.is_logarithmic() {
            return Err(EstimatorError::UnsupportedMeasure {
                measure: measure.to_string(),
            });
        }
        debug!(
            "divergence: method={} unit={} measure={} K={} N_A={} N_B={}",
            method,
            unit,
            measure,
            summary.k(),
            summary.n_a(),
            summary.n_b()
        );

        let nats = match method {
            DivergenceMethod::Cmw => {
                if measure != Measure::KullbackLeibler {
                    return Err(EstimatorError::UnsupportedCombination {
                        method: method.to_string(),
                        measure: measure.to_string(),
                    });
                }
                let cmw = self
                    .cmw
                    .as_ref()
                    .ok_or_else(|| EstimatorError::EstimatorUnavailable(method.to_string()))?;
                cmw.estimate(summary)?
            }
            _ => closed_form(summary, method, measure)?,
        };
        Ok(nats * unit.conversion())
    }

    /// Hellinger divergence `1 − Σ √(h_A h_B)`, unitless.
    pub fn hellinger(&self, summary: &DivergenceSummary, method: DivergenceMethod) -> Result<f64> {
        if method == DivergenceMethod::Cmw {
            return Err(EstimatorError::UnsupportedCombination {
                method: method.to_string(),
                measure: Measure::Hellinger.to_string(),
            });
        }
        debug!("hellinger: method={} K={}", method, summary.k());
        closed_form(summary, method, Measure::Hellinger)
    }

    /// Estimate the Shannon entropy of a single experiment.
    pub fn entropy(&self, summary: &ExperimentSummary, method: EntropyMethod, unit: Unit) -> Result<f64> {
        debug!(
            "entropy: method={} unit={} K={} N={}",
            method,
            unit,
            summary.k(),
            summary.n()
        );

        let nats = match method {
            EntropyMethod::Naive => entropy::naive(summary),
            EntropyMethod::MillerMadow => entropy::miller_madow(summary),
            EntropyMethod::ChaoShen => entropy::chao_shen(summary),
            EntropyMethod::Shrink => entropy::shrink(summary),
            EntropyMethod::Nsb => {
                let nsb = self
                    .nsb
                    .as_ref()
                    .ok_or_else(|| EstimatorError::EstimatorUnavailable(method.to_string()))?;
                nsb.estimate(summary)?
            }
            EntropyMethod::Jeffreys
            | EntropyMethod::Laplace
            | EntropyMethod::SchurmannGrassberger
            | EntropyMethod::Minimax
            | EntropyMethod::Dirichlet { .. } => {
                let alpha = method.concentration(summary)?.ok_or_else(|| {
                    EstimatorError::UnsupportedCombination {
                        method: method.to_string(),
                        measure: SHANNON.to_string(),
                    }
                })?;
                entropy::dirichlet(summary, alpha)
            }
        };
        Ok(nats * unit.conversion())
    }

    /// [`Switchboard::divergence`] with the choices taken from a config.
    pub fn estimate(&self, summary: &DivergenceSummary, config: &EstimatorConfig) -> Result<f64> {
        self.divergence(summary, config.method, config.unit, config.measure)
    }

    /// One estimate per summary; the first failure aborts the batch.
    pub fn divergence_batch(
        &self,
        summaries: &[DivergenceSummary],
        method: DivergenceMethod,
        unit: Unit,
        measure: Measure,
    ) -> Result<Vec<f64>> {
        summaries
            .iter()
            .map(|s| self.divergence(s, method, unit, measure))
            .collect()
    }

    /// Both KL directions, Jensen-Shannon and Hellinger from one closed-form method.
    pub fn report(
        &self,
        summary: &DivergenceSummary,
        method: DivergenceMethod,
        unit: Unit,
    ) -> Result<DivergenceReport> {
        let freqs = match method {
            DivergenceMethod::Cmw => {
                return Err(EstimatorError::UnsupportedCombination {
                    method: method.to_string(),
                    measure: Measure::JensenShannon.to_string(),
                })
            }
            _ => frequencies(summary, method)?,
        };
        Ok(DivergenceReport::compute(method.name(), &freqs, unit))
    }

    /// String-level entry point.
    ///
    /// An experiment summary takes the measure `"Shannon"` and an entropy
    /// method; a divergence summary takes `"Kullback-Leibler"` or
    /// `"Jensen-Shannon"` and a divergence method. Dirichlet pseudocounts are
    /// read from `pseudocounts`.
    pub fn entropy_or_divergence(
        &self,
        summary: &CompactSummary,
        method: &str,
        unit: &str,
        measure: &str,
        pseudocounts: &Pseudocounts,
    ) -> Result<f64> {
        let unit: Unit = unit.parse()?;

        match summary {
            CompactSummary::Experiment(s) => {
                if measure != SHANNON {
                    // a known divergence measure is the wrong kind, anything else is unknown
                    let parsed: Measure = measure.parse()?;
                    return Err(EstimatorError::UnsupportedMeasure {
                        measure: parsed.to_string(),
                    });
                }
                let method = EntropyMethod::parse(method, pseudocounts)?;
                self.entropy(s, method, unit)
            }
            CompactSummary::Divergence(s) => {
                if measure == SHANNON {
                    return Err(EstimatorError::UnsupportedMeasure {
                        measure: measure.to_string(),
                    });
                }
                let measure: Measure = measure.parse()?;
                if !measure.is_logarithmic() {
                    return Err(EstimatorError::UnsupportedMeasure {
                        measure: measure.to_string(),
                    });
                }
                let method = DivergenceMethod::parse(method, pseudocounts)?;
                self.divergence(s, method, unit, measure)
            }
        }
    }
}

/// Divergence with closed-form estimators only.
pub fn switchboard(
    summary: &DivergenceSummary,
    method: DivergenceMethod,
    unit: Unit,
    measure: Measure,
) -> Result<f64> {
    Switchboard::new().divergence(summary, method, unit, measure)
}

/// [`Switchboard::entropy_or_divergence`] with closed-form estimators only.
pub fn entropy_or_divergence(
    summary: &CompactSummary,
    method: &str,
    unit: &str,
    measure: &str,
    pseudocounts: &Pseudocounts,
) -> Result<f64> {
    Switchboard::new().entropy_or_divergence(summary, method, unit, measure, pseudocounts)
}

fn frequencies(summary: &DivergenceSummary, method: DivergenceMethod) -> Result<PairedFrequencies> {
    Ok(match method.hyperparameters(summary)? {
        Some(pair) => PairedFrequencies::dirichlet(summary, pair),
        None => PairedFrequencies::naive(summary),
    })
}

fn closed_form(summary: &DivergenceSummary, method: DivergenceMethod, measure: Measure) -> Result<f64> {
    Ok(match method.hyperparameters(summary)? {
        Some(pair) => divergence::dirichlet(summary, pair, measure),
        None => divergence::naive(summary, measure),
    })
}
