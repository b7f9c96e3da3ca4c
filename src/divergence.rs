//! Closed-form divergence estimators.
//!
//! Both estimators turn a [`DivergenceSummary`] into a pair of frequency
//! vectors over its count classes and evaluate one of
//! - Kullback-Leibler   D(A‖B) = Σ f · h_A ln(h_A / h_B)
//! - Jensen-Shannon     ½ Σ f · [h_A ln(h_A / m) + h_B ln(h_B / m)],  m = (h_A + h_B) / 2
//! - Hellinger          1 − Σ f · √(h_A h_B)
//!
//! where `f` is the number of categories in each count class. They differ
//! only in how the frequencies are formed:
//! - Naive: `h = nn / N`, classes with a zero count on either side are
//!   dropped entirely. The dropped mass is simply ignored, so the estimate is
//!   biased whenever the two samples do not share their support.
//! - Dirichlet: `h = (nn + a) / (N + a·K)` over all K categories, including the
//!   unobserved ones.
//!
//! Values are in nats.

use crate::config::{HyperparameterPair, Measure, Unit};
use crate::error::{EstimatorError, Result};
use crate::summary::DivergenceSummary;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// x ln(x / y) with the convention 0 ln(0 / y) = 0
#[inline]
fn xlogxy(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * (x / y).ln()
    }
}

/// Per-class frequencies of the two experiments, weighted by class multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedFrequencies {
    h_a: DVector<f64>,
    h_b: DVector<f64>,
    ff: DVector<f64>,
}

impl PairedFrequencies {
    /// Plug-in frequencies restricted to classes seen in both experiments.
    pub fn naive(summary: &DivergenceSummary) -> Self {
        let n_a = summary.n_a() as f64;
        let n_b = summary.n_b() as f64;

        let mut h_a = Vec::new();
        let mut h_b = Vec::new();
        let mut ff = Vec::new();
        for i in 0..summary.ff().len() {
            let (a, b) = (summary.nn_a()[i], summary.nn_b()[i]);
            if a > 0.0 && b > 0.0 {
                h_a.push(a / n_a);
                h_b.push(b / n_b);
                ff.push(summary.ff()[i]);
            }
        }

        Self {
            h_a: DVector::from_vec(h_a),
            h_b: DVector::from_vec(h_b),
            ff: DVector::from_vec(ff),
        }
    }

    /// Pseudocount-smoothed frequencies over all K categories.
    pub fn dirichlet(summary: &DivergenceSummary, pair: HyperparameterPair) -> Self {
        let k = summary.ff().sum();
        let norm_a = summary.n_a() as f64 + pair.a * k;
        let norm_b = summary.n_b() as f64 + pair.b * k;

        Self {
            h_a: summary.nn_a().map(|c| (c + pair.a) / norm_a),
            h_b: summary.nn_b().map(|c| (c + pair.b) / norm_b),
            ff: summary.ff().clone(),
        }
    }

    /// Number of count classes that contribute
    pub fn len(&self) -> usize {
        self.ff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ff.is_empty()
    }

    /// D_KL(A ‖ B)
    pub fn kullback_leibler(&self) -> f64 {
        self.ff.dot(&self.h_a.zip_map(&self.h_b, xlogxy))
    }

    /// D_KL(B ‖ A)
    pub fn kullback_leibler_reverse(&self) -> f64 {
        self.ff.dot(&self.h_b.zip_map(&self.h_a, xlogxy))
    }

    pub fn jensen_shannon(&self) -> f64 {
        let terms = self.h_a.zip_map(&self.h_b, |p, q| {
            let m = 0.5 * (p + q);
            xlogxy(p, m) + xlogxy(q, m)
        });
        0.5 * self.ff.dot(&terms)
    }

    /// 1 − Bhattacharyya coefficient
    pub fn hellinger(&self) -> f64 {
        let bc = self.ff.dot(&self.h_a.zip_map(&self.h_b, |p, q| (p * q).sqrt()));
        1.0 - bc
    }

    pub fn evaluate(&self, measure: Measure) -> f64 {
        match measure {
            Measure::KullbackLeibler => self.kullback_leibler(),
            Measure::JensenShannon => self.jensen_shannon(),
            Measure::Hellinger => self.hellinger(),
        }
    }
}

/// Naive (maximum-likelihood) divergence estimate.
///
/// Categories with zero count in either experiment are excluded.
#[inline]
pub fn naive(summary: &DivergenceSummary, measure: Measure) -> f64 {
    PairedFrequencies::naive(summary).evaluate(measure)
}

/// Dirichlet pseudocount divergence estimate.
///
/// Covers Jeffreys (a=b=½), Laplace (a=b=1), Schürmann-Grassberger
/// (a=1/Kobs_A, b=1/Kobs_B), minimax (a=√N_A/Kobs_A, b=√N_B/Kobs_B) and any
/// explicit pair.
#[inline]
pub fn dirichlet(summary: &DivergenceSummary, pair: HyperparameterPair, measure: Measure) -> f64 {
    PairedFrequencies::dirichlet(summary, pair).evaluate(measure)
}

/// All divergences of one estimator at once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub method: String,
    pub unit: Unit,
    pub kl_a_b: f64,
    pub kl_b_a: f64,
    pub symmetric_kl: f64,
    pub jensen_shannon: f64,
    /// Unitless
    pub hellinger: f64,
}

impl DivergenceReport {
    pub fn compute(method: impl Into<String>, freqs: &PairedFrequencies, unit: Unit) -> Self {
        let conv = unit.conversion();
        let kl_a_b = freqs.kullback_leibler() * conv;
        let kl_b_a = freqs.kullback_leibler_reverse() * conv;

        Self {
            method: method.into(),
            unit,
            kl_a_b,
            kl_b_a,
            symmetric_kl: kl_a_b + kl_b_a,
            jensen_shannon: freqs.jensen_shannon() * conv,
            hellinger: freqs.hellinger(),
        }
    }

    /// |D(A‖B) − D(B‖A)|
    #[inline]
    pub fn asymmetry(&self) -> f64 {
        (self.kl_a_b - self.kl_b_a).abs()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }
}
