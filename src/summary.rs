//! Compact count summaries.
//!
//! A summary keeps only the frequency-of-frequencies table of a histogram:
//! which count values occurred (`nn`) and how many categories showed each of
//! them (`ff`). Category identity is dropped, so every estimator runs in time
//! proportional to the number of distinct counts, not the number of categories.
//!
//! Unobserved categories (`K` a-priori minus those in the histogram) are folded
//! into a zero-count bucket, so `sum(ff) == K` always holds.

use crate::error::{EstimatorError, Result};
use log::warn;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frequency-of-frequencies summary of a single histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExperimentSummary")]
pub struct ExperimentSummary {
    /// Total number of observations N
    n: u64,
    /// A-priori number of categories K
    k: u64,
    /// Distinct count values, ascending
    nn: DVector<f64>,
    /// Number of categories showing each count value
    ff: DVector<f64>,
    /// Categories with nonzero count
    kobs: u64,
}

impl ExperimentSummary {
    /// Build from a raw frequency-of-frequencies table.
    ///
    /// `K` and `N` are derived as `sum(ff)` and `ff·nn`.
    pub fn new(nn: Vec<f64>, ff: Vec<f64>) -> Result<Self> {
        if nn.len() != ff.len() {
            return Err(EstimatorError::DimensionMismatch {
                expected: nn.len(),
                got: ff.len(),
            });
        }
        check_counts("nn", &nn)?;
        check_counts("ff", &ff)?;

        let nn = DVector::from_vec(nn);
        let ff = DVector::from_vec(ff);
        let n = ff.dot(&nn);
        if n <= 0.0 {
            return Err(EstimatorError::InvalidSummary(
                "total count N must be positive".into(),
            ));
        }
        let k = ff.sum();
        let kobs = observed(&nn, &ff);

        Ok(Self {
            n: n as u64,
            k: k as u64,
            nn,
            ff,
            kobs,
        })
    }

    /// Build from per-category counts.
    ///
    /// The a-priori category count is `max(categories, counts.len())`; a
    /// smaller request is ignored with a warning.
    pub fn from_counts(counts: &[u64], categories: Option<u64>) -> Result<Self> {
        if counts.is_empty() {
            return Err(EstimatorError::InvalidSummary("empty histogram".into()));
        }
        let k = resolve_categories(counts.len() as u64, categories);

        let mut table: BTreeMap<u64, u64> = BTreeMap::new();
        for &c in counts {
            *table.entry(c).or_insert(0) += 1;
        }
        let unlisted = k - counts.len() as u64;
        if unlisted > 0 {
            *table.entry(0).or_insert(0) += unlisted;
        }

        let (nn, ff): (Vec<f64>, Vec<f64>) =
            table.into_iter().map(|(c, f)| (c as f64, f as f64)).unzip();
        Self::new(nn, ff)
    }

    #[inline]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[inline]
    pub fn k(&self) -> u64 {
        self.k
    }

    #[inline]
    pub fn kobs(&self) -> u64 {
        self.kobs
    }

    #[inline]
    pub fn nn(&self) -> &DVector<f64> {
        &self.nn
    }

    #[inline]
    pub fn ff(&self) -> &DVector<f64> {
        &self.ff
    }

    /// Categories observed exactly once
    pub fn singletons(&self) -> u64 {
        self.nn
            .iter()
            .zip(self.ff.iter())
            .filter(|&(&c, _)| c == 1.0)
            .map(|(_, &f)| f as u64)
            .sum()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }

    /// Deserialize from JSON, re-checking the invariants
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }
}

/// Wire form of [`ExperimentSummary`], validated by `TryFrom`
#[derive(Deserialize)]
struct RawExperimentSummary {
    n: u64,
    k: u64,
    nn: DVector<f64>,
    ff: DVector<f64>,
    kobs: u64,
}

impl TryFrom<RawExperimentSummary> for ExperimentSummary {
    type Error = EstimatorError;

    fn try_from(raw: RawExperimentSummary) -> Result<Self> {
        let checked = Self::new(raw.nn.as_slice().to_vec(), raw.ff.as_slice().to_vec())?;
        if (checked.n, checked.k, checked.kobs) != (raw.n, raw.k, raw.kobs) {
            return Err(inconsistent());
        }
        Ok(checked)
    }
}

/// Joint frequency-of-frequencies summary of two histograms over one category space.
///
/// Entry `i` says that `ff[i]` categories were seen `nn_a[i]` times in
/// experiment A and `nn_b[i]` times in experiment B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDivergenceSummary")]
pub struct DivergenceSummary {
    n_a: u64,
    n_b: u64,
    k: u64,
    nn_a: DVector<f64>,
    nn_b: DVector<f64>,
    ff: DVector<f64>,
    kobs_a: u64,
    kobs_b: u64,
}

impl DivergenceSummary {
    /// Build from a raw joint table.
    pub fn new(nn_a: Vec<f64>, nn_b: Vec<f64>, ff: Vec<f64>) -> Result<Self> {
        for other in [nn_b.len(), ff.len()] {
            if other != nn_a.len() {
                return Err(EstimatorError::DimensionMismatch {
                    expected: nn_a.len(),
                    got: other,
                });
            }
        }
        check_counts("nn_a", &nn_a)?;
        check_counts("nn_b", &nn_b)?;
        check_counts("ff", &ff)?;

        let nn_a = DVector::from_vec(nn_a);
        let nn_b = DVector::from_vec(nn_b);
        let ff = DVector::from_vec(ff);

        let n_a = ff.dot(&nn_a);
        let n_b = ff.dot(&nn_b);
        if n_a <= 0.0 || n_b <= 0.0 {
            return Err(EstimatorError::InvalidSummary(
                "both experiments need a positive total count".into(),
            ));
        }

        Ok(Self {
            n_a: n_a as u64,
            n_b: n_b as u64,
            k: ff.sum() as u64,
            kobs_a: observed(&nn_a, &ff),
            kobs_b: observed(&nn_b, &ff),
            nn_a,
            nn_b,
            ff,
        })
    }

    /// Build from two histograms indexed by the same categories.
    ///
    /// `counts_a[i]` and `counts_b[i]` refer to the same category; the shorter
    /// histogram is padded with zeros.
    pub fn from_counts(counts_a: &[u64], counts_b: &[u64], categories: Option<u64>) -> Result<Self> {
        let len = counts_a.len().max(counts_b.len());
        if len == 0 {
            return Err(EstimatorError::InvalidSummary("empty histogram".into()));
        }
        let k = resolve_categories(len as u64, categories);

        let mut table: BTreeMap<(u64, u64), u64> = BTreeMap::new();
        for i in 0..len {
            let a = counts_a.get(i).copied().unwrap_or(0);
            let b = counts_b.get(i).copied().unwrap_or(0);
            *table.entry((a, b)).or_insert(0) += 1;
        }
        let unlisted = k - len as u64;
        if unlisted > 0 {
            *table.entry((0, 0)).or_insert(0) += unlisted;
        }

        let mut nn_a = Vec::with_capacity(table.len());
        let mut nn_b = Vec::with_capacity(table.len());
        let mut ff = Vec::with_capacity(table.len());
        for ((a, b), f) in table {
            nn_a.push(a as f64);
            nn_b.push(b as f64);
            ff.push(f as f64);
        }
        Self::new(nn_a, nn_b, ff)
    }

    #[inline]
    pub fn n_a(&self) -> u64 {
        self.n_a
    }

    #[inline]
    pub fn n_b(&self) -> u64 {
        self.n_b
    }

    #[inline]
    pub fn k(&self) -> u64 {
        self.k
    }

    #[inline]
    pub fn kobs_a(&self) -> u64 {
        self.kobs_a
    }

    #[inline]
    pub fn kobs_b(&self) -> u64 {
        self.kobs_b
    }

    #[inline]
    pub fn nn_a(&self) -> &DVector<f64> {
        &self.nn_a
    }

    #[inline]
    pub fn nn_b(&self) -> &DVector<f64> {
        &self.nn_b
    }

    #[inline]
    pub fn ff(&self) -> &DVector<f64> {
        &self.ff
    }

    /// The same summary with the roles of A and B exchanged
    pub fn swapped(&self) -> Self {
        Self {
            n_a: self.n_b,
            n_b: self.n_a,
            k: self.k,
            nn_a: self.nn_b.clone(),
            nn_b: self.nn_a.clone(),
            ff: self.ff.clone(),
            kobs_a: self.kobs_b,
            kobs_b: self.kobs_a,
        }
    }

    /// Summary of experiment A alone, over the same K categories
    pub fn marginal_a(&self) -> Result<ExperimentSummary> {
        marginal(&self.nn_a, &self.ff)
    }

    /// Summary of experiment B alone, over the same K categories
    pub fn marginal_b(&self) -> Result<ExperimentSummary> {
        marginal(&self.nn_b, &self.ff)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }

    /// Deserialize from JSON, re-checking the invariants
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }
}

/// Wire form of [`DivergenceSummary`], validated by `TryFrom`
#[derive(Deserialize)]
struct RawDivergenceSummary {
    n_a: u64,
    n_b: u64,
    k: u64,
    nn_a: DVector<f64>,
    nn_b: DVector<f64>,
    ff: DVector<f64>,
    kobs_a: u64,
    kobs_b: u64,
}

impl TryFrom<RawDivergenceSummary> for DivergenceSummary {
    type Error = EstimatorError;

    fn try_from(raw: RawDivergenceSummary) -> Result<Self> {
        let checked = Self::new(
            raw.nn_a.as_slice().to_vec(),
            raw.nn_b.as_slice().to_vec(),
            raw.ff.as_slice().to_vec(),
        )?;
        let derived = (checked.n_a, checked.n_b, checked.k, checked.kobs_a, checked.kobs_b);
        if derived != (raw.n_a, raw.n_b, raw.k, raw.kobs_a, raw.kobs_b) {
            return Err(inconsistent());
        }
        Ok(checked)
    }
}

/// Either kind of compact summary, for the string-level entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CompactSummary {
    Experiment(ExperimentSummary),
    Divergence(DivergenceSummary),
}

impl From<ExperimentSummary> for CompactSummary {
    fn from(s: ExperimentSummary) -> Self {
        CompactSummary::Experiment(s)
    }
}

impl From<DivergenceSummary> for CompactSummary {
    fn from(s: DivergenceSummary) -> Self {
        CompactSummary::Divergence(s)
    }
}

fn inconsistent() -> EstimatorError {
    EstimatorError::InvalidSummary("N, K or Kobs inconsistent with nn and ff".into())
}

fn check_counts(name: &str, values: &[f64]) -> Result<()> {
    for &v in values {
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
            return Err(EstimatorError::InvalidSummary(format!(
                "`{}` must hold non-negative integers, found {}",
                name, v
            )));
        }
    }
    Ok(())
}

fn observed(nn: &DVector<f64>, ff: &DVector<f64>) -> u64 {
    nn.iter()
        .zip(ff.iter())
        .filter(|&(&c, _)| c > 0.0)
        .map(|(_, &f)| f as u64)
        .sum()
}

fn resolve_categories(listed: u64, categories: Option<u64>) -> u64 {
    match categories {
        Some(k) if k >= listed => k,
        Some(k) => {
            warn!(
                "categories = {} is below the {} categories in the histogram, using {}",
                k, listed, listed
            );
            listed
        }
        None => listed,
    }
}

/// Collapse a joint table onto one experiment by merging equal count values.
fn marginal(nn: &DVector<f64>, ff: &DVector<f64>) -> Result<ExperimentSummary> {
    let mut table: BTreeMap<u64, f64> = BTreeMap::new();
    for (&c, &f) in nn.iter().zip(ff.iter()) {
        *table.entry(c as u64).or_insert(0.0) += f;
    }
    let (nn, ff): (Vec<f64>, Vec<f64>) = table.into_iter().map(|(c, f)| (c as f64, f)).unzip();
    ExperimentSummary::new(nn, ff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_from_counts() {
        let s = ExperimentSummary::from_counts(&[5, 3, 1, 1, 0], Some(8)).unwrap();

        assert_eq!(s.n(), 10);
        assert_eq!(s.k(), 8);
        assert_eq!(s.kobs(), 4);
        assert_eq!(s.singletons(), 2);
        // zero bucket holds the listed zero plus three unlisted categories
        assert_eq!(s.nn().as_slice(), &[0.0, 1.0, 3.0, 5.0]);
        assert_eq!(s.ff().as_slice(), &[4.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_invariants_hold() {
        let s = ExperimentSummary::from_counts(&[4, 4, 2, 7, 0, 1], None).unwrap();
        assert_eq!(s.ff().sum() as u64, s.k());
        assert_eq!(s.ff().dot(s.nn()) as u64, s.n());
    }

    #[test]
    fn test_categories_below_observed_are_clamped() {
        let s = ExperimentSummary::from_counts(&[1, 2, 3], Some(2)).unwrap();
        assert_eq!(s.k(), 3);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            ExperimentSummary::new(vec![1.0, 2.0], vec![1.0]),
            Err(EstimatorError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ExperimentSummary::new(vec![1.5], vec![2.0]),
            Err(EstimatorError::InvalidSummary(_))
        ));
        assert!(matches!(
            ExperimentSummary::new(vec![0.0], vec![3.0]),
            Err(EstimatorError::InvalidSummary(_))
        ));
        assert!(ExperimentSummary::from_counts(&[], None).is_err());
    }

    #[test]
    fn test_divergence_from_counts() {
        let s = DivergenceSummary::from_counts(&[3, 0, 2, 2], &[1, 4, 0, 0], Some(6)).unwrap();

        assert_eq!(s.n_a(), 7);
        assert_eq!(s.n_b(), 5);
        assert_eq!(s.k(), 6);
        assert_eq!(s.kobs_a(), 3);
        assert_eq!(s.kobs_b(), 2);
        // (0,0) x2, (0,4), (2,0) x2, (3,1)
        assert_eq!(s.nn_a().as_slice(), &[0.0, 0.0, 2.0, 3.0]);
        assert_eq!(s.nn_b().as_slice(), &[0.0, 4.0, 0.0, 1.0]);
        assert_eq!(s.ff().as_slice(), &[2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_divergence_requires_both_totals() {
        assert!(DivergenceSummary::from_counts(&[1, 2], &[0, 0], None).is_err());
    }

    #[test]
    fn test_marginals_and_swap() {
        let s = DivergenceSummary::from_counts(&[3, 0, 2, 2], &[1, 4, 0, 0], Some(6)).unwrap();

        let a = s.marginal_a().unwrap();
        assert_eq!(a.n(), 7);
        assert_eq!(a.k(), 6);
        assert_eq!(a.kobs(), 3);
        assert_eq!(a.nn().as_slice(), &[0.0, 2.0, 3.0]);
        assert_eq!(a.ff().as_slice(), &[3.0, 2.0, 1.0]);

        let swapped = s.swapped();
        assert_eq!(swapped.n_a(), 5);
        assert_eq!(swapped.marginal_a().unwrap(), s.marginal_b().unwrap());
        assert_eq!(swapped.swapped(), s);
    }

    #[test]
    fn test_json_roundtrip_checks_invariants() {
        let s = ExperimentSummary::from_counts(&[2, 1, 1], Some(5)).unwrap();
        let json = s.to_json().unwrap();
        assert_eq!(ExperimentSummary::from_json(&json).unwrap(), s);

        let tampered = json.replace("\"n\":4", "\"n\":40");
        assert!(ExperimentSummary::from_json(&tampered).is_err());

        let d = DivergenceSummary::from_counts(&[1, 2], &[2, 1], None).unwrap();
        let compact: CompactSummary = d.clone().into();
        let json = serde_json::to_string(&compact).unwrap();
        assert!(json.contains("\"kind\":\"divergence\""));
        assert_eq!(DivergenceSummary::from_json(&d.to_json().unwrap()).unwrap(), d);
        let back: CompactSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, compact);
    }

    #[test]
    fn test_tampered_compact_summary_rejected() {
        let d = DivergenceSummary::from_counts(&[3, 1], &[2, 2], None).unwrap();
        let json = serde_json::to_string(&CompactSummary::from(d)).unwrap();
        assert!(json.contains("\"n_a\":4") && json.contains("\"kobs_a\":2"));

        let tampered = json
            .replace("\"n_a\":4", "\"n_a\":0")
            .replace("\"kobs_a\":2", "\"kobs_a\":0");
        assert!(serde_json::from_str::<CompactSummary>(&tampered).is_err());
        assert!(serde_json::from_str::<DivergenceSummary>(
            &tampered.replace("\"kind\":\"divergence\",", "")
        )
        .is_err());

        let e = ExperimentSummary::from_counts(&[2, 2, 0], None).unwrap();
        let json = serde_json::to_string(&CompactSummary::from(e)).unwrap();
        let tampered = json.replace("\"kobs\":2", "\"kobs\":3");
        assert_ne!(tampered, json);
        assert!(serde_json::from_str::<CompactSummary>(&tampered).is_err());
    }
}
