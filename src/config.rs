//! Estimator configuration: logarithm unit, divergence measure and method.
//!
//! Every choice is a closed enum. Names are parsed with `FromStr` (the same
//! names the serde representation uses), so an unknown name is rejected up
//! front instead of falling through to a default.

use crate::error::{EstimatorError, Result};
use crate::summary::{DivergenceSummary, ExperimentSummary};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logarithm base of the returned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Natural logarithm (nats)
    #[default]
    Ln,
    /// Base 2 (bits)
    Log2,
    /// Base 10 (bans)
    Log10,
}

impl Unit {
    /// Factor converting a value in nats into this unit
    pub fn conversion(&self) -> f64 {
        match self {
            Unit::Ln => 1.0,
            Unit::Log2 => 1.0 / std::f64::consts::LN_2,
            Unit::Log10 => 1.0 / std::f64::consts::LN_10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Ln => "ln",
            Unit::Log2 => "log2",
            Unit::Log10 => "log10",
        }
    }
}

impl FromStr for Unit {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ln" => Ok(Unit::Ln),
            "log2" => Ok(Unit::Log2),
            "log10" => Ok(Unit::Log10),
            other => Err(EstimatorError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Divergence between the two experiments of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Measure {
    /// D_KL(A || B)
    #[default]
    #[serde(rename = "Kullback-Leibler")]
    KullbackLeibler,
    /// Symmetrized KL against the midpoint mixture
    #[serde(rename = "Jensen-Shannon")]
    JensenShannon,
    /// 1 − Bhattacharyya coefficient
    #[serde(rename = "Hellinger")]
    Hellinger,
}

impl Measure {
    /// Whether the value is a log-ratio and therefore carries a unit
    pub fn is_logarithmic(&self) -> bool {
        matches!(self, Measure::KullbackLeibler | Measure::JensenShannon)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::KullbackLeibler => "Kullback-Leibler",
            Measure::JensenShannon => "Jensen-Shannon",
            Measure::Hellinger => "Hellinger",
        }
    }
}

impl FromStr for Measure {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Kullback-Leibler" => Ok(Measure::KullbackLeibler),
            "Jensen-Shannon" => Ok(Measure::JensenShannon),
            "Hellinger" => Ok(Measure::Hellinger),
            other => Err(EstimatorError::UnknownMeasure(other.to_string())),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dirichlet pseudocounts added to every category of experiment A (`a`) and B (`b`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterPair {
    pub a: f64,
    pub b: f64,
}

impl HyperparameterPair {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        check_pseudocount("a", a)?;
        check_pseudocount("b", b)?;
        Ok(Self { a, b })
    }
}

/// Caller-supplied pseudocounts, consumed by the general Dirichlet methods.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pseudocounts {
    #[serde(default)]
    pub a: Option<f64>,
    #[serde(default)]
    pub b: Option<f64>,
}

impl Pseudocounts {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            a: Some(a),
            b: Some(b),
        }
    }

    /// A single concentration for entropy estimation
    pub fn alpha(alpha: f64) -> Self {
        Self {
            a: Some(alpha),
            b: None,
        }
    }
}

/// Named divergence estimators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DivergenceMethod {
    /// Plug-in frequencies, categories unseen in either experiment dropped
    #[default]
    #[serde(rename = "naive")]
    Naive,
    /// Camaglia-Mora-Walczak integral estimator (external)
    #[serde(rename = "CMW")]
    Cmw,
    /// a = b = 1/2
    Jeffreys,
    /// a = b = 1
    Laplace,
    /// a = 1/Kobs_A, b = 1/Kobs_B
    #[serde(rename = "SG")]
    SchurmannGrassberger,
    /// a = √N_A / Kobs_A, b = √N_B / Kobs_B
    #[serde(rename = "minimax")]
    Minimax,
    /// Caller-chosen pseudocounts
    Dirichlet { a: f64, b: f64 },
}

impl DivergenceMethod {
    /// Parse a method name, taking Dirichlet pseudocounts from `overrides`.
    pub fn parse(name: &str, overrides: &Pseudocounts) -> Result<Self> {
        let method = match name {
            "naive" | "maximum-likelihood" => DivergenceMethod::Naive,
            "CMW" | "Camaglia-Mora-Walczak" => DivergenceMethod::Cmw,
            "Jeffreys" | "Krichevsky-Trofimov" => DivergenceMethod::Jeffreys,
            "L" | "Laplace" | "Bayesian-Laplace" => DivergenceMethod::Laplace,
            "SG" | "Schurmann-Grassberger" => DivergenceMethod::SchurmannGrassberger,
            "minimax" | "Trybula" => DivergenceMethod::Minimax,
            "D" | "Dirichlet" => {
                let a = overrides.a.ok_or(EstimatorError::MissingHyperparameter {
                    method: name.to_string(),
                    name: "a",
                })?;
                let b = overrides.b.ok_or(EstimatorError::MissingHyperparameter {
                    method: name.to_string(),
                    name: "b",
                })?;
                DivergenceMethod::Dirichlet { a, b }
            }
            other => return Err(EstimatorError::UnknownMethod(other.to_string())),
        };
        Ok(method)
    }

    /// Pseudocounts for the Dirichlet family, `None` for Naive and CMW.
    pub fn hyperparameters(&self, summary: &DivergenceSummary) -> Result<Option<HyperparameterPair>> {
        let pair = match *self {
            DivergenceMethod::Naive | DivergenceMethod::Cmw => return Ok(None),
            DivergenceMethod::Jeffreys => HyperparameterPair::new(0.5, 0.5)?,
            DivergenceMethod::Laplace => HyperparameterPair::new(1.0, 1.0)?,
            DivergenceMethod::SchurmannGrassberger => HyperparameterPair::new(
                1.0 / summary.kobs_a() as f64,
                1.0 / summary.kobs_b() as f64,
            )?,
            DivergenceMethod::Minimax => HyperparameterPair::new(
                (summary.n_a() as f64).sqrt() / summary.kobs_a() as f64,
                (summary.n_b() as f64).sqrt() / summary.kobs_b() as f64,
            )?,
            DivergenceMethod::Dirichlet { a, b } => HyperparameterPair::new(a, b)?,
        };
        Ok(Some(pair))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DivergenceMethod::Naive => "naive",
            DivergenceMethod::Cmw => "CMW",
            DivergenceMethod::Jeffreys => "Jeffreys",
            DivergenceMethod::Laplace => "Laplace",
            DivergenceMethod::SchurmannGrassberger => "SG",
            DivergenceMethod::Minimax => "minimax",
            DivergenceMethod::Dirichlet { .. } => "Dirichlet",
        }
    }
}

impl FromStr for DivergenceMethod {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, &Pseudocounts::default())
    }
}

impl fmt::Display for DivergenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Named entropy estimators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EntropyMethod {
    /// Plug-in frequencies
    #[default]
    #[serde(rename = "naive")]
    Naive,
    /// Plug-in plus (Kobs − 1) / 2N
    #[serde(rename = "MM")]
    MillerMadow,
    /// Coverage-adjusted Horvitz-Thompson
    #[serde(rename = "CS")]
    ChaoShen,
    /// James-Stein shrinkage toward the uniform distribution
    #[serde(rename = "shrink")]
    Shrink,
    /// α = 1/2
    Jeffreys,
    /// α = 1
    Laplace,
    /// α = 1/Kobs
    #[serde(rename = "SG")]
    SchurmannGrassberger,
    /// α = √N / Kobs
    #[serde(rename = "minimax")]
    Minimax,
    /// Caller-chosen concentration
    Dirichlet { alpha: f64 },
    /// Nemenman-Shafee-Bialek integral estimator (external)
    #[serde(rename = "NSB")]
    Nsb,
}

impl EntropyMethod {
    /// Parse a method name; the Dirichlet concentration is read from `overrides.a`.
    pub fn parse(name: &str, overrides: &Pseudocounts) -> Result<Self> {
        let method = match name {
            "naive" | "maximum-likelihood" => EntropyMethod::Naive,
            "MM" | "Miller-Madow" => EntropyMethod::MillerMadow,
            "CS" | "Chao-Shen" => EntropyMethod::ChaoShen,
            "shrink" | "James-Stein" => EntropyMethod::Shrink,
            "Jeffreys" | "Krichevsky-Trofimov" => EntropyMethod::Jeffreys,
            "L" | "Laplace" | "Bayesian-Laplace" => EntropyMethod::Laplace,
            "SG" | "Schurmann-Grassberger" => EntropyMethod::SchurmannGrassberger,
            "minimax" | "Trybula" => EntropyMethod::Minimax,
            "NSB" | "Nemenman-Shafee-Bialek" => EntropyMethod::Nsb,
            "D" | "Dirichlet" => {
                let alpha = overrides.a.ok_or(EstimatorError::MissingHyperparameter {
                    method: name.to_string(),
                    name: "a",
                })?;
                EntropyMethod::Dirichlet { alpha }
            }
            other => return Err(EstimatorError::UnknownMethod(other.to_string())),
        };
        Ok(method)
    }

    /// Concentration for the Dirichlet family, `None` otherwise.
    pub fn concentration(&self, summary: &ExperimentSummary) -> Result<Option<f64>> {
        let alpha = match *self {
            EntropyMethod::Naive
            | EntropyMethod::MillerMadow
            | EntropyMethod::ChaoShen
            | EntropyMethod::Shrink
            | EntropyMethod::Nsb => return Ok(None),
            EntropyMethod::Jeffreys => 0.5,
            EntropyMethod::Laplace => 1.0,
            EntropyMethod::SchurmannGrassberger => 1.0 / summary.kobs() as f64,
            EntropyMethod::Minimax => (summary.n() as f64).sqrt() / summary.kobs() as f64,
            EntropyMethod::Dirichlet { alpha } => alpha,
        };
        check_pseudocount("alpha", alpha)?;
        Ok(Some(alpha))
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntropyMethod::Naive => "naive",
            EntropyMethod::MillerMadow => "MM",
            EntropyMethod::ChaoShen => "CS",
            EntropyMethod::Shrink => "shrink",
            EntropyMethod::Jeffreys => "Jeffreys",
            EntropyMethod::Laplace => "Laplace",
            EntropyMethod::SchurmannGrassberger => "SG",
            EntropyMethod::Minimax => "minimax",
            EntropyMethod::Dirichlet { .. } => "Dirichlet",
            EntropyMethod::Nsb => "NSB",
        }
    }
}

impl FromStr for EntropyMethod {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, &Pseudocounts::default())
    }
}

impl fmt::Display for EntropyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Divergence estimator configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub method: DivergenceMethod,

    #[serde(default)]
    pub unit: Unit,

    #[serde(default)]
    pub measure: Measure,
}

impl EstimatorConfig {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EstimatorError::SerializationError(e.to_string()))
    }
}

pub(crate) fn check_pseudocount(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EstimatorError::InvalidHyperparameter { name, value });
    }
    Ok(())
}
