//! WebAssembly bindings for the estimators.
//!
//! Summaries and configuration cross the boundary as JSON strings, grids as
//! `Float64Array`s. Only the closed-form estimators are reachable from
//! JavaScript.
//!
//! ## Usage (JavaScript/TypeScript)
//!
//! ```javascript
//! import init, { divergenceSummaryFromCounts, estimateDivergence } from 'bayes-divergence';
//!
//! await init();
//!
//! const summary = divergenceSummaryFromCounts([40, 12, 7, 3], [25, 20, 2, 0], 10);
//! const kl = estimateDivergence(summary, '{"method": "Jeffreys", "unit": "log2"}');
//! console.log(`D_KL = ${kl} bits`);
//! ```

use crate::config::{DivergenceMethod, EntropyMethod, EstimatorConfig, Pseudocounts, Unit};
use crate::error::EstimatorError;
use crate::implicit::{invert_implicit_relation, ImplicitRelation, SolverConfig};
use crate::posterior::log_measure_mu;
use crate::summary::{DivergenceSummary, ExperimentSummary};
use crate::switchboard::Switchboard;
use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (call once at startup)
#[wasm_bindgen(start)]
pub fn wasm_init() {
    console_error_panic_hook::set_once();
}

/// Build a divergence summary (JSON) from two histograms over the same categories
#[wasm_bindgen(js_name = "divergenceSummaryFromCounts")]
pub fn divergence_summary_from_counts(
    counts_a: Vec<u32>,
    counts_b: Vec<u32>,
    categories: Option<u32>,
) -> Result<String, JsValue> {
    let a: Vec<u64> = counts_a.into_iter().map(u64::from).collect();
    let b: Vec<u64> = counts_b.into_iter().map(u64::from).collect();
    let summary = DivergenceSummary::from_counts(&a, &b, categories.map(u64::from))?;
    Ok(summary.to_json()?)
}

/// Build an experiment summary (JSON) from one histogram
#[wasm_bindgen(js_name = "experimentSummaryFromCounts")]
pub fn experiment_summary_from_counts(counts: Vec<u32>, categories: Option<u32>) -> Result<String, JsValue> {
    let counts: Vec<u64> = counts.into_iter().map(u64::from).collect();
    let summary = ExperimentSummary::from_counts(&counts, categories.map(u64::from))?;
    Ok(summary.to_json()?)
}

/// Divergence estimate for a summary and an `EstimatorConfig` (both JSON)
#[wasm_bindgen(js_name = "estimateDivergence")]
pub fn estimate_divergence(summary_json: &str, config_json: &str) -> Result<f64, JsValue> {
    let summary = DivergenceSummary::from_json(summary_json)?;
    let config = EstimatorConfig::from_json(config_json)?;
    Ok(Switchboard::new().estimate(&summary, &config)?)
}

/// All divergences of one method, as a JSON report
#[wasm_bindgen(js_name = "divergenceReport")]
pub fn divergence_report(summary_json: &str, method: &str, unit: &str) -> Result<String, JsValue> {
    let summary = DivergenceSummary::from_json(summary_json)?;
    let method: DivergenceMethod = method.parse()?;
    let unit: Unit = unit.parse()?;
    let report = Switchboard::new().report(&summary, method, unit)?;
    Ok(report.to_json()?)
}

/// Entropy estimate; `alpha` is only read by the Dirichlet method
#[wasm_bindgen(js_name = "estimateEntropy")]
pub fn estimate_entropy(
    summary_json: &str,
    method: &str,
    unit: &str,
    alpha: Option<f64>,
) -> Result<f64, JsValue> {
    let summary = ExperimentSummary::from_json(summary_json)?;
    let overrides = Pseudocounts { a: alpha, b: None };
    let method = EntropyMethod::parse(method, &overrides)?;
    let unit: Unit = unit.parse()?;
    Ok(Switchboard::new().entropy(&summary, method, unit)?)
}

/// Concentration at which the prior expectation reaches `target`.
///
/// `relation` is `"entropy"` (α) or `"crossentropy"` (β).
#[wasm_bindgen(js_name = "invertImplicitRelation")]
pub fn invert_implicit(
    relation: &str,
    target: f64,
    categories: u32,
    lower: f64,
    upper: f64,
    maxiter: Option<u32>,
    xtol: Option<f64>,
) -> Result<f64, JsValue> {
    let relation = match relation {
        "entropy" => ImplicitRelation::EntropyVsAlpha,
        "crossentropy" => ImplicitRelation::CrossEntropyVsBeta,
        other => return Err(JsValue::from_str(&format!("Unknown implicit relation `{}`", other))),
    };
    let defaults = SolverConfig::default();
    let alpha = invert_implicit_relation(
        relation,
        target,
        u64::from(categories),
        (lower, upper),
        maxiter.map(|m| m as usize).unwrap_or(defaults.maxiter),
        xtol.unwrap_or(defaults.xtol),
    )?;
    Ok(alpha)
}

/// ln μ(α) over a grid of concentrations
#[wasm_bindgen(js_name = "logPosteriorWeight")]
pub fn log_posterior_weight(alphas: &Float64Array, summary_json: &str) -> Result<Float64Array, JsValue> {
    let summary = ExperimentSummary::from_json(summary_json)?;
    let values: Vec<f64> = alphas
        .to_vec()
        .into_iter()
        .map(|a| log_measure_mu(a, &summary))
        .collect();
    if values.iter().any(|v| v.is_nan()) {
        return Err(EstimatorError::NumericalError("log weight is NaN, check the alpha grid".into()).into());
    }
    Ok(Float64Array::from(values.as_slice()))
}

/// Get crate version
#[wasm_bindgen(js_name = "version")]
pub fn version() -> String {
    crate::VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_divergence_roundtrip() {
        let summary = divergence_summary_from_counts(vec![4, 2, 1, 0], vec![1, 3, 0, 2], Some(6)).unwrap();
        let kl = estimate_divergence(&summary, r#"{"method": "Laplace", "unit": "log2"}"#).unwrap();
        assert!(kl > 0.0);

        let report = divergence_report(&summary, "Laplace", "log2").unwrap();
        assert!(report.contains("\"method\":\"Laplace\""));

        assert!(estimate_divergence(&summary, r#"{"unit": "log3"}"#).is_err());
    }

    #[wasm_bindgen_test]
    fn test_entropy_and_weights() {
        let summary = experiment_summary_from_counts(vec![3, 3, 3, 3], None).unwrap();
        let h = estimate_entropy(&summary, "naive", "log2", None).unwrap();
        assert!((h - 2.0).abs() < 1e-12);

        let grid = Float64Array::from(&[0.1, 1.0, 10.0][..]);
        let weights = log_posterior_weight(&grid, &summary).unwrap();
        assert_eq!(weights.length(), 3);
    }

    #[wasm_bindgen_test]
    fn test_inversion() {
        let alpha = invert_implicit("entropy", 2.0, 100, 1e-10, 1e5, None, None).unwrap();
        assert!(alpha > 0.0);
        assert!(invert_implicit("renyi", 2.0, 100, 1e-10, 1e5, None, None).is_err());
    }
}
