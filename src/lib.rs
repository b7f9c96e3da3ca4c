//! # Bayes Divergence
//!
//! Entropy and divergence estimation from sparse count data with Dirichlet
//! pseudocount estimators.
//!
//! ## Theory
//!
//! Histograms are reduced to a frequency-of-frequencies table: which counts
//! occurred and how many categories showed each. With a Dirichlet prior of
//! concentration `a` the posterior-mean frequencies are
//!
//! ```text
//! h = (n + a) / (N + K·a)
//! ```
//!
//! and the divergences are plug-in formulas in `h`. The prior weight of a
//! concentration given the data is
//!
//! ```text
//! μ(α) = Γ(Kα) / Γ(α)^K · Π Γ(n + α) / Γ(N + Kα)
//! ```
//!
//! which is kept in extended precision since it leaves the `f64` range for
//! realistic N and K.
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `wasm`: WebAssembly bindings via wasm-bindgen
//!
//! ## Example
//!
//! ```rust
//! use bayes_divergence::{entropy_or_divergence, CompactSummary, DivergenceSummary, Pseudocounts};
//!
//! // two histograms over the same 10 categories, 4 of them never observed
//! let a = [40, 12, 7, 3, 1, 0];
//! let b = [25, 20, 2, 0, 4, 1];
//! let summary: CompactSummary = DivergenceSummary::from_counts(&a, &b, Some(10)).unwrap().into();
//!
//! let kl = entropy_or_divergence(&summary, "Jeffreys", "log2", "Kullback-Leibler", &Pseudocounts::default())
//!     .unwrap();
//! let js = entropy_or_divergence(&summary, "minimax", "log2", "Jensen-Shannon", &Pseudocounts::default())
//!     .unwrap();
//! println!("D_KL = {:.4} bits, JS = {:.4} bits", kl, js);
//! ```

pub mod config;
pub mod divergence;
pub mod entropy;
pub mod error;
pub mod implicit;
pub mod posterior;
pub mod precision;
pub mod special;
pub mod summary;
pub mod switchboard;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports
pub use config::{
    DivergenceMethod, EntropyMethod, EstimatorConfig, HyperparameterPair, Measure, Pseudocounts, Unit,
};
pub use divergence::{DivergenceReport, PairedFrequencies};
pub use error::*;
pub use implicit::{
    brentq, get_from_implicit, invert_implicit_relation, ImplicitRelation, SolverConfig,
};
pub use posterior::{
    integral_with_mu, log_measure_mu, log_measure_mu_from_parts, measure_mu, measure_mu_grid,
    posterior_average,
};
pub use precision::ExtendedFloat;
pub use summary::{CompactSummary, DivergenceSummary, ExperimentSummary};
pub use switchboard::{
    entropy_or_divergence, posterior_weight, switchboard, DivergenceEstimator, EntropyEstimator,
    Switchboard,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the crate (call once, especially important for WASM)
#[cfg(feature = "wasm")]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_workflow() {
        let a = [40, 12, 7, 3, 1, 0];
        let b = [25, 20, 2, 0, 4, 1];
        let summary = DivergenceSummary::from_counts(&a, &b, Some(10)).unwrap();
        let board = Switchboard::new();

        let kl = board
            .divergence(&summary, DivergenceMethod::Jeffreys, Unit::Ln, Measure::KullbackLeibler)
            .unwrap();
        let js = board
            .divergence(&summary, DivergenceMethod::Jeffreys, Unit::Log2, Measure::JensenShannon)
            .unwrap();
        let hellinger = board.hellinger(&summary, DivergenceMethod::Jeffreys).unwrap();

        assert!(kl > 0.0);
        // JS in bits is bounded by 1
        assert!(js > 0.0 && js <= 1.0);
        assert!(hellinger > 0.0 && hellinger <= 1.0);

        let marginal = summary.marginal_a().unwrap();
        let h = board
            .entropy(&marginal, EntropyMethod::Jeffreys, Unit::Log2)
            .unwrap();
        assert!(h > 0.0 && h <= (10f64).log2());
    }

    #[test]
    fn test_prior_inversion_workflow() {
        // pick the concentration whose prior expects half the maximal entropy
        let k = 1000;
        let target = 0.5 * (k as f64).ln();
        let alpha =
            invert_implicit_relation(ImplicitRelation::EntropyVsAlpha, target, k, (1e-10, 1e5), 100, 1e-20)
                .unwrap();
        assert!(alpha > 0.0);

        let summary = ExperimentSummary::from_counts(&[30, 2, 1, 1], Some(k)).unwrap();
        let w = measure_mu(alpha, &summary);
        assert!(w.is_finite() && !w.is_zero());
    }
}
