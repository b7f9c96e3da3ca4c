//! Error types for the estimators.

use thiserror::Error;

/// Failures of the bracketed root finder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// f(lower) and f(upper) have the same sign
    #[error("f(a) and f(b) must have different signs: f({lower}) = {f_lower}, f({upper}) = {f_upper}")]
    NoSignChange {
        lower: f64,
        upper: f64,
        f_lower: f64,
        f_upper: f64,
    },

    /// Iteration budget exhausted before the bracket shrank below tolerance
    #[error("failed to converge after {maxiter} iterations, last estimate {last}")]
    MaxIterations { maxiter: usize, last: f64 },

    /// The implicit relation evaluated to NaN
    #[error("implicit relation is not finite at x = {x}")]
    NonFinite { x: f64 },
}

/// Main error type for estimator operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// Logarithm unit not in the unit table
    #[error("Unknown unit `{0}`, choose amongst ln, log2, log10")]
    UnknownUnit(String),

    /// Measure name not recognized at all
    #[error("Unknown measure `{0}`")]
    UnknownMeasure(String),

    /// Method name not recognized
    #[error("Unknown method `{0}`")]
    UnknownMethod(String),

    /// Measure is valid but not handled by this entry point
    #[error("Measure `{measure}` is not supported by this entry point")]
    UnsupportedMeasure { measure: String },

    /// Method cannot estimate the requested measure
    #[error("Method `{method}` cannot estimate `{measure}`")]
    UnsupportedCombination { method: String, measure: String },

    /// A method needs pseudocounts that were not supplied
    #[error("Method `{method}` requires the hyperparameter `{name}`")]
    MissingHyperparameter { method: String, name: &'static str },

    /// Pseudocount outside [0, inf)
    #[error("Invalid hyperparameter `{name}` = {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    /// External integral estimator was requested but never registered
    #[error("Estimator `{0}` is not available, register it on the switchboard first")]
    EstimatorUnavailable(String),

    /// Compact summary violates its invariants
    #[error("Invalid compact summary: {0}")]
    InvalidSummary(String),

    /// Array dimensions don't match
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Numerical error (overflow, underflow, NaN)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Root finding failed
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for estimator operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;

impl EstimatorError {
    /// Check if this error stems from an invalid unit/measure/method choice
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EstimatorError::UnknownUnit(_)
                | EstimatorError::UnknownMeasure(_)
                | EstimatorError::UnknownMethod(_)
                | EstimatorError::UnsupportedMeasure { .. }
                | EstimatorError::UnsupportedCombination { .. }
                | EstimatorError::MissingHyperparameter { .. }
                | EstimatorError::InvalidHyperparameter { .. }
        )
    }
}

#[cfg(feature = "wasm")]
impl From<EstimatorError> for wasm_bindgen::JsValue {
    fn from(err: EstimatorError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
