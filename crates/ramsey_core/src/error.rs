use thiserror::Error;

/// Typed failures surfaced by the solver engines.
///
/// Parameter and input validation errors are raised before any computation
/// begins. A non-finite trajectory sample is recovered locally by truncating
/// the path and only becomes `NumericOverflow` when it strikes the very first
/// simulated step, leaving nothing to classify.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid model parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid consumption bracket [{low}, {high}]: bounds must be positive with low < high")]
    InvalidBracket { low: f64, high: f64 },

    #[error("invalid capital grid: {0}")]
    InvalidGrid(String),

    #[error("shooting search exhausted {max_iterations} bisection iterations without an accepted path")]
    ConvergenceFailure { max_iterations: usize },

    #[error("trajectory sample became non-finite at step {step}")]
    NumericOverflow { step: usize },
}
