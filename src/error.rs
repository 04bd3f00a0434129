//! Error types.
//!
//! - `EstimateError` is what the library (estimator, series validation) returns.
//! - `AppError` is what the binary surfaces: a message plus a process exit code.

use thiserror::Error;

/// Result alias for estimator operations.
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Errors raised by the estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// Malformed input series or options. Raised before any fitting work.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The bounded search ran out of iterations before the bracket shrank to
    /// the requested precision.
    #[error(
        "Search did not converge after {iterations} iterations (bracket width {width:.3e} > precision {precision:.3e})"
    )]
    Convergence {
        iterations: usize,
        width: f64,
        precision: f64,
    },

    /// The fitted `ach` does not map to a finite continuous rate.
    #[error("Degenerate fit: {0}")]
    Degenerate(String),
}

impl EstimateError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            EstimateError::InvalidInput(_) => 2,
            EstimateError::Convergence { .. } | EstimateError::Degenerate(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_error_maps_to_exit_codes() {
        let app: AppError = EstimateError::invalid("time is not increasing").into();
        assert_eq!(app.exit_code(), 2);
        assert_eq!(app.to_string(), "Invalid input: time is not increasing");

        let app: AppError = EstimateError::Convergence {
            iterations: 3,
            width: 1.0,
            precision: 1e-3,
        }
        .into();
        assert_eq!(app.exit_code(), 4);
        assert!(app.to_string().contains("3 iterations"));
    }
}
