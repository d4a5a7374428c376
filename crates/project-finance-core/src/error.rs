use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectFinanceError {
    #[error("Invalid assumptions: {field} — {reason}")]
    InvalidAssumptions { field: String, reason: String },

    #[error("Unsolvable return: {series} — {reason}")]
    UnsolvableReturn { series: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ProjectFinanceError {
    fn from(e: serde_json::Error) -> Self {
        ProjectFinanceError::SerializationError(e.to_string())
    }
}
