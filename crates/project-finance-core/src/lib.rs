pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "project_finance")]
pub mod project_finance;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use error::ProjectFinanceError;
pub use types::*;

/// Standard result type for all project-finance operations
pub type ProjectFinanceResult<T> = Result<T, ProjectFinanceError>;
