pub mod assumptions;
pub mod bankability;
pub mod cash_flows;
pub mod coverage;
pub mod debt_service;
pub mod model;
pub mod returns;

pub use assumptions::Assumptions;
pub use bankability::{BankabilityAssessment, BankabilityIssue, BankabilityTier};
pub use cash_flows::{Phase, YearRecord};
pub use model::{compute, model_project_finance, ProjectResult};
