use napi::Result as NapiResult;
use napi_derive::napi;

use project_finance_core::project_finance::{self, Assumptions};
use project_finance_core::sensitivity::{self, SensitivityInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Project finance model
// ---------------------------------------------------------------------------

/// Full model output envelope. Missing assumption fields take the reference
/// case values.
#[napi]
pub fn compute_project_finance(input_json: String) -> NapiResult<String> {
    let input = Assumptions::from_json(&input_json).map_err(to_napi_error)?;
    let output = project_finance::model_project_finance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Assumptions of the reference case, for seeding input forms.
#[napi]
pub fn default_assumptions() -> NapiResult<String> {
    serde_json::to_string(&Assumptions::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn project_finance_sensitivity(input_json: String) -> NapiResult<String> {
    let input = SensitivityInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
