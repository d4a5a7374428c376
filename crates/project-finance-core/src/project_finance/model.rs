use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::assumptions::Assumptions;
use super::bankability::{self, BankabilityAssessment, BankabilityTier};
use super::cash_flows::{self, YearRecord};
use super::coverage::{self, DscrYear};
use super::debt_service::{self, DebtSchedule};
use super::returns;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Ratio};
use crate::ProjectFinanceResult;

/// Complete output of the project finance model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResult {
    /// Year-by-year income statement and cash flow projection
    pub years: Vec<YearRecord>,
    /// Amortization table of the project debt
    pub debt_schedule: DebtSchedule,
    pub initial_debt: Money,
    pub initial_equity: Money,
    pub wacc: Rate,
    /// Unlevered NPV at WACC
    pub project_npv: Money,
    pub project_irr: Option<Rate>,
    pub equity_irr: Option<Rate>,
    pub average_dscr: Option<Ratio>,
    pub minimum_dscr: Option<Ratio>,
    pub dscr_by_year: Vec<DscrYear>,
    pub bankability: BankabilityAssessment,
    /// Equity IRR above the cost of equity (`None` if equity IRR undefined)
    pub equity_hurdle_met: Option<bool>,
}

/// Run the model and return the bare result.
///
/// Unsolvable IRRs come back as `None`; use [`model_project_finance`] to also
/// receive the reason as a warning.
pub fn compute(assumptions: &Assumptions) -> ProjectFinanceResult<ProjectResult> {
    let mut warnings = Vec::new();
    compute_with_warnings(assumptions, &mut warnings)
}

/// Build the project finance model: schedule, debt amortization, WACC, NPV,
/// project and equity IRR, DSCR, and the bankability verdict.
pub fn model_project_finance(
    assumptions: &Assumptions,
) -> ProjectFinanceResult<ComputationOutput<ProjectResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute_with_warnings(assumptions, &mut warnings)?;

    if let Some(min_dscr) = result.minimum_dscr {
        if min_dscr < bankability::DSCR_FLOOR {
            warnings.push(format!(
                "Minimum DSCR of {} is below 1.0x: operating cash flow does not cover debt service",
                min_dscr.round_dp(2)
            ));
        }
    } else {
        warnings.push("No debt service in the operation phase, DSCR undefined".into());
    }
    if result.equity_hurdle_met == Some(false) {
        warnings.push(format!(
            "Equity IRR is below the cost of equity ({})",
            assumptions.equity_cost_rate
        ));
    }
    if result.wacc > dec!(0.20) {
        warnings.push(format!("WACC of {} exceeds 20%", result.wacc));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Project Finance Model (level-payment debt, unlevered NPV at WACC)",
        assumptions,
        warnings,
        elapsed,
        result,
    ))
}

fn compute_with_warnings(
    assumptions: &Assumptions,
    warnings: &mut Vec<String>,
) -> ProjectFinanceResult<ProjectResult> {
    assumptions.validate()?;

    let debt_schedule = debt_service::build_debt_schedule(assumptions)?;
    let years = cash_flows::build_schedule(assumptions, debt_schedule.annual_payment)?;
    log::debug!(
        "schedule built: {} construction + {} operation years",
        assumptions.construction_years,
        assumptions.operation_years
    );

    let metrics = returns::compute_returns(assumptions, &years, warnings)?;
    let coverage = coverage::compute_coverage(&years)?;
    let assessment = bankability::classify(
        metrics.project_npv,
        metrics.project_irr,
        metrics.wacc,
        coverage.minimum_dscr,
    );
    if assessment.tier != BankabilityTier::Bankable {
        log::debug!(
            "bankability {:?}: {:?}",
            assessment.tier,
            assessment.issues
        );
    }

    let equity_hurdle_met = metrics
        .equity_irr
        .map(|irr| irr > assumptions.equity_cost_rate);

    Ok(ProjectResult {
        years,
        initial_debt: debt_schedule.initial_debt,
        initial_equity: assumptions.initial_equity(),
        debt_schedule,
        wacc: metrics.wacc,
        project_npv: metrics.project_npv,
        project_irr: metrics.project_irr,
        equity_irr: metrics.equity_irr,
        average_dscr: coverage.average_dscr,
        minimum_dscr: coverage.minimum_dscr,
        dscr_by_year: coverage.by_year,
        bankability: assessment,
        equity_hurdle_met,
    })
}
