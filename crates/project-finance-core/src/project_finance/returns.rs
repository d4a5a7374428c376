use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::assumptions::Assumptions;
use super::cash_flows::YearRecord;
use crate::time_value::{self, overflow};
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

const IRR_GUESS: Rate = dec!(0.10);

/// Discounting and return indicators for the project and its equity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub wacc: Rate,
    pub project_npv: Money,
    /// `None` when the unlevered series has no solvable rate
    pub project_irr: Option<Rate>,
    /// `None` when the levered series has no solvable rate
    pub equity_irr: Option<Rate>,
    /// -capex at t=0, then one flow per operation year
    pub unlevered_cash_flows: Vec<Money>,
    /// -equity at t=0, then one flow per timeline year from year 2
    pub levered_cash_flows: Vec<Money>,
}

/// WACC = We * Ke + Wd * Kd * (1 - t), with weights taken from the
/// capex funding split.
pub fn wacc(assumptions: &Assumptions) -> ProjectFinanceResult<Rate> {
    let we = assumptions.equity_share;
    let wd = Decimal::ONE - we;
    let after_tax_kd = assumptions
        .debt_rate
        .checked_mul(Decimal::ONE - assumptions.tax_rate)
        .ok_or_else(|| overflow("after-tax cost of debt"))?;
    we.checked_mul(assumptions.equity_cost_rate)
        .zip(wd.checked_mul(after_tax_kd))
        .and_then(|(equity, debt)| equity.checked_add(debt))
        .ok_or_else(|| overflow("WACC"))
}

/// Upfront capex followed by the operation-phase operating cash flows.
/// Construction years are dropped; the whole investment sits at t=0.
pub fn unlevered_cash_flows(assumptions: &Assumptions, years: &[YearRecord]) -> Vec<Money> {
    let mut flows = Vec::with_capacity(assumptions.operation_years as usize + 1);
    flows.push(-assumptions.capex);
    flows.extend(
        years
            .iter()
            .filter(|y| y.is_operation())
            .map(|y| y.operating_cash_flow),
    );
    flows
}

/// Upfront equity followed by operating cash flow net of debt service for
/// timeline years 2..N. The first timeline year contributes only through the
/// equity outlay at t=0.
pub fn levered_cash_flows(
    assumptions: &Assumptions,
    years: &[YearRecord],
) -> ProjectFinanceResult<Vec<Money>> {
    let mut flows = Vec::with_capacity(years.len());
    flows.push(-assumptions.initial_equity());
    for y in years.iter().skip(1) {
        let flow = y
            .operating_cash_flow
            .checked_sub(y.debt_service)
            .ok_or_else(|| overflow(&format!("equity cash flow for year {}", y.year)))?;
        flows.push(flow);
    }
    Ok(flows)
}

/// Compute WACC, project NPV and both IRRs.
///
/// An IRR that cannot be solved is returned as `None` and its reason is
/// appended to `warnings`; every other indicator still computes.
pub fn compute_returns(
    assumptions: &Assumptions,
    years: &[YearRecord],
    warnings: &mut Vec<String>,
) -> ProjectFinanceResult<ReturnMetrics> {
    let wacc = wacc(assumptions)?;
    let unlevered = unlevered_cash_flows(assumptions, years);
    let levered = levered_cash_flows(assumptions, years)?;

    let project_npv = time_value::npv(wacc, &unlevered)?;
    let project_irr = solve_irr(&unlevered, "Project IRR", warnings);
    let equity_irr = solve_irr(&levered, "Equity IRR", warnings);

    Ok(ReturnMetrics {
        wacc,
        project_npv,
        project_irr,
        equity_irr,
        unlevered_cash_flows: unlevered,
        levered_cash_flows: levered,
    })
}

fn solve_irr(cash_flows: &[Money], label: &str, warnings: &mut Vec<String>) -> Option<Rate> {
    match time_value::irr(cash_flows, IRR_GUESS) {
        Ok(rate) => Some(rate),
        Err(e) => {
            log::warn!("{label} left undefined: {e}");
            warnings.push(format!("{label} is undefined: {e}"));
            None
        }
    }
}
