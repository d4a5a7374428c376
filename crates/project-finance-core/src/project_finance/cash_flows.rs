use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::assumptions::Assumptions;
use crate::time_value::overflow;
use crate::types::Money;
use crate::ProjectFinanceResult;

/// Phase of the project a timeline year belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Construction,
    Operation,
}

/// One row of the year-by-year projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    /// Year number (1-based, spanning construction + operation)
    pub year: u32,
    pub phase: Phase,
    pub revenue: Money,
    pub opex: Money,
    /// EBITDA = revenue - opex
    pub ebitda: Money,
    /// Straight-line depreciation over the operation phase
    pub depreciation: Money,
    /// EBIT = EBITDA - depreciation
    pub ebit: Money,
    /// Tax payable (zero if EBIT <= 0, no loss carryforward)
    pub tax: Money,
    /// Net income = EBIT - tax
    pub net_income: Money,
    /// Unlevered cash flow = net income + depreciation
    pub operating_cash_flow: Money,
    /// Level debt payment (zero during construction)
    pub debt_service: Money,
    /// Capital expenditure drawn in the year
    pub capex_spend: Money,
}

impl YearRecord {
    pub fn is_operation(&self) -> bool {
        self.phase == Phase::Operation
    }
}

/// Build the full timeline of year records.
///
/// `annual_debt_service` is charged in every operation year. Assumptions must
/// already be validated. Escalated amounts that leave the decimal range are
/// reported as `Overflow`.
pub fn build_schedule(
    assumptions: &Assumptions,
    annual_debt_service: Money,
) -> ProjectFinanceResult<Vec<YearRecord>> {
    let construction = assumptions.construction_years;
    let operation = assumptions.operation_years;
    let mut years = Vec::with_capacity(assumptions.total_years() as usize);

    let capex_draws = construction_draws(assumptions.capex, construction);
    for (idx, capex_spend) in capex_draws.into_iter().enumerate() {
        years.push(YearRecord {
            year: idx as u32 + 1,
            phase: Phase::Construction,
            revenue: Decimal::ZERO,
            opex: Decimal::ZERO,
            ebitda: Decimal::ZERO,
            depreciation: Decimal::ZERO,
            ebit: Decimal::ZERO,
            tax: Decimal::ZERO,
            net_income: Decimal::ZERO,
            operating_cash_flow: Decimal::ZERO,
            debt_service: Decimal::ZERO,
            capex_spend,
        });
    }

    let depreciation = assumptions.capex / Decimal::from(operation);
    let escalation = Decimal::ONE
        .checked_add(assumptions.inflation_rate)
        .ok_or_else(|| overflow("inflation escalation"))?;
    let mut price_index = Decimal::ONE;

    for k in 0..operation {
        let year = construction + k + 1;
        if k > 0 {
            price_index = price_index
                .checked_mul(escalation)
                .ok_or_else(|| overflow(&format!("price index for year {year}")))?;
        }
        let revenue = assumptions
            .revenue
            .checked_mul(price_index)
            .ok_or_else(|| overflow(&format!("revenue for year {year}")))?;
        let opex = assumptions
            .opex
            .checked_mul(price_index)
            .ok_or_else(|| overflow(&format!("opex for year {year}")))?;

        let ebitda = revenue - opex;
        let ebit = ebitda
            .checked_sub(depreciation)
            .ok_or_else(|| overflow(&format!("EBIT for year {year}")))?;
        let tax = ebit.max(Decimal::ZERO) * assumptions.tax_rate;
        let net_income = ebit - tax;

        years.push(YearRecord {
            year,
            phase: Phase::Operation,
            revenue,
            opex,
            ebitda,
            depreciation,
            ebit,
            tax,
            net_income,
            operating_cash_flow: net_income + depreciation,
            debt_service: annual_debt_service,
            capex_spend: Decimal::ZERO,
        });
    }

    Ok(years)
}

/// Equal capex draws per construction year; the last year takes the decimal
/// remainder so the draws sum to `capex` exactly.
fn construction_draws(capex: Money, construction_years: u32) -> Vec<Money> {
    let n = construction_years as usize;
    let per_year = capex / Decimal::from(construction_years);
    let mut draws = vec![per_year; n];
    if let Some(last) = draws.last_mut() {
        *last = capex - per_year * Decimal::from(construction_years - 1);
    }
    draws
}
