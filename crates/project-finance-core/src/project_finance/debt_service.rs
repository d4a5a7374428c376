use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::assumptions::Assumptions;
use crate::time_value::{self, overflow};
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

/// A single operation year of the amortization table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPeriod {
    /// Timeline year (1-based, spanning construction + operation)
    pub year: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub payment: Money,
    pub closing_balance: Money,
}

/// Level-payment amortization of the project debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub initial_debt: Money,
    pub debt_rate: Rate,
    /// Constant payment charged in every operation year
    pub annual_payment: Money,
    pub periods: Vec<DebtPeriod>,
    pub total_interest: Money,
    pub total_principal: Money,
}

/// Level annual payment that fully amortizes `initial_debt` over
/// `operation_years` payments at `debt_rate`.
pub fn level_payment(
    initial_debt: Money,
    debt_rate: Rate,
    operation_years: u32,
) -> ProjectFinanceResult<Money> {
    if initial_debt.is_zero() {
        return Ok(Decimal::ZERO);
    }
    time_value::pmt(debt_rate, operation_years, -initial_debt, Decimal::ZERO)
}

/// Build the amortization table. Repayment starts in the first operation
/// year; there is no grace period, balloon or interest during construction.
pub fn build_debt_schedule(assumptions: &Assumptions) -> ProjectFinanceResult<DebtSchedule> {
    let initial_debt = assumptions.initial_debt();
    let rate = assumptions.debt_rate;
    let n = assumptions.operation_years;
    let annual_payment = level_payment(initial_debt, rate, n)?;

    let mut periods = Vec::with_capacity(n as usize);
    let mut balance = initial_debt;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;

    for k in 0..n {
        let year = assumptions.construction_years + k + 1;
        let opening_balance = balance;
        let interest = opening_balance
            .checked_mul(rate)
            .ok_or_else(|| overflow(&format!("interest for year {year}")))?;
        // Final period clears whatever rounding left behind
        let principal = if k + 1 == n {
            opening_balance
        } else {
            annual_payment - interest
        };
        balance = opening_balance - principal;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| overflow("total interest"))?;
        total_principal += principal;

        periods.push(DebtPeriod {
            year,
            opening_balance,
            interest,
            principal,
            payment: annual_payment,
            closing_balance: balance,
        });
    }

    log::debug!(
        "debt schedule: initial {initial_debt}, payment {annual_payment} over {n} years at {rate}"
    );

    Ok(DebtSchedule {
        initial_debt,
        debt_rate: rate,
        annual_payment,
        periods,
        total_interest,
        total_principal,
    })
}
