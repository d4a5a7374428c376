use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProjectFinanceError;
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

/// Upper bound on either phase of the timeline, in years.
pub const MAX_PHASE_YEARS: u32 = 50;

/// Scalar inputs to the project finance model.
///
/// Rates are fractions (0.04 = 4%). Missing fields deserialize to the
/// reference case returned by [`Assumptions::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    /// Total capital expenditure, spread evenly over the construction years
    pub capex: Money,
    /// Annual operating expenditure in first-operation-year money
    pub opex: Money,
    /// Annual revenue in first-operation-year money
    pub revenue: Money,
    /// Annual escalation applied to both revenue and opex
    pub inflation_rate: Rate,
    /// Years of construction (no revenue, capex drawn)
    pub construction_years: u32,
    /// Years of operation; also the depreciation life and the loan tenor
    pub operation_years: u32,
    /// Annual interest rate on the project debt
    pub debt_rate: Rate,
    /// Corporate tax rate applied to positive EBIT
    pub tax_rate: Rate,
    /// Fraction of capex funded by sponsor equity
    pub equity_share: Rate,
    /// Return required by equity investors
    pub equity_cost_rate: Rate,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            capex: dec!(1_000_000),
            opex: dec!(100_000),
            revenue: dec!(500_000),
            inflation_rate: dec!(0.02),
            construction_years: 2,
            operation_years: 10,
            debt_rate: dec!(0.04),
            tax_rate: dec!(0.24),
            equity_share: dec!(0.30),
            equity_cost_rate: dec!(0.08),
        }
    }
}

impl Assumptions {
    /// Parse assumptions from JSON. Missing fields take the reference case.
    pub fn from_json(json: &str) -> ProjectFinanceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every structural precondition. Called by all model entry points
    /// before any arithmetic.
    pub fn validate(&self) -> ProjectFinanceResult<()> {
        if self.capex <= Decimal::ZERO {
            return Err(invalid("capex", "Capital expenditure must be positive"));
        }
        if self.opex < Decimal::ZERO {
            return Err(invalid("opex", "Operating expenditure cannot be negative"));
        }
        if self.revenue < Decimal::ZERO {
            return Err(invalid("revenue", "Revenue cannot be negative"));
        }
        if self.inflation_rate < Decimal::ZERO {
            return Err(invalid("inflation_rate", "Inflation rate cannot be negative"));
        }

        check_phase("construction_years", self.construction_years)?;
        check_phase("operation_years", self.operation_years)?;

        if self.debt_rate < Decimal::ZERO {
            return Err(invalid("debt_rate", "Debt rate cannot be negative"));
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate >= Decimal::ONE {
            return Err(invalid("tax_rate", "Tax rate must be in [0, 1)"));
        }
        if self.equity_share < Decimal::ZERO || self.equity_share > Decimal::ONE {
            return Err(invalid("equity_share", "Equity share must be in [0, 1]"));
        }
        if self.equity_cost_rate < Decimal::ZERO {
            return Err(invalid(
                "equity_cost_rate",
                "Cost of equity cannot be negative",
            ));
        }

        Ok(())
    }

    /// Total number of years on the timeline.
    pub fn total_years(&self) -> u32 {
        self.construction_years + self.operation_years
    }

    /// Debt drawn to fund the non-equity share of capex.
    pub fn initial_debt(&self) -> Money {
        self.capex * (Decimal::ONE - self.equity_share)
    }

    /// Equity injected upfront.
    pub fn initial_equity(&self) -> Money {
        self.capex * self.equity_share
    }
}

fn check_phase(field: &str, years: u32) -> ProjectFinanceResult<()> {
    if years < 1 {
        return Err(invalid(field, "Duration must be at least 1 year"));
    }
    if years > MAX_PHASE_YEARS {
        return Err(invalid(
            field,
            &format!("Duration cannot exceed {MAX_PHASE_YEARS} years"),
        ));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ProjectFinanceError {
    ProjectFinanceError::InvalidAssumptions {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rejects(assumptions: Assumptions, field: &str) {
        match assumptions.validate() {
            Err(ProjectFinanceError::InvalidAssumptions { field: f, .. }) => {
                assert_eq!(f, field)
            }
            other => panic!("expected InvalidAssumptions on {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_case_is_valid() {
        assert!(Assumptions::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_capex() {
        let a = Assumptions {
            capex: Decimal::ZERO,
            ..Default::default()
        };
        assert_rejects(a, "capex");
    }

    #[test]
    fn test_rejects_zero_durations() {
        let a = Assumptions {
            construction_years: 0,
            ..Default::default()
        };
        assert_rejects(a, "construction_years");

        let a = Assumptions {
            operation_years: 0,
            ..Default::default()
        };
        assert_rejects(a, "operation_years");
    }

    #[test]
    fn test_rejects_operation_beyond_fifty_years() {
        let a = Assumptions {
            operation_years: 51,
            ..Default::default()
        };
        assert_rejects(a, "operation_years");
    }

    #[test]
    fn test_equity_share_bounds() {
        let a = Assumptions {
            equity_share: dec!(1.01),
            ..Default::default()
        };
        assert_rejects(a, "equity_share");

        let a = Assumptions {
            equity_share: dec!(-0.01),
            ..Default::default()
        };
        assert_rejects(a, "equity_share");

        for share in [Decimal::ZERO, Decimal::ONE] {
            let a = Assumptions {
                equity_share: share,
                ..Default::default()
            };
            assert!(a.validate().is_ok());
        }
    }

    #[test]
    fn test_tax_rate_must_be_below_one() {
        let a = Assumptions {
            tax_rate: Decimal::ONE,
            ..Default::default()
        };
        assert_rejects(a, "tax_rate");
    }

    fn reference_with(edit: impl FnOnce(&mut Assumptions)) -> Assumptions {
        let mut a = Assumptions::default();
        edit(&mut a);
        a
    }

    #[test]
    fn test_rejects_negative_amounts_and_rates() {
        assert_rejects(reference_with(|a| a.opex = dec!(-1)), "opex");
        assert_rejects(reference_with(|a| a.revenue = dec!(-1)), "revenue");
        assert_rejects(reference_with(|a| a.inflation_rate = dec!(-0.01)), "inflation_rate");
        assert_rejects(reference_with(|a| a.debt_rate = dec!(-0.01)), "debt_rate");
        assert_rejects(reference_with(|a| a.tax_rate = dec!(-0.01)), "tax_rate");
        assert_rejects(reference_with(|a| a.equity_cost_rate = dec!(-0.01)), "equity_cost_rate");
    }

    #[test]
    fn test_rejects_construction_beyond_fifty_years() {
        assert_rejects(reference_with(|a| a.construction_years = 51), "construction_years");
        assert!(reference_with(|a| a.construction_years = 50).validate().is_ok());
    }

    #[test]
    fn test_from_json_reports_serialization_errors() {
        let a = Assumptions::from_json(r#"{"debt_rate": "0.05"}"#).unwrap();
        assert_eq!(a.debt_rate, dec!(0.05));
        assert!(matches!(
            Assumptions::from_json("{not json"),
            Err(ProjectFinanceError::SerializationError(_))
        ));
    }

    #[test]
    fn test_funding_split() {
        let a = Assumptions::default();
        assert_eq!(a.initial_debt(), dec!(700_000));
        assert_eq!(a.initial_equity(), dec!(300_000));
        assert_eq!(a.initial_debt() + a.initial_equity(), a.capex);
        assert_eq!(a.total_years(), 12);
    }

    #[test]
    fn test_partial_json_falls_back_to_reference_case() {
        let a: Assumptions = serde_json::from_str(r#"{"capex": "2000000"}"#).unwrap();
        assert_eq!(a.capex, dec!(2_000_000));
        assert_eq!(a.operation_years, 10);
        assert_eq!(a.equity_share, dec!(0.30));
    }
}
