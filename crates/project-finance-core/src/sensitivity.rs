use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ProjectFinanceError;
use crate::project_finance::{compute, Assumptions, BankabilityTier};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Ratio};
use crate::ProjectFinanceResult;

const MAX_SWEEP_POINTS: usize = 1_000;

/// Assumption that a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepVariable {
    Capex,
    Opex,
    Revenue,
    InflationRate,
    DebtRate,
    TaxRate,
    EquityShare,
    EquityCostRate,
}

impl SweepVariable {
    fn apply(self, base: &Assumptions, value: Decimal) -> Assumptions {
        let mut a = base.clone();
        match self {
            SweepVariable::Capex => a.capex = value,
            SweepVariable::Opex => a.opex = value,
            SweepVariable::Revenue => a.revenue = value,
            SweepVariable::InflationRate => a.inflation_rate = value,
            SweepVariable::DebtRate => a.debt_rate = value,
            SweepVariable::TaxRate => a.tax_rate = value,
            SweepVariable::EquityShare => a.equity_share = value,
            SweepVariable::EquityCostRate => a.equity_cost_rate = value,
        }
        a
    }
}

impl std::str::FromStr for SweepVariable {
    type Err = ProjectFinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capex" => Ok(SweepVariable::Capex),
            "opex" => Ok(SweepVariable::Opex),
            "revenue" => Ok(SweepVariable::Revenue),
            "inflation_rate" => Ok(SweepVariable::InflationRate),
            "debt_rate" => Ok(SweepVariable::DebtRate),
            "tax_rate" => Ok(SweepVariable::TaxRate),
            "equity_share" => Ok(SweepVariable::EquityShare),
            "equity_cost_rate" => Ok(SweepVariable::EquityCostRate),
            other => Err(ProjectFinanceError::InvalidAssumptions {
                field: "variable".into(),
                reason: format!("Unknown sweep variable '{other}'"),
            }),
        }
    }
}

/// One-way sensitivity sweep over a single assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// Base case; the swept field is overwritten at each point
    #[serde(default)]
    pub base: Assumptions,
    pub variable: SweepVariable,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

impl SensitivityInput {
    /// Parse a sweep request from JSON; `base` defaults to the reference case.
    pub fn from_json(json: &str) -> ProjectFinanceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Headline indicators at one sweep point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub value: Decimal,
    pub wacc: Rate,
    pub project_npv: Money,
    pub project_irr: Option<Rate>,
    pub equity_irr: Option<Rate>,
    pub minimum_dscr: Option<Ratio>,
    pub tier: BankabilityTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable: SweepVariable,
    pub results: Vec<SensitivityRow>,
}

/// Generate the sweep values from min to max with step, always including max.
fn generate_sweep_values(input: &SensitivityInput) -> ProjectFinanceResult<Vec<Decimal>> {
    if input.step <= Decimal::ZERO {
        return Err(ProjectFinanceError::InvalidAssumptions {
            field: "step".into(),
            reason: "Step must be positive".into(),
        });
    }
    if input.min > input.max {
        return Err(ProjectFinanceError::InvalidAssumptions {
            field: "min".into(),
            reason: "Min must be <= max".into(),
        });
    }
    let too_many = match (input.max - input.min).checked_div(input.step) {
        Some(intervals) => intervals.floor() >= Decimal::from(MAX_SWEEP_POINTS),
        None => true,
    };
    if too_many {
        return Err(ProjectFinanceError::InvalidAssumptions {
            field: "step".into(),
            reason: format!("Sweep would exceed {MAX_SWEEP_POINTS} points"),
        });
    }

    let mut values = Vec::new();
    let mut current = input.min;
    while current <= input.max {
        values.push(current);
        current = match current.checked_add(input.step) {
            Some(next) => next,
            None => break,
        };
    }
    if let Some(&last) = values.last() {
        if last < input.max {
            values.push(input.max);
        }
    }

    Ok(values)
}

/// Recompute the model at every sweep point. Points whose assumptions fail
/// validation are skipped with a warning.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> ProjectFinanceResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let values = generate_sweep_values(input)?;
    let mut results = Vec::with_capacity(values.len());

    for value in values {
        let assumptions = input.variable.apply(&input.base, value);
        match compute(&assumptions) {
            Ok(r) => results.push(SensitivityRow {
                value,
                wacc: r.wacc,
                project_npv: r.project_npv,
                project_irr: r.project_irr,
                equity_irr: r.equity_irr,
                minimum_dscr: r.minimum_dscr,
                tier: r.bankability.tier,
            }),
            Err(e) => warnings.push(format!("Skipped {:?} = {value}: {e}", input.variable)),
        }
    }

    let output = SensitivityOutput {
        variable: input.variable,
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-Way Sensitivity Sweep",
        &serde_json::json!({
            "variable": input.variable,
            "min": input.min.to_string(),
            "max": input.max.to_string(),
            "step": input.step.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sweep(variable: SweepVariable, min: Decimal, max: Decimal, step: Decimal) -> SensitivityInput {
        SensitivityInput {
            base: Assumptions::default(),
            variable,
            min,
            max,
            step,
        }
    }

    #[test]
    fn test_sweep_includes_max() {
        let input = sweep(SweepVariable::DebtRate, dec!(0.02), dec!(0.07), dec!(0.02));
        let values = generate_sweep_values(&input).unwrap();
        assert_eq!(values, vec![dec!(0.02), dec!(0.04), dec!(0.06), dec!(0.07)]);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        assert!(run_sensitivity(&sweep(SweepVariable::Capex, dec!(1), dec!(2), dec!(0))).is_err());
        assert!(run_sensitivity(&sweep(SweepVariable::Capex, dec!(2), dec!(1), dec!(1))).is_err());
        assert!(
            run_sensitivity(&sweep(SweepVariable::Capex, dec!(0), dec!(1), dec!(0.0001))).is_err()
        );
    }

    #[test]
    fn test_higher_debt_rate_lowers_minimum_dscr() {
        let input = sweep(SweepVariable::DebtRate, dec!(0.02), dec!(0.10), dec!(0.02));
        let out = run_sensitivity(&input).unwrap();
        assert_eq!(out.result.results.len(), 5);
        for pair in out.result.results.windows(2) {
            assert!(pair[1].minimum_dscr.unwrap() < pair[0].minimum_dscr.unwrap());
        }
    }

    #[test]
    fn test_invalid_points_are_skipped() {
        let input = sweep(SweepVariable::EquityShare, dec!(0.5), dec!(1.5), dec!(0.25));
        let out = run_sensitivity(&input).unwrap();
        // 0.5, 0.75, 1.0 valid; 1.25, 1.5 rejected
        assert_eq!(out.result.results.len(), 3);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_request_without_base_uses_reference_case() {
        let input = SensitivityInput::from_json(
            r#"{"variable": "debt_rate", "min": "0.02", "max": "0.06", "step": "0.02"}"#,
        )
        .unwrap();
        assert_eq!(input.base, Assumptions::default());
        assert_eq!(input.variable, SweepVariable::DebtRate);
        assert!(matches!(
            SensitivityInput::from_json(r#"{"variable": "beta"}"#),
            Err(ProjectFinanceError::SerializationError(_))
        ));
    }

    #[test]
    fn test_variable_names_parse() {
        assert_eq!("tax_rate".parse::<SweepVariable>().unwrap(), SweepVariable::TaxRate);
        assert!("beta".parse::<SweepVariable>().is_err());
    }

    #[test]
    fn test_overflowing_points_are_skipped() {
        let input = SensitivityInput {
            base: Assumptions {
                operation_years: 50,
                ..Default::default()
            },
            variable: SweepVariable::InflationRate,
            min: dec!(0),
            max: dec!(3),
            step: dec!(1),
        };
        let out = run_sensitivity(&input).unwrap();
        let swept: Vec<Decimal> = out.result.results.iter().map(|r| r.value).collect();
        assert_eq!(swept, vec![dec!(0), dec!(1)]);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings.iter().all(|w| w.contains("overflow")));
    }
}
