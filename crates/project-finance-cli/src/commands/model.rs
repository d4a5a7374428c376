use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use project_finance_core::project_finance::{self, Assumptions};

use crate::input;

/// Project assumptions: loaded from a JSON/YAML file or stdin, falling back
/// to the reference case, then overridden by individual flags.
#[derive(Args, Debug, Default)]
#[command(allow_hyphen_values = true)]
pub struct AssumptionArgs {
    /// Path to JSON or YAML assumptions file
    #[arg(long)]
    pub input: Option<String>,

    /// Total capital expenditure
    #[arg(long)]
    pub capex: Option<Decimal>,

    /// Annual operating expenditure (first operation year)
    #[arg(long)]
    pub opex: Option<Decimal>,

    /// Annual revenue (first operation year)
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Annual inflation applied to revenue and opex (e.g. 0.02 for 2%)
    #[arg(long)]
    pub inflation_rate: Option<Decimal>,

    /// Construction period in years
    #[arg(long)]
    pub construction_years: Option<u32>,

    /// Operation period in years
    #[arg(long)]
    pub operation_years: Option<u32>,

    /// Interest rate on debt (e.g. 0.04 for 4%)
    #[arg(long, alias = "kd")]
    pub debt_rate: Option<Decimal>,

    /// Corporate tax rate (e.g. 0.24 for 24%)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Share of capex funded with equity (0 to 1)
    #[arg(long)]
    pub equity_share: Option<Decimal>,

    /// Cost of equity (e.g. 0.08 for 8%)
    #[arg(long, alias = "ke")]
    pub equity_cost_rate: Option<Decimal>,
}

impl AssumptionArgs {
    pub fn resolve(&self) -> Result<Assumptions, Box<dyn std::error::Error>> {
        let base: Assumptions = if let Some(ref path) = self.input {
            input::file::read_config(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            log::debug!("no assumptions supplied, starting from the reference case");
            Assumptions::default()
        };
        Ok(self.apply_overrides(base))
    }

    fn apply_overrides(&self, mut a: Assumptions) -> Assumptions {
        if let Some(v) = self.capex {
            a.capex = v;
        }
        if let Some(v) = self.opex {
            a.opex = v;
        }
        if let Some(v) = self.revenue {
            a.revenue = v;
        }
        if let Some(v) = self.inflation_rate {
            a.inflation_rate = v;
        }
        if let Some(v) = self.construction_years {
            a.construction_years = v;
        }
        if let Some(v) = self.operation_years {
            a.operation_years = v;
        }
        if let Some(v) = self.debt_rate {
            a.debt_rate = v;
        }
        if let Some(v) = self.tax_rate {
            a.tax_rate = v;
        }
        if let Some(v) = self.equity_share {
            a.equity_share = v;
        }
        if let Some(v) = self.equity_cost_rate {
            a.equity_cost_rate = v;
        }
        a
    }
}

pub fn run_model(args: AssumptionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = args.resolve()?;
    let result = project_finance::model_project_finance(&assumptions)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: AssumptionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = args.resolve()?;
    let result = project_finance::compute(&assumptions)?;
    Ok(serde_json::to_value(result.years)?)
}

pub fn run_debt(args: AssumptionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = args.resolve()?;
    let result = project_finance::compute(&assumptions)?;
    Ok(serde_json::to_value(result.debt_schedule.periods)?)
}

pub fn run_bankability(args: AssumptionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = args.resolve()?;
    let result = project_finance::compute(&assumptions)?;
    let issues: Vec<String> = result
        .bankability
        .issues
        .iter()
        .map(|i| i.to_string())
        .collect();
    Ok(json!({
        "result": {
            "tier": result.bankability.tier,
            "issues": issues,
            "wacc": result.wacc,
            "project_npv": result.project_npv,
            "project_irr": result.project_irr,
            "equity_irr": result.equity_irr,
            "minimum_dscr": result.minimum_dscr,
            "average_dscr": result.average_dscr,
            "equity_hurdle_met": result.equity_hurdle_met,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flags_override_loaded_assumptions() {
        let args = AssumptionArgs {
            debt_rate: Some(dec!(0.06)),
            operation_years: Some(20),
            ..Default::default()
        };
        let a = args.apply_overrides(Assumptions::default());
        assert_eq!(a.debt_rate, dec!(0.06));
        assert_eq!(a.operation_years, 20);
        assert_eq!(a.capex, Assumptions::default().capex);
    }
}
