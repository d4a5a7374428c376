use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use project_finance_core::sensitivity::{self, SensitivityInput, SweepVariable};

use super::model::AssumptionArgs;

/// Arguments for a one-way sensitivity sweep
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SensitivityArgs {
    /// Assumption to sweep: capex, opex, revenue, inflation_rate, debt_rate,
    /// tax_rate, equity_share, equity_cost_rate
    #[arg(long)]
    pub variable: String,

    /// First value of the sweep
    #[arg(long)]
    pub min: Decimal,

    /// Last value of the sweep (always included)
    #[arg(long)]
    pub max: Decimal,

    /// Increment between sweep points
    #[arg(long)]
    pub step: Decimal,

    #[command(flatten)]
    pub assumptions: AssumptionArgs,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let variable: SweepVariable = args.variable.parse()?;
    let input = SensitivityInput {
        base: args.assumptions.resolve()?,
        variable,
        min: args.min,
        max: args.max,
        step: args.step,
    };
    let result = sensitivity::run_sensitivity(&input)?;
    // Flatten so the table and CSV writers see the rows directly
    let mut value = serde_json::to_value(result)?;
    if let Some(rows) = value.pointer_mut("/result/results").map(Value::take) {
        if let Some(map) = value.as_object_mut() {
            map.remove("result");
            map.insert("results".into(), rows);
        }
    }
    Ok(value)
}
