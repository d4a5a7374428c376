#![cfg(feature = "sensitivity")]

use project_finance_core::project_finance::{Assumptions, BankabilityTier};
use project_finance_core::sensitivity::{run_sensitivity, SensitivityInput, SweepVariable};
use rust_decimal_macros::dec;

#[test]
fn test_revenue_sweep_crosses_every_tier() {
    let input = SensitivityInput {
        base: Assumptions {
            equity_share: dec!(0.10),
            ..Default::default()
        },
        variable: SweepVariable::Revenue,
        min: dec!(200_000),
        max: dec!(400_000),
        step: dec!(30_000),
    };
    let out = run_sensitivity(&input).unwrap();
    let tiers: Vec<BankabilityTier> = out.result.results.iter().map(|r| r.tier).collect();

    assert_eq!(tiers.first(), Some(&BankabilityTier::NotBankable));
    assert!(tiers.contains(&BankabilityTier::Borderline));
    assert_eq!(tiers.last(), Some(&BankabilityTier::Bankable));
    // More revenue never worsens the verdict
    assert!(tiers.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_equity_share_sweep_moves_wacc_toward_cost_of_equity() {
    let input = SensitivityInput {
        base: Assumptions::default(),
        variable: SweepVariable::EquityShare,
        min: dec!(0),
        max: dec!(1),
        step: dec!(0.5),
    };
    let out = run_sensitivity(&input).unwrap();
    let rows = &out.result.results;
    assert_eq!(rows.len(), 3);
    // All-debt: 0.04 * 0.76; all-equity: 0.08
    assert_eq!(rows[0].wacc, dec!(0.0304));
    assert_eq!(rows[2].wacc, dec!(0.08));
    assert_eq!(rows[2].minimum_dscr, None);
}
