use pretty_assertions::assert_eq;
use project_finance_core::project_finance::{
    compute, model_project_finance, Assumptions, BankabilityIssue, BankabilityTier, Phase,
};
use project_finance_core::ProjectFinanceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn scenarios() -> Vec<Assumptions> {
    vec![
        Assumptions::default(),
        Assumptions {
            capex: dec!(1_234_567.89),
            construction_years: 3,
            operation_years: 25,
            inflation_rate: dec!(0.035),
            ..Default::default()
        },
        Assumptions {
            construction_years: 1,
            operation_years: 1,
            ..Default::default()
        },
        Assumptions {
            revenue: dec!(120_000),
            opex: dec!(110_000),
            construction_years: 5,
            operation_years: 50,
            debt_rate: dec!(0.09),
            equity_share: dec!(0.15),
            ..Default::default()
        },
    ]
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_schedule_length_and_construction_rows() {
    for a in scenarios() {
        let result = compute(&a).unwrap();
        assert_eq!(result.years.len(), a.total_years() as usize);
        for y in result.years.iter().take(a.construction_years as usize) {
            assert_eq!(y.phase, Phase::Construction);
            assert_eq!(y.revenue, Decimal::ZERO);
            assert_eq!(y.opex, Decimal::ZERO);
            assert_eq!(y.depreciation, Decimal::ZERO);
        }
    }
}

#[test]
fn test_capex_spend_sums_to_capex_exactly() {
    for a in scenarios() {
        let result = compute(&a).unwrap();
        let total: Decimal = result.years.iter().map(|y| y.capex_spend).sum();
        assert_eq!(total, a.capex);
    }
}

#[test]
fn test_income_statement_identities() {
    for a in scenarios() {
        for y in compute(&a).unwrap().years {
            assert_eq!(y.ebitda, y.revenue - y.opex);
            assert_eq!(y.ebit, y.ebitda - y.depreciation);
            if y.ebit <= Decimal::ZERO {
                assert_eq!(y.tax, Decimal::ZERO, "year {}", y.year);
            }
            assert_eq!(y.net_income, y.ebit - y.tax);
            assert_eq!(y.operating_cash_flow, y.net_income + y.depreciation);
        }
    }
}

#[test]
fn test_debt_service_level_in_operation_and_zero_in_construction() {
    for a in scenarios() {
        let result = compute(&a).unwrap();
        let payment = result.debt_schedule.annual_payment;
        for y in &result.years {
            match y.phase {
                Phase::Construction => assert_eq!(y.debt_service, Decimal::ZERO),
                Phase::Operation => assert_eq!(y.debt_service, payment),
            }
        }
    }
}

#[test]
fn test_zero_debt_rate_payment() {
    let a = Assumptions {
        debt_rate: Decimal::ZERO,
        ..Default::default()
    };
    let result = compute(&a).unwrap();
    let expected = a.initial_debt() / Decimal::from(a.operation_years);
    assert_eq!(result.debt_schedule.annual_payment, expected);
    assert_eq!(expected, dec!(70_000));
}

#[test]
fn test_minimum_dscr_not_above_average() {
    for a in scenarios() {
        let result = compute(&a).unwrap();
        if let (Some(min), Some(avg)) = (result.minimum_dscr, result.average_dscr) {
            assert!(min <= avg, "min {min} > avg {avg}");
        }
    }
}

// ===========================================================================
// Reference scenario
// ===========================================================================

#[test]
fn test_reference_scenario_indicators() {
    let result = compute(&Assumptions::default()).unwrap();

    assert_eq!(result.wacc, dec!(0.04528));

    let y3 = &result.years[2];
    assert_eq!(y3.year, 3);
    assert_eq!(y3.ebitda, dec!(400_000));
    assert_eq!(y3.depreciation, dec!(100_000));
    assert_eq!(y3.ebit, dec!(300_000));
    assert_eq!(y3.tax, dec!(72_000));
    assert_eq!(y3.net_income, dec!(228_000));
    assert_eq!(y3.operating_cash_flow, dec!(328_000));

    // Cross-checked against a floating-point rendition of the model
    let project_irr = result.project_irr.unwrap();
    let equity_irr = result.equity_irr.unwrap();
    assert!((project_irr - dec!(0.322493)).abs() < dec!(0.00001), "{project_irr}");
    assert!((equity_irr - dec!(0.539369)).abs() < dec!(0.00001), "{equity_irr}");
    assert!(
        (result.project_npv - dec!(1_801_011.91)).abs() < dec!(0.01),
        "{}",
        result.project_npv
    );
    assert!((result.average_dscr.unwrap() - dec!(4.135068)).abs() < dec!(0.00001));
    assert!((result.minimum_dscr.unwrap() - dec!(3.800534)).abs() < dec!(0.00001));

    assert_eq!(result.bankability.tier, BankabilityTier::Bankable);
    assert!(result.bankability.issues.is_empty());
}

#[test]
fn test_zero_debt_rate_dscr_is_exact() {
    let a = Assumptions {
        debt_rate: Decimal::ZERO,
        ..Default::default()
    };
    let result = compute(&a).unwrap();
    let payment = a.initial_debt() / Decimal::from(a.operation_years);

    let operation: Vec<_> = result.years.iter().filter(|y| y.is_operation()).collect();
    assert_eq!(operation.len(), result.dscr_by_year.len());
    for (y, d) in operation.iter().zip(&result.dscr_by_year) {
        assert_eq!(d.year, y.year);
        assert_eq!(d.dscr, Some(y.operating_cash_flow / payment));
    }
    // First operation year: 328,000 / 70,000
    assert!((result.minimum_dscr.unwrap() - dec!(4.685714)).abs() < dec!(0.000001));
}

#[test]
fn test_borderline_scenario() {
    let a = Assumptions {
        revenue: dec!(230_000),
        equity_share: dec!(0.10),
        ..Default::default()
    };
    let result = compute(&a).unwrap();
    assert!(result.project_irr.unwrap() > result.wacc);
    assert!(result.project_npv > Decimal::ZERO);
    let min = result.minimum_dscr.unwrap();
    assert!(min >= dec!(1.0) && min <= dec!(1.2), "min DSCR {min}");
    assert_eq!(result.bankability.tier, BankabilityTier::Borderline);
    assert_eq!(
        result.bankability.issues,
        vec![BankabilityIssue::DscrWithinBorderlineBand]
    );
}

#[test]
fn test_value_destroying_scenario() {
    let a = Assumptions {
        revenue: dec!(200_000),
        ..Default::default()
    };
    let result = compute(&a).unwrap();
    assert!(result.project_npv < Decimal::ZERO);
    // IRR still solves, just below WACC
    assert!(result.project_irr.unwrap() < result.wacc);
    assert_eq!(result.bankability.tier, BankabilityTier::NotBankable);
    assert!(result
        .bankability
        .issues
        .contains(&BankabilityIssue::IrrNotAboveWacc));
    assert!(result
        .bankability
        .issues
        .contains(&BankabilityIssue::NpvNotPositive));
    assert_eq!(result.equity_hurdle_met, Some(false));
}

// ===========================================================================
// Errors and purity
// ===========================================================================

#[test]
fn test_unsolvable_irr_leaves_other_indicators_intact() {
    let a = Assumptions {
        revenue: dec!(50_000),
        ..Default::default()
    };
    let out = model_project_finance(&a).unwrap();
    let result = &out.result;
    assert_eq!(result.project_irr, None);
    assert!(result.project_npv < Decimal::ZERO);
    assert!(result.minimum_dscr.is_some());
    assert_eq!(result.wacc, dec!(0.04528));
    assert!(out.warnings.iter().any(|w| w.starts_with("Project IRR is undefined")));

    let json = serde_json::to_value(&out).unwrap();
    assert!(json["result"]["project_irr"].is_null());
}

#[test]
fn test_invalid_assumptions_rejected() {
    let cases = vec![
        Assumptions {
            capex: dec!(-1),
            ..Default::default()
        },
        Assumptions {
            construction_years: 0,
            ..Default::default()
        },
        Assumptions {
            equity_share: dec!(1.5),
            ..Default::default()
        },
        Assumptions {
            tax_rate: dec!(1),
            ..Default::default()
        },
    ];
    for a in cases {
        assert!(matches!(
            compute(&a),
            Err(ProjectFinanceError::InvalidAssumptions { .. })
        ));
    }
}

#[test]
fn test_recompute_is_identical() {
    for a in scenarios() {
        let first = compute(&a).unwrap();
        let second = compute(&a).unwrap();
        assert_eq!(first, second);
    }
}
