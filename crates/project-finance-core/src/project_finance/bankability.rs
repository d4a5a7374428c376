use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, Ratio};

/// Minimum DSCR a lender treats as comfortable coverage (strictly above).
pub const BANKABLE_MIN_DSCR: Ratio = dec!(1.20);

/// Below this minimum DSCR the project cannot meet its debt payments.
pub const DSCR_FLOOR: Ratio = dec!(1.00);

/// Three-tier lender verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BankabilityTier {
    NotBankable,
    Borderline,
    Bankable,
}

/// A threshold the project failed to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BankabilityIssue {
    /// Project IRR at or below WACC
    IrrNotAboveWacc,
    /// Project IRR could not be solved
    IrrUndefined,
    /// Project NPV at or below zero
    NpvNotPositive,
    /// Minimum DSCR below 1.00
    DscrBelowFloor,
    /// Minimum DSCR within [1.00, 1.20]
    DscrWithinBorderlineBand,
    /// No operation year carries debt service
    DscrUndefined,
}

impl std::fmt::Display for BankabilityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            BankabilityIssue::IrrNotAboveWacc => "project IRR <= WACC",
            BankabilityIssue::IrrUndefined => "project IRR undefined",
            BankabilityIssue::NpvNotPositive => "project NPV <= 0",
            BankabilityIssue::DscrBelowFloor => "minimum DSCR < 1.00",
            BankabilityIssue::DscrWithinBorderlineBand => "minimum DSCR <= 1.20",
            BankabilityIssue::DscrUndefined => "minimum DSCR undefined",
        };
        f.write_str(text)
    }
}

/// Verdict plus every threshold that was not met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankabilityAssessment {
    pub tier: BankabilityTier,
    pub issues: Vec<BankabilityIssue>,
}

/// Classify the project from its headline indicators.
///
/// * `Bankable`: IRR > WACC, NPV > 0 and minimum DSCR > 1.20
/// * `Borderline`: IRR > WACC, NPV > 0 and 1.00 <= minimum DSCR <= 1.20
/// * `NotBankable`: anything else, including an undefined IRR or DSCR
pub fn classify(
    project_npv: Money,
    project_irr: Option<Rate>,
    wacc: Rate,
    minimum_dscr: Option<Ratio>,
) -> BankabilityAssessment {
    let mut issues = Vec::new();

    let irr_ok = match project_irr {
        Some(irr) if irr > wacc => true,
        Some(_) => {
            issues.push(BankabilityIssue::IrrNotAboveWacc);
            false
        }
        None => {
            issues.push(BankabilityIssue::IrrUndefined);
            false
        }
    };

    let npv_ok = project_npv > Decimal::ZERO;
    if !npv_ok {
        issues.push(BankabilityIssue::NpvNotPositive);
    }

    let dscr_tier = match minimum_dscr {
        Some(d) if d > BANKABLE_MIN_DSCR => BankabilityTier::Bankable,
        Some(d) if d >= DSCR_FLOOR => {
            issues.push(BankabilityIssue::DscrWithinBorderlineBand);
            BankabilityTier::Borderline
        }
        Some(_) => {
            issues.push(BankabilityIssue::DscrBelowFloor);
            BankabilityTier::NotBankable
        }
        None => {
            issues.push(BankabilityIssue::DscrUndefined);
            BankabilityTier::NotBankable
        }
    };

    let tier = if irr_ok && npv_ok {
        dscr_tier
    } else {
        BankabilityTier::NotBankable
    };

    BankabilityAssessment { tier, issues }
}
