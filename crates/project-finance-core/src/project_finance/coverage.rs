use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cash_flows::YearRecord;
use crate::time_value::overflow;
use crate::types::Ratio;
use crate::ProjectFinanceResult;

/// DSCR for one operation year. `dscr` is `None` when no debt service falls
/// due, so the ratio is undefined rather than infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DscrYear {
    pub year: u32,
    pub dscr: Option<Ratio>,
}

/// Per-year DSCRs and their aggregates over the defined entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub by_year: Vec<DscrYear>,
    pub average_dscr: Option<Ratio>,
    pub minimum_dscr: Option<Ratio>,
}

/// DSCR = operating cash flow / debt service, over operation years only.
pub fn compute_coverage(years: &[YearRecord]) -> ProjectFinanceResult<CoverageSummary> {
    let by_year = years
        .iter()
        .filter(|y| y.is_operation())
        .map(|y| {
            let dscr = if y.debt_service.is_zero() {
                None
            } else {
                let ratio = y
                    .operating_cash_flow
                    .checked_div(y.debt_service)
                    .ok_or_else(|| overflow(&format!("DSCR for year {}", y.year)))?;
                Some(ratio)
            };
            Ok(DscrYear { year: y.year, dscr })
        })
        .collect::<ProjectFinanceResult<Vec<DscrYear>>>()?;

    let defined: Vec<Ratio> = by_year.iter().filter_map(|d| d.dscr).collect();

    let average_dscr = if defined.is_empty() {
        None
    } else {
        let sum = defined
            .iter()
            .try_fold(Decimal::ZERO, |acc, d| acc.checked_add(*d))
            .ok_or_else(|| overflow("average DSCR"))?;
        Some(sum / Decimal::from(defined.len() as i64))
    };
    let minimum_dscr = defined.iter().copied().min();

    Ok(CoverageSummary {
        by_year,
        average_dscr,
        minimum_dscr,
    })
}
