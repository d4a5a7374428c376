use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ProjectFinanceError;
use crate::types::{Money, Rate};
use crate::ProjectFinanceResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 200;
const RATE_FLOOR: Decimal = dec!(-0.99);
const RATE_CEILING: Decimal = dec!(100);

/// Candidate rates probed when Newton-Raphson fails and a bracket is needed.
const BRACKET_GRID: [Decimal; 21] = [
    dec!(-0.99),
    dec!(-0.9),
    dec!(-0.75),
    dec!(-0.5),
    dec!(-0.25),
    dec!(0),
    dec!(0.05),
    dec!(0.1),
    dec!(0.2),
    dec!(0.35),
    dec!(0.5),
    dec!(0.75),
    dec!(1),
    dec!(1.5),
    dec!(2),
    dec!(3),
    dec!(5),
    dec!(10),
    dec!(25),
    dec!(50),
    dec!(100),
];

/// Net Present Value of a series of cash flows.
///
/// The first flow sits at t=0 and is not discounted; flow `t` is divided by
/// `(1 + rate)^t`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ProjectFinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(ProjectFinanceError::InvalidAssumptions {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| overflow("NPV discount rate"))?;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                // Remaining terms are below decimal precision
                None => break,
            };
        }
        if discount.is_zero() {
            return Err(ProjectFinanceError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result = cf
            .checked_div(discount)
            .and_then(|pv| result.checked_add(pv))
            .ok_or_else(|| overflow(&format!("NPV at period {t}")))?;
    }

    Ok(result)
}

/// True when the series holds at least one strictly positive and one strictly
/// negative flow. Without that no real discount rate can zero its NPV.
pub fn has_sign_change(cash_flows: &[Money]) -> bool {
    let has_positive = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_negative = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    has_positive && has_negative
}

/// Internal Rate of Return.
///
/// Newton-Raphson from `guess`; when that fails to converge the root is
/// bracketed on a fixed grid of rates and refined by bisection. A series that
/// never changes sign yields `UnsolvableReturn`.
pub fn irr(cash_flows: &[Money], guess: Rate) -> ProjectFinanceResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(ProjectFinanceError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    if !has_sign_change(cash_flows) {
        return Err(ProjectFinanceError::UnsolvableReturn {
            series: "cash flows".into(),
            reason: "series never changes sign, so no rate zeroes its NPV".into(),
        });
    }

    if let Some(rate) = newton_irr(cash_flows, guess) {
        return Ok(rate);
    }

    log::debug!("IRR: Newton-Raphson did not converge from {guess}, falling back to bisection");
    bisection_irr(cash_flows)
}

/// Payment (PMT) with the spreadsheet sign convention: a positive present
/// value (cash received) gives a negative payment.
///
/// Evaluated as `-(pv + fv * v) * r / (1 - v)` with `v = (1 + r)^-n`. When
/// `(1 + r)^n` leaves the decimal range `v` is below precision and the payment
/// is the interest-only limit `-pv * r`.
pub fn pmt(
    rate: Rate,
    nper: u32,
    present_value: Money,
    future_value: Money,
) -> ProjectFinanceResult<Money> {
    if nper == 0 {
        return Err(ProjectFinanceError::InvalidAssumptions {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / Decimal::from(nper));
    }

    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| overflow("PMT rate"))?;
    let discount = match one_plus_r.checked_powu(u64::from(nper)) {
        Some(factor) if factor.is_zero() => {
            return Err(ProjectFinanceError::DivisionByZero {
                context: "PMT compounding factor".into(),
            })
        }
        Some(factor) => Decimal::ONE
            .checked_div(factor)
            .ok_or_else(|| overflow("PMT discount factor"))?,
        None => Decimal::ZERO,
    };

    let annuity = Decimal::ONE - discount;
    if annuity.is_zero() {
        return Err(ProjectFinanceError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    future_value
        .checked_mul(discount)
        .and_then(|fv| present_value.checked_add(fv))
        .and_then(|v| v.checked_mul(rate))
        .and_then(|v| v.checked_div(annuity))
        .map(|v| -v)
        .ok_or_else(|| overflow("PMT payment"))
}

pub(crate) fn overflow(context: &str) -> ProjectFinanceError {
    ProjectFinanceError::Overflow {
        context: context.into(),
    }
}

// ---------------------------------------------------------------------------
// Solver internals
// ---------------------------------------------------------------------------

/// NPV and its first derivative with respect to the rate. `None` when the
/// discount factors leave the representable decimal range.
fn npv_and_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                None => break,
            };
        }
        if discount.is_zero() {
            return None;
        }
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            let t_dec = Decimal::from(t as i64);
            let denom = discount.checked_mul(one_plus_r)?;
            dnpv = dnpv.checked_sub(t_dec.checked_mul(*cf)?.checked_div(denom)?)?;
        }
    }

    Some((npv_val, dnpv))
}

fn newton_irr(cash_flows: &[Money], guess: Rate) -> Option<Rate> {
    let mut rate = guess;

    for _ in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = npv_and_derivative(rate, cash_flows)?;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Some(rate);
        }

        if dnpv.is_zero() {
            return None;
        }

        rate = rate.checked_sub(npv_val.checked_div(dnpv)?)?;

        // Guard against divergence
        if rate < RATE_FLOOR {
            rate = RATE_FLOOR;
        } else if rate > RATE_CEILING {
            rate = RATE_CEILING;
        }
    }

    None
}

fn bisection_irr(cash_flows: &[Money]) -> ProjectFinanceResult<Rate> {
    let samples: Vec<(Rate, Decimal)> = BRACKET_GRID
        .iter()
        .filter_map(|r| npv_and_derivative(*r, cash_flows).map(|(v, _)| (*r, v)))
        .collect();

    if let Some((r, _)) = samples.iter().find(|(_, v)| v.is_zero()) {
        return Ok(*r);
    }

    // Among all sign-changing brackets prefer the one closest to zero
    let bracket = samples
        .windows(2)
        .filter(|w| (w[0].1 < Decimal::ZERO) != (w[1].1 < Decimal::ZERO))
        .min_by_key(|w| ((w[0].0 + w[1].0) / dec!(2)).abs())
        .map(|w| (w[0], w[1]));

    let ((mut lo, mut f_lo), (mut hi, _)) = match bracket {
        Some(b) => b,
        None => {
            return Err(ProjectFinanceError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: 0,
                last_delta: samples.first().map(|(_, v)| *v).unwrap_or(Decimal::MAX),
            })
        }
    };

    let mut last_delta = f_lo;
    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let (f_mid, _) = match npv_and_derivative(mid, cash_flows) {
            Some(v) => v,
            None => break,
        };
        last_delta = f_mid;

        if f_mid.abs() < CONVERGENCE_THRESHOLD || (hi - lo).abs() < CONVERGENCE_THRESHOLD {
            return Ok(mid);
        }

        if (f_mid < Decimal::ZERO) == (f_lo < Decimal::ZERO) {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Err(ProjectFinanceError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta,
    })
}
