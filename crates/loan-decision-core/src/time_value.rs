use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanDecisionError;
use crate::types::{validate_credit_score, CreditScore, Money, Rate, TermUnit};
use crate::LoanResult;

pub const MONTHS_PER_YEAR: u32 = 12;

/// How the annual interest rate of a loan is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatePolicy {
    /// Same rate for every applicant.
    Fixed { annual_rate: Rate },
    /// `base_rate + (1 - score / max_score) * spread`; lower scores pay more.
    Scored {
        base_rate: Rate,
        spread: Rate,
        max_score: CreditScore,
    },
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::simulator()
    }
}

impl RatePolicy {
    /// Flat 10% used for anonymous simulations.
    pub fn simulator() -> Self {
        RatePolicy::Fixed {
            annual_rate: dec!(0.10),
        }
    }

    /// 5% floor plus up to 10% for weaker credit.
    pub fn member() -> Self {
        RatePolicy::Scored {
            base_rate: dec!(0.05),
            spread: dec!(0.10),
            max_score: 850,
        }
    }

    pub fn uses_credit_score(&self) -> bool {
        matches!(self, RatePolicy::Scored { .. })
    }

    pub fn validate(&self) -> LoanResult<()> {
        match self {
            RatePolicy::Fixed { annual_rate } => {
                if *annual_rate < Decimal::ZERO {
                    return Err(LoanDecisionError::invalid(
                        "annual_rate",
                        "Annual rate cannot be negative.",
                    ));
                }
            }
            RatePolicy::Scored {
                base_rate,
                spread,
                max_score,
            } => {
                if *base_rate < Decimal::ZERO {
                    return Err(LoanDecisionError::invalid(
                        "base_rate",
                        "Base rate cannot be negative.",
                    ));
                }
                if *spread < Decimal::ZERO {
                    return Err(LoanDecisionError::invalid(
                        "spread",
                        "Spread cannot be negative.",
                    ));
                }
                if *max_score == 0 {
                    return Err(LoanDecisionError::invalid(
                        "max_score",
                        "Maximum credit score must be positive.",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Annual rate for an applicant. The scored policy requires a credit score
    /// inside the bureau range and no higher than `max_score`.
    pub fn annual_rate(&self, credit_score: Option<CreditScore>) -> LoanResult<Rate> {
        self.validate()?;
        match self {
            RatePolicy::Fixed { annual_rate } => Ok(*annual_rate),
            RatePolicy::Scored {
                base_rate,
                spread,
                max_score,
            } => {
                let score = credit_score.ok_or_else(|| {
                    LoanDecisionError::invalid(
                        "creditScore",
                        "A credit score is required by the scored rate policy.",
                    )
                })?;
                let score = validate_credit_score(score)?;
                if score > *max_score {
                    return Err(LoanDecisionError::invalid(
                        "creditScore",
                        "Credit score exceeds the policy maximum.",
                    ));
                }
                let standing = Decimal::from(score) / Decimal::from(*max_score);
                (Decimal::ONE - standing)
                    .checked_mul(*spread)
                    .and_then(|premium| base_rate.checked_add(premium))
                    .ok_or_else(|| LoanDecisionError::too_large("spread", "Scored rate"))
            }
        }
    }
}

/// Per-period rate from an annual rate.
pub fn periodic_rate(annual_rate: Rate, periods_per_year: u32) -> LoanResult<Rate> {
    if periods_per_year == 0 {
        return Err(LoanDecisionError::invalid(
            "periods_per_year",
            "Periods per year must be > 0",
        ));
    }
    Ok(annual_rate / Decimal::from(periods_per_year))
}

/// Number of payment periods for a term.
pub fn total_periods(term: u32, unit: TermUnit, periods_per_year: u32) -> LoanResult<u32> {
    let periods = match unit {
        TermUnit::Months => Some(term),
        TermUnit::Years => term.checked_mul(periods_per_year),
    };
    match periods {
        Some(n) if n > 0 => Ok(n),
        Some(_) => Err(LoanDecisionError::invalid(
            "termPeriods",
            "Number of periods must be > 0",
        )),
        None => Err(LoanDecisionError::invalid(
            "termPeriods",
            "Term is too long to amortize.",
        )),
    }
}

/// Fixed periodic payment that fully amortizes `principal` over `periods`.
///
/// Annuity formula `P * r / (1 - (1+r)^-n)`, or `P / n` when the rate is
/// zero. The result is unrounded. Amounts whose payment cannot be held in a
/// `Decimal` fail with `InvalidInput` on `principal`.
pub fn amortized_payment(principal: Money, rate: Rate, periods: u32) -> LoanResult<Money> {
    if periods == 0 {
        return Err(LoanDecisionError::invalid(
            "termPeriods",
            "Number of periods must be > 0",
        ));
    }
    if principal <= Decimal::ZERO {
        return Err(LoanDecisionError::invalid(
            "principal",
            "Principal must be positive.",
        ));
    }
    if rate < Decimal::ZERO {
        return Err(LoanDecisionError::invalid(
            "rate",
            "Periodic rate cannot be negative.",
        ));
    }

    let n = Decimal::from(periods);
    if rate.is_zero() {
        return Ok(principal / n);
    }

    // A factor past Decimal::MAX discounts to below the smallest
    // representable fraction, so the payment tends to interest-only.
    let growth = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| LoanDecisionError::too_large("rate", "Periodic rate"))?;
    let discount = growth
        .checked_powi(i64::from(periods))
        .and_then(|factor| Decimal::ONE.checked_div(factor))
        .unwrap_or(Decimal::ZERO);
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        // rate too small to register at 28 digits
        return Ok(principal / n);
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| LoanDecisionError::too_large("principal", "Principal"))
}
