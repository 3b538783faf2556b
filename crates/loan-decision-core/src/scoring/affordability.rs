//! Credit-score-aware affordability inputs.
//!
//! The tier table itself is applied by
//! [`classify_affordability`](crate::decision::classifier::classify_affordability);
//! this module owns the policy values, the affordability ratios and the
//! credit-score adjustment applied after a tier is chosen.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decision::classifier::ApprovalStatus;
use crate::scoring::factors::{ratio_to_income, validate_amounts};
use crate::{types::*, LoanDecisionError, LoanResult};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// One row of the tier table. All three conditions must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityTier {
    /// Disposable income must be strictly greater than payment times this.
    pub disposable_multiple: Multiple,
    /// Credit score must be at least this.
    pub min_credit_score: CreditScore,
    /// Payment / income must be strictly below this.
    pub max_debt_to_income: Ratio,
    pub status: ApprovalStatus,
    /// Probability as a fraction (0.95 = 95%).
    pub probability: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityPolicy {
    /// Evaluated in order; the first match wins.
    pub tiers: Vec<AffordabilityTier>,
    pub fallback_probability: Rate,
    /// Scores strictly below this have their probability scaled down.
    pub subprime_below: CreditScore,
    pub subprime_multiplier: Multiple,
    /// A subprime-adjusted probability below this forces a rejection.
    pub subprime_reject_below: Rate,
    /// Scores strictly above this have their probability scaled up.
    pub prime_above: CreditScore,
    pub prime_multiplier: Multiple,
    pub probability_cap: Rate,
}

impl Default for AffordabilityPolicy {
    fn default() -> Self {
        AffordabilityPolicy {
            tiers: vec![
                AffordabilityTier {
                    disposable_multiple: dec!(1.5),
                    min_credit_score: 700,
                    max_debt_to_income: dec!(0.30),
                    status: ApprovalStatus::Approved,
                    probability: dec!(0.95),
                },
                AffordabilityTier {
                    disposable_multiple: dec!(1.2),
                    min_credit_score: 640,
                    max_debt_to_income: dec!(0.40),
                    status: ApprovalStatus::Approved,
                    probability: dec!(0.75),
                },
                AffordabilityTier {
                    disposable_multiple: dec!(1.0),
                    min_credit_score: 580,
                    max_debt_to_income: dec!(0.50),
                    status: ApprovalStatus::Pending,
                    probability: dec!(0.50),
                },
            ],
            fallback_probability: dec!(0.20),
            subprime_below: 580,
            subprime_multiplier: dec!(0.5),
            subprime_reject_below: dec!(0.30),
            prime_above: 750,
            prime_multiplier: dec!(1.2),
            probability_cap: dec!(0.99),
        }
    }
}

impl AffordabilityPolicy {
    pub fn validate(&self) -> LoanResult<()> {
        let in_unit = |p: Rate| p >= Decimal::ZERO && p <= Decimal::ONE;
        if !self.tiers.iter().all(|t| in_unit(t.probability)) || !in_unit(self.fallback_probability)
        {
            return Err(LoanDecisionError::invalid(
                "probability",
                "Tier probabilities must lie between 0 and 1.",
            ));
        }
        if !in_unit(self.probability_cap) {
            return Err(LoanDecisionError::invalid(
                "probability_cap",
                "Probability cap must lie between 0 and 1.",
            ));
        }
        if self.subprime_multiplier < Decimal::ZERO {
            return Err(LoanDecisionError::invalid(
                "subprime_multiplier",
                "Subprime multiplier cannot be negative.",
            ));
        }
        if self.prime_multiplier < Decimal::ZERO {
            return Err(LoanDecisionError::invalid(
                "prime_multiplier",
                "Prime multiplier cannot be negative.",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityMetrics {
    pub disposable_income: Money,
    pub debt_to_income: Ratio,
    pub periodic_payment: Money,
}

impl AffordabilityMetrics {
    /// Whether disposable income covers the payment more than `multiple` times.
    pub fn covers(&self, multiple: Multiple) -> bool {
        self.disposable_income > self.periodic_payment.saturating_mul(multiple)
    }
}

pub fn affordability_metrics(
    income: Money,
    expenses: Money,
    payment: Money,
) -> LoanResult<AffordabilityMetrics> {
    validate_amounts(income, expenses, payment)?;
    Ok(AffordabilityMetrics {
        disposable_income: income - expenses,
        debt_to_income: ratio_to_income(payment, income, "principal", "Debt-to-income ratio")?,
        periodic_payment: payment,
    })
}

// ---------------------------------------------------------------------------
// Credit-score adjustment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditAdjustment {
    None,
    Subprime,
    Prime,
}

/// Scale a tier probability by credit standing and round it to 2 dp.
pub fn adjust_for_credit_score(
    probability: Rate,
    credit_score: CreditScore,
    policy: &AffordabilityPolicy,
) -> (Rate, CreditAdjustment) {
    let (adjusted, adjustment) = if credit_score < policy.subprime_below {
        (probability * policy.subprime_multiplier, CreditAdjustment::Subprime)
    } else if credit_score > policy.prime_above {
        (
            (probability * policy.prime_multiplier).min(policy.probability_cap),
            CreditAdjustment::Prime,
        )
    } else {
        (probability, CreditAdjustment::None)
    };

    (
        adjusted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        adjustment,
    )
}
