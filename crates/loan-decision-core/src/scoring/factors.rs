use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decision::classifier::ProbabilityThresholds;
use crate::{types::*, LoanDecisionError, LoanResult};

// ---------------------------------------------------------------------------
// Tier tables
// ---------------------------------------------------------------------------

// Points per tier, strongest first.
pub const INCOME_POINTS: [u32; 3] = [30, 20, 10];
pub const EXPENSE_POINTS: [u32; 3] = [30, 15, 5];
pub const BURDEN_POINTS: [u32; 3] = [30, 15, 5];

pub const MIN_TOTAL_POINTS: u32 = 20;
pub const MAX_TOTAL_POINTS: u32 = 90;

/// Tier boundaries for the three-factor heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorTiers {
    /// Income at or above this is "strong".
    pub income_strong: Money,
    /// Income at or above this is "moderate".
    pub income_moderate: Money,
    /// Expense ratio strictly below this is "low".
    pub expense_low: Ratio,
    /// Expense ratio strictly below this is "moderate".
    pub expense_moderate: Ratio,
    /// Payment burden strictly below this is "healthy".
    pub burden_low: Ratio,
    /// Payment burden strictly below this is "manageable".
    pub burden_moderate: Ratio,
}

impl Default for FactorTiers {
    fn default() -> Self {
        FactorTiers {
            income_strong: dec!(50_000),
            income_moderate: dec!(30_000),
            expense_low: dec!(0.4),
            expense_moderate: dec!(0.7),
            burden_low: dec!(0.3),
            burden_moderate: dec!(0.5),
        }
    }
}

impl FactorTiers {
    pub fn validate(&self) -> LoanResult<()> {
        if self.income_moderate > self.income_strong {
            return Err(LoanDecisionError::invalid(
                "income_moderate",
                "Moderate income tier cannot exceed the strong tier.",
            ));
        }
        if self.expense_low > self.expense_moderate {
            return Err(LoanDecisionError::invalid(
                "expense_low",
                "Low expense tier cannot exceed the moderate tier.",
            ));
        }
        if self.burden_low > self.burden_moderate {
            return Err(LoanDecisionError::invalid(
                "burden_low",
                "Low burden tier cannot exceed the moderate tier.",
            ));
        }
        Ok(())
    }

    pub fn income_tier(&self, income: Money) -> RiskTier {
        if income >= self.income_strong {
            RiskTier::Low
        } else if income >= self.income_moderate {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn expense_tier(&self, expense_ratio: Ratio) -> RiskTier {
        below_tier(expense_ratio, self.expense_low, self.expense_moderate)
    }

    pub fn burden_tier(&self, burden_ratio: Ratio) -> RiskTier {
        below_tier(burden_ratio, self.burden_low, self.burden_moderate)
    }
}

/// Settings for the `SimpleFactorBased` scoring policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorPolicy {
    pub tiers: FactorTiers,
    pub thresholds: ProbabilityThresholds,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    IncomeStrength,
    ExpenseRatio,
    PaymentBurden,
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncomeStrength => write!(f, "Income Strength"),
            Self::ExpenseRatio => write!(f, "Expense Ratio"),
            Self::PaymentBurden => write!(f, "Payment Burden"),
        }
    }
}

/// Tier 1 is lowest risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    fn index(self) -> usize {
        match self {
            RiskTier::Low => 0,
            RiskTier::Medium => 1,
            RiskTier::High => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: Factor,
    /// Income itself for the income factor, otherwise the ratio to income.
    pub ratio: Decimal,
    pub tier: RiskTier,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub income: FactorScore,
    pub expense: FactorScore,
    pub burden: FactorScore,
    pub total_points: u32,
    /// `total_points / 90 * 100`, clamped to [0, 100], unrounded.
    pub probability: Percent,
}

impl ScoreBreakdown {
    /// Factors in evaluation order.
    pub fn factors(&self) -> [&FactorScore; 3] {
        [&self.income, &self.expense, &self.burden]
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score income strength, expense ratio and payment burden.
pub fn score_factors(
    income: Money,
    expenses: Money,
    payment: Money,
    tiers: &FactorTiers,
) -> LoanResult<ScoreBreakdown> {
    validate_amounts(income, expenses, payment)?;

    let expense_ratio = ratio_to_income(expenses, income, "expenses", "Expense ratio")?;
    let burden_ratio = ratio_to_income(payment, income, "principal", "Payment burden")?;

    let income_tier = tiers.income_tier(income);
    let expense_tier = tiers.expense_tier(expense_ratio);
    let burden_tier = tiers.burden_tier(burden_ratio);

    let income_score = FactorScore {
        factor: Factor::IncomeStrength,
        ratio: income,
        tier: income_tier,
        points: INCOME_POINTS[income_tier.index()],
    };
    let expense_score = FactorScore {
        factor: Factor::ExpenseRatio,
        ratio: expense_ratio,
        tier: expense_tier,
        points: EXPENSE_POINTS[expense_tier.index()],
    };
    let burden_score = FactorScore {
        factor: Factor::PaymentBurden,
        ratio: burden_ratio,
        tier: burden_tier,
        points: BURDEN_POINTS[burden_tier.index()],
    };

    let total_points = income_score.points + expense_score.points + burden_score.points;

    Ok(ScoreBreakdown {
        income: income_score,
        expense: expense_score,
        burden: burden_score,
        total_points,
        probability: normalize_points(total_points),
    })
}

/// Map points onto a 0-100 probability. Never reports above 100.
pub fn normalize_points(total_points: u32) -> Percent {
    let raw = Decimal::from(total_points) * dec!(100) / Decimal::from(MAX_TOTAL_POINTS);
    raw.clamp(Decimal::ZERO, dec!(100))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Declared income must be positive and expenses non-negative.
pub(crate) fn validate_finances(income: Money, expenses: Money) -> LoanResult<()> {
    if income <= Decimal::ZERO {
        return Err(LoanDecisionError::invalid(
            "income",
            "Income must be positive.",
        ));
    }
    if expenses < Decimal::ZERO {
        return Err(LoanDecisionError::invalid(
            "expenses",
            "Expenses cannot be negative.",
        ));
    }
    Ok(())
}

pub(crate) fn validate_amounts(income: Money, expenses: Money, payment: Money) -> LoanResult<()> {
    validate_finances(income, expenses)?;
    if payment < Decimal::ZERO {
        return Err(LoanDecisionError::invalid(
            "periodicPayment",
            "Periodic payment cannot be negative.",
        ));
    }
    Ok(())
}

/// `amount / income`, failing on `field` when the quotient overflows.
pub(crate) fn ratio_to_income(
    amount: Money,
    income: Money,
    field: &str,
    label: &str,
) -> LoanResult<Ratio> {
    amount
        .checked_div(income)
        .ok_or_else(|| LoanDecisionError::too_large(field, label))
}

fn below_tier(ratio: Ratio, low: Ratio, moderate: Ratio) -> RiskTier {
    if ratio < low {
        RiskTier::Low
    } else if ratio < moderate {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
