use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::scoring::affordability::{
    adjust_for_credit_score, AffordabilityMetrics, AffordabilityPolicy, CreditAdjustment,
};
use crate::{types::*, LoanDecisionError, LoanResult};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Rejected,
}

impl ApprovalStatus {
    /// Applicant-facing likelihood wording.
    pub fn likelihood(&self) -> &'static str {
        match self {
            Self::Approved => "Highly Likely",
            Self::Pending => "Possible",
            Self::Rejected => "Unlikely",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "Approved"),
            Self::Pending => write!(f, "Pending"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Percent cut-offs for the factor-scoring policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityThresholds {
    /// At or above: approved.
    pub approve: Percent,
    /// At or above (and below `approve`): pending.
    pub possible: Percent,
}

impl Default for ProbabilityThresholds {
    fn default() -> Self {
        ProbabilityThresholds {
            approve: dec!(70),
            possible: dec!(40),
        }
    }
}

impl ProbabilityThresholds {
    pub fn validate(&self) -> LoanResult<()> {
        let hundred = dec!(100);
        if self.possible < Decimal::ZERO || self.approve > hundred {
            return Err(LoanDecisionError::invalid(
                "thresholds",
                "Thresholds must lie between 0 and 100.",
            ));
        }
        if self.possible > self.approve {
            return Err(LoanDecisionError::invalid(
                "thresholds",
                "The possible threshold cannot exceed the approve threshold.",
            ));
        }
        Ok(())
    }
}

/// Result of the credit-score-aware tier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityDecision {
    pub metrics: AffordabilityMetrics,
    pub credit_score: CreditScore,
    /// 1-based row of the tier table, `None` for the fallback.
    pub matched_tier: Option<u32>,
    /// Probability of the matched row before any credit adjustment.
    pub tier_probability: Rate,
    pub adjustment: CreditAdjustment,
    /// Post-adjustment, rounded to 2 dp, as a fraction.
    pub probability: Rate,
    pub status: ApprovalStatus,
}

impl AffordabilityDecision {
    /// Probability on the 0-100 scale used everywhere else.
    pub fn probability_percent(&self) -> Percent {
        self.probability * dec!(100)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify a 0-100 probability against the factor-policy thresholds.
pub fn classify_probability(
    probability: Percent,
    thresholds: &ProbabilityThresholds,
) -> ApprovalStatus {
    if probability >= thresholds.approve {
        ApprovalStatus::Approved
    } else if probability >= thresholds.possible {
        ApprovalStatus::Pending
    } else {
        ApprovalStatus::Rejected
    }
}

/// Walk the tier table (disposable cover AND score floor AND DTI ceiling),
/// then apply the credit-score adjustment. A subprime applicant whose
/// adjusted probability drops below the reject floor is rejected outright.
pub fn classify_affordability(
    metrics: &AffordabilityMetrics,
    credit_score: CreditScore,
    policy: &AffordabilityPolicy,
) -> LoanResult<AffordabilityDecision> {
    validate_credit_score(credit_score)?;

    let matched = policy.tiers.iter().enumerate().find(|(_, tier)| {
        metrics.covers(tier.disposable_multiple)
            && credit_score >= tier.min_credit_score
            && metrics.debt_to_income < tier.max_debt_to_income
    });

    let (matched_tier, tier_probability, tier_status) = match matched {
        Some((idx, tier)) => (Some(idx as u32 + 1), tier.probability, tier.status),
        None => (None, policy.fallback_probability, ApprovalStatus::Rejected),
    };

    let (probability, adjustment) = adjust_for_credit_score(tier_probability, credit_score, policy);

    let status = if adjustment == CreditAdjustment::Subprime
        && probability < policy.subprime_reject_below
    {
        ApprovalStatus::Rejected
    } else {
        tier_status
    };

    Ok(AffordabilityDecision {
        metrics: metrics.clone(),
        credit_score,
        matched_tier,
        tier_probability,
        adjustment,
        probability,
        status,
    })
}
