pub mod affordability;
pub mod factors;

use serde::{Deserialize, Serialize};

use crate::LoanResult;

pub use affordability::AffordabilityPolicy;
pub use factors::{FactorPolicy, FactorTiers, ScoreBreakdown};

/// Which heuristic turns a payment into an approval decision.
///
/// The two variants carry unrelated thresholds and are never blended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Three tiered factors summed into points out of 90.
    SimpleFactorBased(FactorPolicy),
    /// Disposable income, credit score and DTI tiers with credit adjustment.
    CreditScoreAware(AffordabilityPolicy),
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::SimpleFactorBased(FactorPolicy::default())
    }
}

impl ScoringPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ScoringPolicy::SimpleFactorBased(_) => "simple_factor_based",
            ScoringPolicy::CreditScoreAware(_) => "credit_score_aware",
        }
    }

    pub fn uses_credit_score(&self) -> bool {
        matches!(self, ScoringPolicy::CreditScoreAware(_))
    }

    pub fn validate(&self) -> LoanResult<()> {
        match self {
            ScoringPolicy::SimpleFactorBased(p) => {
                p.tiers.validate()?;
                p.thresholds.validate()
            }
            ScoringPolicy::CreditScoreAware(p) => p.validate(),
        }
    }
}
