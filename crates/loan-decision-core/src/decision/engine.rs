use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::decision::classifier::{
    classify_affordability, classify_probability, AffordabilityDecision, ApprovalStatus,
};
use crate::explanation::{explain_affordability, explain_factors, ExplanationEntry};
use crate::scoring::affordability::affordability_metrics;
use crate::scoring::factors::{score_factors, validate_finances, ScoreBreakdown};
use crate::scoring::{AffordabilityPolicy, FactorPolicy, ScoringPolicy};
use crate::time_value::{amortized_payment, periodic_rate, total_periods, RatePolicy, MONTHS_PER_YEAR};
use crate::{types::*, LoanDecisionError, LoanResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rate_policy: RatePolicy,
    pub scoring_policy: ScoringPolicy,
    pub periods_per_year: u32,
    /// Unit applied when a query does not name one.
    pub term_unit: TermUnit,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::simulator()
    }
}

impl EngineConfig {
    /// Anonymous simulator: fixed 10%, factor scoring, term in months.
    pub fn simulator() -> Self {
        EngineConfig {
            rate_policy: RatePolicy::simulator(),
            scoring_policy: ScoringPolicy::SimpleFactorBased(FactorPolicy::default()),
            periods_per_year: MONTHS_PER_YEAR,
            term_unit: TermUnit::Months,
        }
    }

    /// Signed-in member: score-priced rate, credit-aware scoring, term in years.
    pub fn member() -> Self {
        EngineConfig {
            rate_policy: RatePolicy::member(),
            scoring_policy: ScoringPolicy::CreditScoreAware(AffordabilityPolicy::default()),
            periods_per_year: MONTHS_PER_YEAR,
            term_unit: TermUnit::Years,
        }
    }

    pub fn validate(&self) -> LoanResult<()> {
        if self.periods_per_year == 0 {
            return Err(LoanDecisionError::invalid(
                "periods_per_year",
                "Periods per year must be > 0",
            ));
        }
        self.rate_policy.validate()?;
        self.scoring_policy.validate()
    }

    pub fn uses_credit_score(&self) -> bool {
        self.rate_policy.uses_credit_score() || self.scoring_policy.uses_credit_score()
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuery {
    pub income: Money,
    pub expenses: Money,
    pub principal: Money,
    pub term: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_unit: Option<TermUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<CreditScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDecisionOutput {
    pub policy: String,
    pub annual_rate: Rate,
    pub periodic_rate: Rate,
    pub periods: u32,
    /// Unrounded; format at the boundary.
    pub periodic_payment: Money,
    pub total_repayment: Money,
    pub total_interest: Money,
    /// 0-100.
    pub approval_probability: Percent,
    pub approval_status: ApprovalStatus,
    pub verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affordability: Option<AffordabilityDecision>,
    pub explanation: Vec<ExplanationEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price, score, classify and explain a single loan request.
pub fn evaluate_loan(
    query: &LoanQuery,
    config: &EngineConfig,
) -> LoanResult<ComputationOutput<LoanDecisionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    config.validate()?;
    validate_query(query)?;

    let credit_score = query.credit_score.map(validate_credit_score).transpose()?;
    if credit_score.is_some() && !config.uses_credit_score() {
        warnings.push(
            "creditScore was provided but the selected policies do not use it.".to_string(),
        );
    }

    // -- Amortization ---------------------------------------------------------
    let term_unit = query.term_unit.unwrap_or(config.term_unit);
    let periods = total_periods(query.term, term_unit, config.periods_per_year)?;
    let annual_rate = config.rate_policy.annual_rate(credit_score)?;
    let rate = periodic_rate(annual_rate, config.periods_per_year)?;
    let payment = amortized_payment(query.principal, rate, periods)?;
    let total_repayment = payment
        .checked_mul(Decimal::from(periods))
        .ok_or_else(|| LoanDecisionError::too_large("principal", "Total repayment"))?;
    let total_interest = total_repayment
        .checked_sub(query.principal)
        .ok_or_else(|| LoanDecisionError::too_large("principal", "Total interest"))?;

    debug!(
        periods,
        annual_rate = %annual_rate,
        payment = %payment,
        policy = config.scoring_policy.name(),
        "amortized payment"
    );

    if query.expenses > query.income {
        warnings.push("Declared expenses exceed declared income.".to_string());
    }
    if payment > query.income - query.expenses {
        warnings.push("Periodic payment exceeds disposable income.".to_string());
    }

    // -- Scoring, classification, explanation ---------------------------------
    let (probability, status, verdict, score, affordability, explanation) =
        match &config.scoring_policy {
            ScoringPolicy::SimpleFactorBased(policy) => {
                let breakdown =
                    score_factors(query.income, query.expenses, payment, &policy.tiers)?;
                let status = classify_probability(breakdown.probability, &policy.thresholds);
                let explanation = explain_factors(&breakdown);
                (
                    breakdown.probability,
                    status,
                    status.likelihood().to_string(),
                    Some(breakdown),
                    None,
                    explanation,
                )
            }
            ScoringPolicy::CreditScoreAware(policy) => {
                let score = credit_score.ok_or_else(|| {
                    LoanDecisionError::invalid(
                        "creditScore",
                        "A credit score is required by the credit-score-aware policy.",
                    )
                })?;
                let metrics = affordability_metrics(query.income, query.expenses, payment)?;
                let decision = classify_affordability(&metrics, score, policy)?;
                let explanation = explain_affordability(&decision, policy);
                (
                    decision.probability_percent(),
                    decision.status,
                    decision.status.to_string(),
                    None,
                    Some(decision),
                    explanation,
                )
            }
        };

    for warning in &warnings {
        warn!("{warning}");
    }
    debug!(
        probability = %probability,
        status = %status,
        "loan classified"
    );

    let output = LoanDecisionOutput {
        policy: config.scoring_policy.name().to_string(),
        annual_rate,
        periodic_rate: rate,
        periods,
        periodic_payment: payment,
        total_repayment,
        total_interest,
        approval_probability: probability,
        approval_status: status,
        verdict,
        score,
        affordability,
        explanation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "rate_policy": config.rate_policy,
        "scoring_policy": config.scoring_policy.name(),
        "periods_per_year": config.periods_per_year,
        "term_unit": term_unit.to_string(),
        "payment_formula": "P * r / (1 - (1+r)^-n)",
    });

    Ok(with_metadata(
        "Amortized loan affordability and approval decision",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_query(query: &LoanQuery) -> LoanResult<()> {
    validate_finances(query.income, query.expenses)?;
    if query.principal <= Decimal::ZERO {
        return Err(LoanDecisionError::invalid(
            "principal",
            "Principal must be positive.",
        ));
    }
    if query.term == 0 {
        return Err(LoanDecisionError::invalid(
            "termPeriods",
            "Term must be a positive integer.",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn query(income: Decimal, expenses: Decimal, principal: Decimal, term: u32) -> LoanQuery {
        LoanQuery {
            income,
            expenses,
            principal,
            term,
            term_unit: None,
            credit_score: None,
        }
    }

    #[test]
    fn test_simulator_strong_applicant() {
        let q = query(dec!(50_000), dec!(10_000), dec!(100_000), 12);
        let result = evaluate_loan(&q, &EngineConfig::simulator()).unwrap();
        let out = &result.result;
        assert_eq!(out.periods, 12);
        assert_eq!(format_money(out.periodic_payment), "8791.59");
        assert_eq!(out.approval_probability, dec!(100));
        assert_eq!(out.approval_status, ApprovalStatus::Approved);
        assert_eq!(out.verdict, "Highly Likely");
        assert_eq!(out.score.as_ref().unwrap().total_points, 90);
        assert!(out.affordability.is_none());
        assert_eq!(out.explanation.len(), 3);
    }

    #[test]
    fn test_total_interest() {
        let q = query(dec!(50_000), dec!(10_000), dec!(12_000), 12);
        let config = EngineConfig {
            rate_policy: RatePolicy::Fixed {
                annual_rate: Decimal::ZERO,
            },
            ..EngineConfig::simulator()
        };
        let out = evaluate_loan(&q, &config).unwrap().result;
        assert_eq!(out.periodic_payment, dec!(1000));
        assert_eq!(out.total_repayment, dec!(12_000));
        assert_eq!(out.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_member_requires_credit_score() {
        let q = query(dec!(50_000), dec!(10_000), dec!(100_000), 5);
        let err = evaluate_loan(&q, &EngineConfig::member()).unwrap_err();
        match err {
            LoanDecisionError::InvalidInput { field, .. } => assert_eq!(field, "creditScore"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_member_term_in_years() {
        let mut q = query(dec!(50_000), dec!(10_000), dec!(100_000), 5);
        q.credit_score = Some(720);
        let out = evaluate_loan(&q, &EngineConfig::member()).unwrap().result;
        assert_eq!(out.periods, 60);
        assert_eq!(out.policy, "credit_score_aware");
        assert_eq!(out.approval_status, ApprovalStatus::Approved);
        assert_eq!(out.approval_probability, dec!(95));
        assert_eq!(out.verdict, "Approved");
        assert_eq!(out.affordability.as_ref().unwrap().matched_tier, Some(1));
    }

    #[test]
    fn test_unused_credit_score_warns() {
        let mut q = query(dec!(50_000), dec!(10_000), dec!(100_000), 12);
        q.credit_score = Some(700);
        let result = evaluate_loan(&q, &EngineConfig::simulator()).unwrap();
        assert!(result.warnings.iter().any(|w| w.contains("creditScore")));
    }

    #[test]
    fn test_payment_above_disposable_warns() {
        let q = query(dec!(20_000), dec!(15_000), dec!(500_000), 60);
        let result = evaluate_loan(&q, &EngineConfig::simulator()).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("exceeds disposable income")));
    }

    #[test]
    fn test_long_term_tends_to_interest_only() {
        let q = query(dec!(50_000), dec!(1_000), dec!(1_000_000), 7_000);
        let out = evaluate_loan(&q, &EngineConfig::simulator()).unwrap().result;
        assert_eq!(format_money(out.periodic_payment), "8333.33");
        assert!(out.total_interest > Decimal::ZERO);
    }

    #[test]
    fn test_total_repayment_overflow_rejected() {
        let q = query(dec!(50_000), dec!(10_000), dec!(70_000_000_000_000_000_000_000_000_000), 60);
        match evaluate_loan(&q, &EngineConfig::simulator()).unwrap_err() {
            LoanDecisionError::InvalidInput { field, reason } => {
                assert_eq!(field, "principal");
                assert!(reason.contains("too large"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_expenses_rejected() {
        let q = query(dec!(50_000), dec!(-1), dec!(100_000), 12);
        match evaluate_loan(&q, &EngineConfig::simulator()).unwrap_err() {
            LoanDecisionError::InvalidInput { field, .. } => assert_eq!(field, "expenses"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_term_rejected() {
        let q = query(dec!(50_000), dec!(10_000), dec!(100_000), 0);
        assert!(evaluate_loan(&q, &EngineConfig::simulator()).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let q = query(dec!(50_000), dec!(10_000), dec!(100_000), 12);
        let config = EngineConfig {
            periods_per_year: 0,
            ..EngineConfig::simulator()
        };
        assert!(evaluate_loan(&q, &config).is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let json = serde_json::json!({
            "rate_policy": { "kind": "fixed", "annual_rate": "0.12" },
            "scoring_policy": { "kind": "simple_factor_based" },
        });
        let config: EngineConfig = serde_json::from_value(json).unwrap();
        assert_eq!(
            config.rate_policy,
            RatePolicy::Fixed {
                annual_rate: dec!(0.12)
            }
        );
        assert_eq!(config.periods_per_year, 12);
        assert_eq!(
            config.scoring_policy,
            ScoringPolicy::SimpleFactorBased(FactorPolicy::default())
        );
    }

    #[test]
    fn test_metadata_populated() {
        let q = query(dec!(50_000), dec!(10_000), dec!(100_000), 12);
        let result = evaluate_loan(&q, &EngineConfig::simulator()).unwrap();
        assert!(!result.methodology.is_empty());
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    }
}
