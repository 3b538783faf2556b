use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::ExplanationEntry;
use crate::decision::classifier::AffordabilityDecision;
use crate::scoring::affordability::AffordabilityPolicy;
use crate::scoring::factors::{Factor, FactorScore, RiskTier, ScoreBreakdown};
use crate::types::format_money;

/// One sentence per scored factor, in scoring order.
pub fn explain_factors(score: &ScoreBreakdown) -> Vec<ExplanationEntry> {
    score
        .factors()
        .iter()
        .map(|f| ExplanationEntry::new(f.factor.to_string(), factor_sentence(f)))
        .collect()
}

fn factor_sentence(score: &FactorScore) -> &'static str {
    match (score.factor, score.tier) {
        (Factor::IncomeStrength, RiskTier::Low) => "Strong monthly income increased your score.",
        (Factor::IncomeStrength, RiskTier::Medium) => "Moderate income contributed positively.",
        (Factor::IncomeStrength, RiskTier::High) => {
            "Lower income slightly reduced your approval strength."
        }
        (Factor::ExpenseRatio, RiskTier::Low) => {
            "Low expense ratio shows good financial discipline."
        }
        (Factor::ExpenseRatio, RiskTier::Medium) => {
            "Moderate expense ratio slightly affected score."
        }
        (Factor::ExpenseRatio, RiskTier::High) => {
            "High expense ratio negatively impacted your score."
        }
        (Factor::PaymentBurden, RiskTier::Low) => "EMI burden is healthy compared to income.",
        (Factor::PaymentBurden, RiskTier::Medium) => {
            "EMI burden is manageable but slightly risky."
        }
        (Factor::PaymentBurden, RiskTier::High) => "High EMI burden reduced approval probability.",
    }
}

/// Disposable-income cover, credit score and DTI, in that order.
///
/// Each sentence cites the strongest tier condition the applicant met, or
/// the weakest one they missed.
pub fn explain_affordability(
    decision: &AffordabilityDecision,
    policy: &AffordabilityPolicy,
) -> Vec<ExplanationEntry> {
    let metrics = &decision.metrics;

    let cover = policy
        .tiers
        .iter()
        .map(|t| t.disposable_multiple)
        .find(|m| metrics.covers(*m));
    let cover_text = match cover {
        Some(multiple) => format!(
            "Disposable income of {} covers the periodic payment of {} more than {}x.",
            format_money(metrics.disposable_income),
            format_money(metrics.periodic_payment),
            multiple.normalize()
        ),
        None => format!(
            "Disposable income of {} does not comfortably cover the periodic payment of {}.",
            format_money(metrics.disposable_income),
            format_money(metrics.periodic_payment)
        ),
    };

    let floor = policy
        .tiers
        .iter()
        .map(|t| t.min_credit_score)
        .find(|floor| decision.credit_score >= *floor);
    let score_text = match floor {
        Some(floor) => format!(
            "Credit score {} meets the {} floor for approval consideration.",
            decision.credit_score, floor
        ),
        None => format!(
            "Credit score {} is below every approval floor.",
            decision.credit_score
        ),
    };

    let ceiling = policy
        .tiers
        .iter()
        .map(|t| t.max_debt_to_income)
        .find(|ceiling| metrics.debt_to_income < *ceiling);
    let dti_text = match ceiling {
        Some(ceiling) => format!(
            "The payment takes {}% of income, under the {}% ceiling.",
            as_percent(metrics.debt_to_income),
            as_percent(ceiling)
        ),
        None => format!(
            "The payment takes {}% of income, above every debt-to-income ceiling.",
            as_percent(metrics.debt_to_income)
        ),
    };

    vec![
        ExplanationEntry::new("Disposable Income", cover_text),
        ExplanationEntry::new("Credit Score", score_text),
        ExplanationEntry::new("Debt-to-Income", dti_text),
    ]
}

/// Ratio to a percent string with at most 2 dp (0.3 -> "30").
pub(crate) fn as_percent(ratio: Decimal) -> String {
    ratio
        .saturating_mul(dec!(100))
        .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}
