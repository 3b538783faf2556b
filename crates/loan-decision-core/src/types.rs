use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LoanDecisionError;
use crate::LoanResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Dimensionless ratios (expenses / income, payment / income).
pub type Ratio = Decimal;

/// Probabilities reported on a 0-100 scale.
pub type Percent = Decimal;

/// Multiples (e.g., disposable income covers the payment 1.5x)
pub type Multiple = Decimal;

/// Bureau-style credit score.
pub type CreditScore = u32;

pub const MIN_CREDIT_SCORE: CreditScore = 300;
pub const MAX_CREDIT_SCORE: CreditScore = 850;

/// How the `term` of a loan query is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermUnit {
    #[default]
    Months,
    Years,
}

impl std::fmt::Display for TermUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Months => write!(f, "months"),
            Self::Years => write!(f, "years"),
        }
    }
}

impl std::str::FromStr for TermUnit {
    type Err = LoanDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "months" | "month" | "m" => Ok(TermUnit::Months),
            "years" | "year" | "y" => Ok(TermUnit::Years),
            _ => Err(LoanDecisionError::invalid(
                "termUnit",
                "Term unit must be 'months' or 'years'.",
            )),
        }
    }
}

/// Reject credit scores outside the bureau range.
pub fn validate_credit_score(score: CreditScore) -> LoanResult<CreditScore> {
    if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score) {
        return Err(LoanDecisionError::invalid(
            "creditScore",
            format!("Credit score must be between {MIN_CREDIT_SCORE} and {MAX_CREDIT_SCORE}."),
        ));
    }
    Ok(score)
}

/// Round a monetary amount for display (half away from zero, 2 dp).
pub fn round_for_display(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Fixed two-decimal string, e.g. `"8791.59"` or `"50.00"`.
pub fn format_money(value: Money) -> String {
    round_for_display(value).to_string()
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money_pads_and_rounds() {
        assert_eq!(format_money(dec!(8791.588723)), "8791.59");
        assert_eq!(format_money(dec!(50)), "50.00");
        assert_eq!(format_money(dec!(0.125)), "0.13");
        assert_eq!(format_money(dec!(22.2222222)), "22.22");
    }

    #[test]
    fn test_credit_score_bounds() {
        assert!(validate_credit_score(300).is_ok());
        assert!(validate_credit_score(850).is_ok());
        assert!(validate_credit_score(299).is_err());
        assert!(validate_credit_score(851).is_err());
    }

    #[test]
    fn test_term_unit_parse() {
        assert_eq!("Years".parse::<TermUnit>().unwrap(), TermUnit::Years);
        assert_eq!("months".parse::<TermUnit>().unwrap(), TermUnit::Months);
        assert!("fortnights".parse::<TermUnit>().is_err());
    }
}
