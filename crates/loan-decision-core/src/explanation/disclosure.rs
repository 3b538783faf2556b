use super::factors::as_percent;
use super::ExplanationEntry;
use crate::scoring::factors::{ratio_to_income, validate_finances, FactorTiers, RiskTier};
use crate::{types::*, LoanResult};

/// Explanation for an anonymous caller.
///
/// With both income and expenses declared, returns income commentary and
/// expense-ratio commentary graded on the factor tiers. Otherwise returns
/// the five-point generic disclosure.
pub fn explain_declared_finances(
    income: Option<Money>,
    expenses: Option<Money>,
    tiers: &FactorTiers,
) -> LoanResult<Vec<ExplanationEntry>> {
    match (income, expenses) {
        (Some(income), Some(expenses)) => declared(income, expenses, tiers),
        _ => Ok(generic_disclosure(tiers)),
    }
}

fn declared(
    income: Money,
    expenses: Money,
    tiers: &FactorTiers,
) -> LoanResult<Vec<ExplanationEntry>> {
    validate_finances(income, expenses)?;

    let income_text = match tiers.income_tier(income) {
        RiskTier::Low => format!(
            "Your declared income of {} is in the strongest income tier, which supports approval.",
            format_money(income)
        ),
        RiskTier::Medium => format!(
            "Your declared income of {} is moderate. Reaching {} would move you into the strongest tier.",
            format_money(income),
            format_money(tiers.income_strong)
        ),
        RiskTier::High => format!(
            "Your declared income of {} is below {}, which limits the loan amounts that score well.",
            format_money(income),
            format_money(tiers.income_moderate)
        ),
    };

    let ratio = ratio_to_income(expenses, income, "expenses", "Expense ratio")?;
    let expense_text = match tiers.expense_tier(ratio) {
        RiskTier::Low => format!(
            "Expenses take {}% of your income, a low ratio that reflects good financial discipline.",
            as_percent(ratio)
        ),
        RiskTier::Medium => format!(
            "Expenses take {}% of your income. Bringing this under {}% would strengthen your profile.",
            as_percent(ratio),
            as_percent(tiers.expense_low)
        ),
        RiskTier::High => format!(
            "Expenses take {}% of your income, at or above the {}% level lenders treat as high.",
            as_percent(ratio),
            as_percent(tiers.expense_moderate)
        ),
    };

    Ok(vec![
        ExplanationEntry::new("Income Assessment", income_text),
        ExplanationEntry::new("Expense Ratio", expense_text),
    ])
}

fn generic_disclosure(tiers: &FactorTiers) -> Vec<ExplanationEntry> {
    vec![
        ExplanationEntry::new(
            "How Approval Is Estimated",
            "Approval likelihood is estimated from your declared monthly income, your monthly expenses and the size of the repayment.",
        ),
        ExplanationEntry::new(
            "Income Strength",
            format!(
                "Monthly income of {} or more earns the strongest income rating.",
                format_money(tiers.income_strong)
            ),
        ),
        ExplanationEntry::new(
            "Expense Ratio",
            format!(
                "Keeping expenses below {}% of income signals sound financial discipline.",
                as_percent(tiers.expense_low)
            ),
        ),
        ExplanationEntry::new(
            "Payment Burden",
            format!(
                "A periodic payment under {}% of income is treated as comfortably affordable.",
                as_percent(tiers.burden_low)
            ),
        ),
        ExplanationEntry::new(
            "Indicative Only",
            "These estimates are indicative and do not constitute a lending commitment. Provide your income and expenses for a personalised explanation.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoanDecisionError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_generic_when_nothing_declared() {
        let lines = explain_declared_finances(None, None, &FactorTiers::default()).unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[1].description,
            "Monthly income of 50000.00 or more earns the strongest income rating."
        );
        assert_eq!(
            lines[2].description,
            "Keeping expenses below 40% of income signals sound financial discipline."
        );
    }

    #[test]
    fn test_generic_when_partially_declared() {
        let lines =
            explain_declared_finances(Some(dec!(40_000)), None, &FactorTiers::default()).unwrap();
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_declared_finances() {
        let lines = explain_declared_finances(
            Some(dec!(60_000)),
            Some(dec!(30_000)),
            &FactorTiers::default(),
        )
        .unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].description.contains("strongest income tier"));
        assert_eq!(
            lines[1].description,
            "Expenses take 50% of your income. Bringing this under 40% would strengthen your profile."
        );
    }

    #[test]
    fn test_declared_expense_ratio_overflow_rejected() {
        let err = explain_declared_finances(
            Some(dec!(0.0000000001)),
            Some(dec!(100000000000000000000)),
            &FactorTiers::default(),
        )
        .unwrap_err();
        match err {
            LoanDecisionError::InvalidInput { field, .. } => assert_eq!(field, "expenses"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_zero_income_rejected() {
        let err = explain_declared_finances(
            Some(Decimal::ZERO),
            Some(dec!(100)),
            &FactorTiers::default(),
        )
        .unwrap_err();
        match err {
            LoanDecisionError::InvalidInput { field, .. } => assert_eq!(field, "income"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
