//! JSON boundary for the two externally visible operations.
//!
//! `calculate` and `explain_score` accept loosely typed request objects
//! (numbers or numeric strings), reject anything non-numeric with
//! `InvalidInput`, and render presentation values: the payment as a fixed
//! two-decimal string and the probability rounded to 2 dp.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::decision::classifier::ApprovalStatus;
use crate::decision::engine::{evaluate_loan, EngineConfig, LoanDecisionOutput, LoanQuery};
use crate::explanation::{
    explain_credit_score, explain_declared_finances, CreditBand, ExplanationEntry,
};
use crate::scoring::factors::FactorTiers;
use crate::{types::*, LoanDecisionError, LoanResult};

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    /// Two-decimal string, e.g. `"8791.59"`.
    pub periodic_payment: String,
    /// 0-100, rounded to 2 dp.
    #[serde(with = "rust_decimal::serde::float")]
    pub approval_probability: Decimal,
    pub approval_status: ApprovalStatus,
    pub verdict: String,
    pub explanation: Vec<String>,
}

impl From<&LoanDecisionOutput> for CalculateResponse {
    fn from(out: &LoanDecisionOutput) -> Self {
        CalculateResponse {
            periodic_payment: format_money(out.periodic_payment),
            approval_probability: round_for_display(out.approval_probability),
            approval_status: out.approval_status,
            verdict: out.verdict.clone(),
            explanation: out
                .explanation
                .iter()
                .map(|e| e.description.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainScoreResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<CreditScore>,
    pub explanation_points: Vec<ExplanationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Parse a loan request and run it through the engine.
pub fn calculate(request: &Value, config: &EngineConfig) -> LoanResult<CalculateResponse> {
    let query = parse_loan_query(request)?;
    let output = evaluate_loan(&query, config)?;
    Ok(CalculateResponse::from(&output.result))
}

/// Explain a credit score, declared finances, or neither.
///
/// A `creditScore` takes precedence. Otherwise `income` and `expenses`
/// together select the personalised explanation; anything less yields the
/// generic disclosure.
pub fn explain_score(request: &Value, tiers: &FactorTiers) -> LoanResult<ExplainScoreResponse> {
    let empty = Map::new();
    let obj = match request {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(LoanDecisionError::invalid(
                "request",
                "Request must be a JSON object.",
            ))
        }
    };

    if let Some((key, value)) = lookup(obj, &["creditScore", "credit_score"]) {
        let score = credit_score_field(key, value)?;
        return explain_credit(score);
    }

    let income = lookup(obj, &["income"])
        .map(|(k, v)| decimal_field(k, v))
        .transpose()?;
    let expenses = lookup(obj, &["expenses"])
        .map(|(k, v)| decimal_field(k, v))
        .transpose()?;

    let explanation_points = explain_declared_finances(income, expenses, tiers)?;
    let summary = match (income, expenses) {
        (Some(i), Some(e)) => Some(format!(
            "Assessment based on declared income of {} and expenses of {}.",
            format_money(i),
            format_money(e)
        )),
        _ => None,
    };

    Ok(ExplainScoreResponse {
        credit_score: None,
        explanation_points,
        summary,
    })
}

/// Credit-band explanation for a known score.
pub fn explain_credit(score: CreditScore) -> LoanResult<ExplainScoreResponse> {
    let explanation_points = explain_credit_score(score)?;
    Ok(ExplainScoreResponse {
        credit_score: Some(score),
        explanation_points,
        summary: Some(format!(
            "A credit score of {score} is in the {} band.",
            CreditBand::from_score(score)
        )),
    })
}

/// Structural validation of a loan request object.
pub fn parse_loan_query(request: &Value) -> LoanResult<LoanQuery> {
    let obj = request.as_object().ok_or_else(|| {
        LoanDecisionError::invalid("request", "Request must be a JSON object.")
    })?;

    let income = required_decimal(obj, &["income"])?;
    let expenses = required_decimal(obj, &["expenses"])?;
    let principal = required_decimal(obj, &["principal", "amount"])?;

    let (term_key, term_value) = lookup(obj, &["termPeriods", "term"]).ok_or_else(|| {
        LoanDecisionError::invalid("termPeriods", "termPeriods is required.")
    })?;
    let term = positive_integer_field(term_key, term_value)?;

    let term_unit = match lookup(obj, &["termUnit", "term_unit"]) {
        Some((_, Value::String(s))) => Some(TermUnit::from_str(s)?),
        Some(_) => {
            return Err(LoanDecisionError::invalid(
                "termUnit",
                "Term unit must be 'months' or 'years'.",
            ))
        }
        None => None,
    };

    let credit_score = lookup(obj, &["creditScore", "credit_score"])
        .map(|(k, v)| credit_score_field(k, v))
        .transpose()?;

    Ok(LoanQuery {
        income,
        expenses,
        principal,
        term,
        term_unit,
        credit_score,
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// First present, non-null key out of `keys`.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
}

fn required_decimal(obj: &Map<String, Value>, keys: &[&'static str]) -> LoanResult<Decimal> {
    let (key, value) = lookup(obj, keys).ok_or_else(|| {
        LoanDecisionError::invalid(keys[0], format!("{} is required.", keys[0]))
    })?;
    decimal_field(key, value)
}

fn decimal_field(field: &str, value: &Value) -> LoanResult<Decimal> {
    let parsed = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    };
    parsed.ok_or_else(|| LoanDecisionError::invalid(field, format!("{field} must be a number.")))
}

fn positive_integer_field(field: &str, value: &Value) -> LoanResult<u32> {
    let d = decimal_field(field, value)?;
    if d <= Decimal::ZERO || !d.fract().is_zero() {
        return Err(LoanDecisionError::invalid(
            field,
            format!("{field} must be a positive integer."),
        ));
    }
    d.to_u32().ok_or_else(|| {
        LoanDecisionError::invalid(field, format!("{field} is too large."))
    })
}

fn credit_score_field(field: &str, value: &Value) -> LoanResult<CreditScore> {
    let d = decimal_field(field, value)?;
    if !d.fract().is_zero() {
        return Err(LoanDecisionError::invalid(
            "creditScore",
            "Credit score must be a whole number.",
        ));
    }
    let score = d.to_u32().ok_or_else(|| {
        LoanDecisionError::invalid("creditScore", "Credit score is out of range.")
    })?;
    validate_credit_score(score)
}
