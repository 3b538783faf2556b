use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use loan_decision_core::api;
use loan_decision_core::decision::evaluate_loan;
use loan_decision_core::TermUnit;

use super::{engine_config, PolicyPreset};
use crate::input;

/// Arguments shared by `calculate` and `evaluate`
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Declared income per period
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Declared expenses per period
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Amount borrowed
    #[arg(long, alias = "amount")]
    pub principal: Option<Decimal>,

    /// Loan term, in `--term-unit` units
    #[arg(long, alias = "term-periods")]
    pub term: Option<u32>,

    /// months or years (defaults to the policy's unit)
    #[arg(long)]
    pub term_unit: Option<TermUnit>,

    /// Bureau credit score (300-850)
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Built-in policy preset
    #[arg(long, value_enum, default_value = "simulator")]
    pub policy: PolicyPreset,

    /// Path to an engine configuration JSON file (overrides --policy)
    #[arg(long)]
    pub config: Option<String>,
}

/// Presentation response: payment, probability, status, verdict, reasons.
pub fn run_calculate(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = engine_config(args.policy, args.config.as_deref())?;
    let request = loan_request(&args)?;
    let response = api::calculate(&request, &config)?;
    Ok(serde_json::to_value(response)?)
}

/// Full computation envelope with breakdown, assumptions and warnings.
pub fn run_evaluate(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = engine_config(args.policy, args.config.as_deref())?;
    let request = loan_request(&args)?;
    let query = api::parse_loan_query(&request)?;
    let output = evaluate_loan(&query, &config)?;
    Ok(serde_json::to_value(output)?)
}

fn loan_request(args: &LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(body) = input::read_request(args.input.as_deref())? {
        return Ok(body);
    }

    let mut body = Map::new();
    body.insert(
        "income".into(),
        json!(args
            .income
            .ok_or("--income is required (or provide --input)")?
            .to_string()),
    );
    body.insert(
        "expenses".into(),
        json!(args
            .expenses
            .ok_or("--expenses is required (or provide --input)")?
            .to_string()),
    );
    body.insert(
        "principal".into(),
        json!(args
            .principal
            .ok_or("--principal is required (or provide --input)")?
            .to_string()),
    );
    body.insert(
        "termPeriods".into(),
        json!(args.term.ok_or("--term is required (or provide --input)")?),
    );
    if let Some(unit) = args.term_unit {
        body.insert("termUnit".into(), json!(unit.to_string()));
    }
    if let Some(score) = args.credit_score {
        body.insert("creditScore".into(), json!(score));
    }
    Ok(Value::Object(body))
}
