use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use loan_decision_core::api;
use loan_decision_core::scoring::{FactorTiers, ScoringPolicy};

use super::{engine_config, PolicyPreset};
use crate::input;

/// Arguments for score explanations
#[derive(Args)]
pub struct ExplainArgs {
    /// Path to JSON request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Explain this credit score (takes precedence over income/expenses)
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Declared income per period
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Declared expenses per period
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Built-in policy preset (supplies the factor tiers)
    #[arg(long, value_enum, default_value = "simulator")]
    pub policy: PolicyPreset,

    /// Path to an engine configuration JSON file (overrides --policy)
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_explain_score(args: ExplainArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = engine_config(args.policy, args.config.as_deref())?;
    let tiers = match &config.scoring_policy {
        ScoringPolicy::SimpleFactorBased(policy) => policy.tiers.clone(),
        ScoringPolicy::CreditScoreAware(_) => FactorTiers::default(),
    };

    let request = match input::read_request(args.input.as_deref())? {
        Some(body) => body,
        None => {
            let mut body = Map::new();
            if let Some(score) = args.credit_score {
                body.insert("creditScore".into(), json!(score));
            }
            if let Some(income) = args.income {
                body.insert("income".into(), json!(income.to_string()));
            }
            if let Some(expenses) = args.expenses {
                body.insert("expenses".into(), json!(expenses.to_string()));
            }
            Value::Object(body)
        }
    };

    let response = api::explain_score(&request, &tiers)?;
    Ok(serde_json::to_value(response)?)
}
