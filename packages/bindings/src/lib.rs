use napi::Result as NapiResult;
use napi_derive::napi;
use serde_json::Value;

use loan_decision_core::api;
use loan_decision_core::decision::{evaluate_loan as evaluate, EngineConfig};
use loan_decision_core::scoring::{FactorTiers, ScoringPolicy};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine config from JSON, or the simulator preset when absent.
fn parse_config(config_json: Option<String>) -> NapiResult<EngineConfig> {
    let config = match config_json {
        Some(json) => serde_json::from_str::<EngineConfig>(&json).map_err(to_napi_error)?,
        None => EngineConfig::simulator(),
    };
    config.validate().map_err(to_napi_error)?;
    Ok(config)
}

fn parse_request(input_json: &str) -> NapiResult<Value> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan decisions
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_loan(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let request = parse_request(&input_json)?;
    let response = api::calculate(&request, &config).map_err(to_napi_error)?;
    serde_json::to_string(&response).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_loan(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let request = parse_request(&input_json)?;
    let query = api::parse_loan_query(&request).map_err(to_napi_error)?;
    let output = evaluate(&query, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Explanations
// ---------------------------------------------------------------------------

#[napi]
pub fn explain_score(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let tiers = match &config.scoring_policy {
        ScoringPolicy::SimpleFactorBased(policy) => policy.tiers.clone(),
        ScoringPolicy::CreditScoreAware(_) => FactorTiers::default(),
    };
    let request = parse_request(&input_json)?;
    let response = api::explain_score(&request, &tiers).map_err(to_napi_error)?;
    serde_json::to_string(&response).map_err(to_napi_error)
}
