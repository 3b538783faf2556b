pub mod explain;
pub mod loan;

use clap::ValueEnum;
use loan_decision_core::decision::EngineConfig;

use crate::input;

/// Built-in engine configurations.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyPreset {
    /// Fixed 10% rate, factor scoring, term in months
    Simulator,
    /// Score-priced rate, credit-aware scoring, term in years
    Member,
}

/// `--config` file if given, else the named preset.
pub fn engine_config(
    preset: PolicyPreset,
    config_path: Option<&str>,
) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => input::read_config::<EngineConfig>(path)?,
        None => match preset {
            PolicyPreset::Simulator => EngineConfig::simulator(),
            PolicyPreset::Member => EngineConfig::member(),
        },
    };
    config.validate()?;
    tracing::debug!(
        scoring_policy = config.scoring_policy.name(),
        periods_per_year = config.periods_per_year,
        "engine configured"
    );
    Ok(config)
}
