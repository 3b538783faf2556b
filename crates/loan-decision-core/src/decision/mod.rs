pub mod classifier;
pub mod engine;

pub use classifier::{ApprovalStatus, ProbabilityThresholds};
pub use engine::{evaluate_loan, EngineConfig, LoanDecisionOutput, LoanQuery};
