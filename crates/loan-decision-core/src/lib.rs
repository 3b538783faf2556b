pub mod api;
pub mod decision;
pub mod error;
pub mod explanation;
pub mod scoring;
pub mod time_value;
pub mod types;

#[cfg(feature = "records")]
pub mod records;

#[cfg(feature = "seed")]
pub mod seed;

pub use error::LoanDecisionError;
pub use types::*;

/// Standard result type for all loan-decision operations
pub type LoanResult<T> = Result<T, LoanDecisionError>;
