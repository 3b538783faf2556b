pub mod credit_band;
pub mod disclosure;
pub mod factors;

use serde::{Deserialize, Serialize};

pub use credit_band::{explain_credit_score, CreditBand};
pub use disclosure::explain_declared_finances;
pub use factors::{explain_affordability, explain_factors};

/// One line of a decision rationale. Sequence order is evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationEntry {
    pub title: String,
    pub description: String,
}

impl ExplanationEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        ExplanationEntry {
            title: title.into(),
            description: description.into(),
        }
    }
}
