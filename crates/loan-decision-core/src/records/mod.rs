//! Per-user persistence of loan evaluations and explanations.
//!
//! The engine never touches a repository; callers evaluate first and
//! record afterwards.

pub mod memory;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::classifier::ApprovalStatus;
use crate::explanation::ExplanationEntry;
use crate::{types::*, LoanResult};

pub use memory::InMemoryStore;
pub use service::{Authenticator, LoanReceipt, LoanService, ProfileUpdate, StaticTokens};

pub type UserId = u64;
pub type RecordId = u64;

/// Independent identifier sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Loan,
    Explanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub credit_score: CreditScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Money>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: RecordId,
    pub user: UserId,
    pub income: Money,
    pub expenses: Money,
    pub principal: Money,
    pub term: u32,
    pub term_unit: TermUnit,
    pub periodic_payment: Money,
    /// As reported to the caller, 0-100 at 2 dp.
    pub approval_probability: Percent,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationRecord {
    pub id: RecordId,
    pub user: UserId,
    pub credit_score: CreditScore,
    pub explanation_points: Vec<ExplanationEntry>,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait LoanRepository {
    /// Next identifier for `kind`. Sequences start at 1 and never repeat.
    fn next_id(&mut self, kind: RecordKind) -> RecordId;
    fn find_user(&self, predicate: &dyn Fn(&UserProfile) -> bool) -> Option<UserProfile>;
    /// Insert or replace by id.
    fn save_user(&mut self, user: UserProfile) -> LoanResult<()>;
    fn append_loan(&mut self, loan: LoanRecord) -> LoanResult<()>;
    /// Insertion order.
    fn loans_for(&self, user: UserId) -> Vec<LoanRecord>;
    fn append_explanation(&mut self, record: ExplanationRecord) -> LoanResult<()>;
    fn explanations_for(&self, user: UserId) -> Vec<ExplanationRecord>;
}
