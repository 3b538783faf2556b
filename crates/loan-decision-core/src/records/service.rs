use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::info;

use super::memory::is_plausible_email;
use super::{ExplanationRecord, LoanRecord, LoanRepository, RecordId, RecordKind, UserId, UserProfile};
use crate::api::{explain_credit, parse_loan_query, CalculateResponse, ExplainScoreResponse};
use crate::decision::engine::{evaluate_loan, EngineConfig};
use crate::{types::*, LoanDecisionError, LoanResult};

/// Resolves a bearer token to a user id.
pub trait Authenticator {
    fn authenticate(&self, token: &str) -> LoanResult<UserId>;
}

/// Fixed token table. Accepts either the bare token or `Bearer <token>`.
#[derive(Debug, Default, Clone)]
pub struct StaticTokens {
    tokens: HashMap<String, UserId>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user: UserId) -> Self {
        self.insert(token, user);
        self
    }

    pub fn insert(&mut self, token: impl Into<String>, user: UserId) {
        self.tokens.insert(token.into(), user);
    }
}

impl Authenticator for StaticTokens {
    fn authenticate(&self, token: &str) -> LoanResult<UserId> {
        let token = token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        if token.is_empty() {
            return Err(LoanDecisionError::Unauthorized("no token".into()));
        }
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| LoanDecisionError::Unauthorized("token failed".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanReceipt {
    pub loan_id: RecordId,
    #[serde(flatten)]
    pub response: CalculateResponse,
    pub message: String,
}

/// Partial profile change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub credit_score: Option<CreditScore>,
    pub income: Option<Money>,
    pub expenses: Option<Money>,
}

impl ProfileUpdate {
    fn validate(&self) -> LoanResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(LoanDecisionError::invalid("name", "Name cannot be empty."));
            }
        }
        if let Some(email) = &self.email {
            if !is_plausible_email(email.trim()) {
                return Err(LoanDecisionError::invalid(
                    "email",
                    "Please include a valid email.",
                ));
            }
        }
        if let Some(score) = self.credit_score {
            validate_credit_score(score)?;
        }
        if matches!(self.income, Some(i) if i < Decimal::ZERO) {
            return Err(LoanDecisionError::invalid("income", "Income cannot be negative."));
        }
        if matches!(self.expenses, Some(e) if e < Decimal::ZERO) {
            return Err(LoanDecisionError::invalid(
                "expenses",
                "Expenses cannot be negative.",
            ));
        }
        Ok(())
    }
}

/// Authenticated, user-keyed front of the engine.
///
/// Every mutating operation evaluates first and only then writes to the
/// repository, so a rejected request leaves no trace.
pub struct LoanService<R, A> {
    repo: R,
    auth: A,
    config: EngineConfig,
}

impl<R: LoanRepository, A: Authenticator> LoanService<R, A> {
    pub fn new(repo: R, auth: A, config: EngineConfig) -> Self {
        LoanService { repo, auth, config }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn current_user(&self, token: &str) -> LoanResult<UserProfile> {
        let id = self.auth.authenticate(token)?;
        self.repo
            .find_user(&|u| u.id == id)
            .ok_or_else(|| LoanDecisionError::NotFound {
                entity: "User".into(),
                id: id.to_string(),
            })
    }

    /// Evaluate a loan with the caller's stored credit score and record it.
    pub fn calculate(&mut self, token: &str, request: &Value) -> LoanResult<LoanReceipt> {
        let mut user = self.current_user(token)?;
        let mut query = parse_loan_query(request)?;
        if self.config.uses_credit_score() {
            query.credit_score = Some(user.credit_score);
        }

        let output = evaluate_loan(&query, &self.config)?;
        let response = CalculateResponse::from(&output.result);
        let now = Utc::now();

        user.income = Some(query.income);
        user.expenses = Some(query.expenses);
        user.updated_at = now;
        self.repo.save_user(user.clone())?;

        let loan_id = self.repo.next_id(RecordKind::Loan);
        self.repo.append_loan(LoanRecord {
            id: loan_id,
            user: user.id,
            income: query.income,
            expenses: query.expenses,
            principal: query.principal,
            term: query.term,
            term_unit: query.term_unit.unwrap_or(self.config.term_unit),
            periodic_payment: output.result.periodic_payment,
            approval_probability: response.approval_probability,
            approval_status: response.approval_status,
            created_at: now,
        })?;

        info!(
            user = user.id,
            loan_id,
            status = %response.approval_status,
            "loan evaluation recorded"
        );

        Ok(LoanReceipt {
            loan_id,
            response,
            message: "Loan calculation successful".into(),
        })
    }

    /// Credit-band explanation for the caller's stored score.
    pub fn explain(&mut self, token: &str) -> LoanResult<ExplainScoreResponse> {
        let user = self.current_user(token)?;
        let response = explain_credit(user.credit_score)?;

        let id = self.repo.next_id(RecordKind::Explanation);
        self.repo.append_explanation(ExplanationRecord {
            id,
            user: user.id,
            credit_score: user.credit_score,
            explanation_points: response.explanation_points.clone(),
            created_at: Utc::now(),
        })?;

        info!(user = user.id, explanation_id = id, "credit explanation recorded");
        Ok(response)
    }

    /// The caller's loans, newest first.
    pub fn history(&self, token: &str) -> LoanResult<Vec<LoanRecord>> {
        let user = self.current_user(token)?;
        let mut loans = self.repo.loans_for(user.id);
        loans.sort_by_key(|l| Reverse((l.created_at, l.id)));
        Ok(loans)
    }

    pub fn explanations(&self, token: &str) -> LoanResult<Vec<ExplanationRecord>> {
        let user = self.current_user(token)?;
        let mut records = self.repo.explanations_for(user.id);
        records.sort_by_key(|e| Reverse((e.created_at, e.id)));
        Ok(records)
    }

    pub fn profile(&self, token: &str) -> LoanResult<UserProfile> {
        self.current_user(token)
    }

    pub fn update_profile(&mut self, token: &str, update: ProfileUpdate) -> LoanResult<UserProfile> {
        let mut user = self.current_user(token)?;
        update.validate()?;

        if let Some(email) = &update.email {
            let email = email.trim();
            let taken = self
                .repo
                .find_user(&|u| u.id != user.id && u.email.eq_ignore_ascii_case(email))
                .is_some();
            if taken {
                return Err(LoanDecisionError::invalid(
                    "email",
                    "Email is already in use.",
                ));
            }
        }

        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            user.email = email.trim().to_string();
        }
        if let Some(score) = update.credit_score {
            user.credit_score = score;
        }
        if let Some(income) = update.income {
            user.income = Some(income);
        }
        if let Some(expenses) = update.expenses {
            user.expenses = Some(expenses);
        }
        user.updated_at = Utc::now();
        self.repo.save_user(user.clone())?;

        info!(user = user.id, "profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InMemoryStore;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn service() -> LoanService<InMemoryStore, StaticTokens> {
        let mut store = InMemoryStore::new();
        let ada = store.register_user("Ada", "ada@example.com", 720).unwrap();
        let tokens = StaticTokens::new().with_token("ada-token", ada.id);
        LoanService::new(store, tokens, EngineConfig::member())
    }

    #[test]
    fn test_token_checks() {
        let tokens = StaticTokens::new().with_token("t", 3);
        assert_eq!(tokens.authenticate("Bearer t").unwrap(), 3);
        assert_eq!(tokens.authenticate("t").unwrap(), 3);
        assert_eq!(tokens.authenticate("").unwrap_err().status_code(), 401);
        assert_eq!(tokens.authenticate("nope").unwrap_err().status_code(), 401);
    }

    #[test]
    fn test_calculate_records_loan_and_updates_profile() {
        let mut svc = service();
        let receipt = svc
            .calculate(
                "ada-token",
                &json!({ "income": 50000, "expenses": 10000, "amount": 100000, "term": 5 }),
            )
            .unwrap();
        assert_eq!(receipt.loan_id, 1);
        assert_eq!(receipt.message, "Loan calculation successful");

        let profile = svc.profile("ada-token").unwrap();
        assert_eq!(profile.income, Some(dec!(50000)));
        assert_eq!(profile.expenses, Some(dec!(10000)));

        let history = svc.history("ada-token").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].term_unit, TermUnit::Years);
        assert_eq!(history[0].approval_status, receipt.response.approval_status);
    }

    #[test]
    fn test_invalid_request_leaves_no_trace() {
        let mut svc = service();
        let err = svc
            .calculate("ada-token", &json!({ "income": "lots", "expenses": 0, "amount": 1, "term": 1 }))
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(svc.history("ada-token").unwrap().is_empty());
        assert_eq!(svc.profile("ada-token").unwrap().income, None);
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let store = InMemoryStore::new();
        let mut svc = LoanService::new(
            store,
            StaticTokens::new().with_token("ghost", 99),
            EngineConfig::member(),
        );
        let err = svc.explain("ghost").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_update_profile_is_partial() {
        let mut svc = service();
        let updated = svc
            .update_profile(
                "ada-token",
                ProfileUpdate {
                    credit_score: Some(780),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.credit_score, 780);
        assert_eq!(updated.name, "Ada");

        let err = svc
            .update_profile(
                "ada-token",
                ProfileUpdate {
                    credit_score: Some(200),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(svc.profile("ada-token").unwrap().credit_score, 780);
    }

    #[test]
    fn test_update_profile_rejects_malformed_email() {
        let mut svc = service();
        let err = svc
            .update_profile(
                "ada-token",
                ProfileUpdate {
                    email: Some("ada.example.com".into()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap_err();
        match err {
            LoanDecisionError::InvalidInput { field, .. } => assert_eq!(field, "email"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert_eq!(svc.profile("ada-token").unwrap().email, "ada@example.com");
    }
}
