use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

use super::{
    ExplanationRecord, LoanRecord, LoanRepository, RecordId, RecordKind, UserId, UserProfile,
};
use crate::{types::*, LoanDecisionError, LoanResult};

/// Process-local store. State lives exactly as long as the value.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    counters: HashMap<RecordKind, RecordId>,
    users: BTreeMap<UserId, UserProfile>,
    loans: Vec<LoanRecord>,
    explanations: Vec<ExplanationRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user with a fresh id. E-mail addresses are unique,
    /// compared case-insensitively.
    pub fn register_user(
        &mut self,
        name: &str,
        email: &str,
        credit_score: CreditScore,
    ) -> LoanResult<UserProfile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LoanDecisionError::invalid("name", "Name is required."));
        }
        let email = email.trim();
        if !is_plausible_email(email) {
            return Err(LoanDecisionError::invalid(
                "email",
                "Please include a valid email.",
            ));
        }
        let credit_score = validate_credit_score(credit_score)?;
        if self
            .find_user(&|u| u.email.eq_ignore_ascii_case(email))
            .is_some()
        {
            return Err(LoanDecisionError::invalid("email", "User already exists."));
        }

        let now = Utc::now();
        let user = UserProfile {
            id: self.next_id(RecordKind::User),
            name: name.to_string(),
            email: email.to_string(),
            credit_score,
            income: None,
            expenses: None,
            created_at: now,
            updated_at: now,
        };
        self.save_user(user.clone())?;
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Option<&UserProfile> {
        self.users.get(&id)
    }

    fn require_user(&self, id: UserId) -> LoanResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(LoanDecisionError::NotFound {
                entity: "User".into(),
                id: id.to_string(),
            })
        }
    }
}

pub(crate) fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl LoanRepository for InMemoryStore {
    fn next_id(&mut self, kind: RecordKind) -> RecordId {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }

    fn find_user(&self, predicate: &dyn Fn(&UserProfile) -> bool) -> Option<UserProfile> {
        self.users.values().find(|u| predicate(u)).cloned()
    }

    fn save_user(&mut self, user: UserProfile) -> LoanResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }

    fn append_loan(&mut self, loan: LoanRecord) -> LoanResult<()> {
        self.require_user(loan.user)?;
        self.loans.push(loan);
        Ok(())
    }

    fn loans_for(&self, user: UserId) -> Vec<LoanRecord> {
        self.loans
            .iter()
            .filter(|l| l.user == user)
            .cloned()
            .collect()
    }

    fn append_explanation(&mut self, record: ExplanationRecord) -> LoanResult<()> {
        self.require_user(record.user)?;
        self.explanations.push(record);
        Ok(())
    }

    fn explanations_for(&self, user: UserId) -> Vec<ExplanationRecord> {
        self.explanations
            .iter()
            .filter(|e| e.user == user)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_per_kind() {
        let mut store = InMemoryStore::new();
        assert_eq!(store.next_id(RecordKind::Loan), 1);
        assert_eq!(store.next_id(RecordKind::Loan), 2);
        assert_eq!(store.next_id(RecordKind::Explanation), 1);
        assert_eq!(store.next_id(RecordKind::User), 1);
    }

    #[test]
    fn test_register_user() {
        let mut store = InMemoryStore::new();
        let ada = store.register_user("Ada", "ada@example.com", 720).unwrap();
        assert_eq!(ada.id, 1);
        assert_eq!(ada.income, None);
        let bob = store.register_user("Bob", "bob@example.com", 610).unwrap();
        assert_eq!(bob.id, 2);
        assert_eq!(store.user(2).map(|u| u.name.as_str()), Some("Bob"));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut store = InMemoryStore::new();
        store.register_user("Ada", "ada@example.com", 720).unwrap();
        let err = store
            .register_user("Ada Again", "ADA@example.com", 700)
            .unwrap_err();
        match err {
            LoanDecisionError::InvalidInput { field, reason } => {
                assert_eq!(field, "email");
                assert_eq!(reason, "User already exists.");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_register_validates_fields() {
        let mut store = InMemoryStore::new();
        assert!(store.register_user(" ", "a@b.co", 700).is_err());
        assert!(store.register_user("Ada", "not-an-email", 700).is_err());
        assert!(store.register_user("Ada", "ada@example.com", 900).is_err());
        // Failed registrations consume no ids.
        let ada = store.register_user("Ada", "ada@example.com", 700).unwrap();
        assert_eq!(ada.id, 1);
    }

    #[test]
    fn test_append_for_unknown_user_is_not_found() {
        let mut store = InMemoryStore::new();
        let err = store
            .append_explanation(ExplanationRecord {
                id: 1,
                user: 42,
                credit_score: 700,
                explanation_points: Vec::new(),
                created_at: Utc::now(),
            })
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
