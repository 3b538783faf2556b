use loan_decision_core::decision::{ApprovalStatus, EngineConfig};
use loan_decision_core::records::{
    InMemoryStore, LoanRepository, LoanService, ProfileUpdate, RecordKind, StaticTokens,
};
use loan_decision_core::{LoanDecisionError, TermUnit};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;

fn member_service() -> LoanService<InMemoryStore, StaticTokens> {
    let mut store = InMemoryStore::new();
    let ada = store.register_user("Ada", "ada@example.com", 720).unwrap();
    let bob = store.register_user("Bob", "bob@example.com", 560).unwrap();
    let tokens = StaticTokens::new()
        .with_token("ada", ada.id)
        .with_token("bob", bob.id);
    LoanService::new(store, tokens, EngineConfig::member())
}

fn request(amount: u32, term: u32) -> serde_json::Value {
    json!({ "income": 50000, "expenses": 10000, "amount": amount, "term": term })
}

#[test]
fn test_receipt_shape() {
    let mut svc = member_service();
    let receipt = svc.calculate("Bearer ada", &request(100_000, 5)).unwrap();
    let v = serde_json::to_value(&receipt).unwrap();
    assert_eq!(v["loanId"], json!(1));
    assert_eq!(v["periodicPayment"], json!("1957.99"));
    assert_eq!(v["approvalProbability"], json!(95.0));
    assert_eq!(v["approvalStatus"], json!("Approved"));
    assert_eq!(v["message"], json!("Loan calculation successful"));
}

#[test]
fn test_stored_score_drives_decision() {
    let mut svc = member_service();
    let ada = svc.calculate("ada", &request(100_000, 5)).unwrap();
    let bob = svc.calculate("bob", &request(100_000, 5)).unwrap();
    assert_eq!(ada.response.approval_status, ApprovalStatus::Approved);
    assert_eq!(bob.response.approval_status, ApprovalStatus::Rejected);
    // Request-supplied scores are ignored in favour of the profile.
    let spoofed = svc
        .calculate(
            "bob",
            &json!({ "income": 50000, "expenses": 10000, "amount": 100000, "term": 5, "creditScore": 840 }),
        )
        .unwrap();
    assert_eq!(spoofed.response.approval_status, ApprovalStatus::Rejected);
}

#[test]
fn test_history_is_per_user_and_newest_first() {
    let mut svc = member_service();
    svc.calculate("ada", &request(100_000, 5)).unwrap();
    svc.calculate("bob", &request(50_000, 3)).unwrap();
    svc.calculate("ada", &request(200_000, 10)).unwrap();

    let history = svc.history("ada").unwrap();
    let ids: Vec<u64> = history.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![3, 1]);
    assert!(history.iter().all(|l| l.term_unit == TermUnit::Years));
    assert_eq!(history[0].principal, dec!(200000));

    let bob = svc.history("bob").unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].id, 2);
}

#[test]
fn test_explain_records_explanation() {
    let mut svc = member_service();
    let resp = svc.explain("ada").unwrap();
    assert_eq!(resp.credit_score, Some(720));
    assert_eq!(resp.explanation_points[0].title, "Good Credit Standing");

    let records = svc.explanations("ada").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].explanation_points, resp.explanation_points);
    assert!(svc.explanations("bob").unwrap().is_empty());
}

#[test]
fn test_profile_update_changes_future_decisions() {
    let mut svc = member_service();
    svc.update_profile(
        "bob",
        ProfileUpdate {
            credit_score: Some(780),
            name: Some("Robert".into()),
            ..ProfileUpdate::default()
        },
    )
    .unwrap();
    let profile = svc.profile("bob").unwrap();
    assert_eq!(profile.name, "Robert");
    assert_eq!(profile.email, "bob@example.com");

    let receipt = svc.calculate("bob", &request(100_000, 5)).unwrap();
    assert_eq!(receipt.response.approval_status, ApprovalStatus::Approved);
}

#[test]
fn test_profile_update_changes_email() {
    let mut svc = member_service();
    let update: ProfileUpdate =
        serde_json::from_value(json!({ "email": " Robert@Example.com " })).unwrap();
    let profile = svc.update_profile("bob", update).unwrap();
    assert_eq!(profile.email, "Robert@Example.com");

    // keeping your own address, in any case, is not a conflict
    let same = ProfileUpdate {
        email: Some("robert@example.com".into()),
        ..ProfileUpdate::default()
    };
    assert_eq!(svc.update_profile("bob", same).unwrap().email, "robert@example.com");
}

#[test]
fn test_profile_update_rejects_taken_email() {
    let mut svc = member_service();
    let err = svc
        .update_profile(
            "bob",
            ProfileUpdate {
                email: Some("ADA@example.com".into()),
                name: Some("Robert".into()),
                ..ProfileUpdate::default()
            },
        )
        .unwrap_err();
    match err {
        LoanDecisionError::InvalidInput { field, .. } => assert_eq!(field, "email"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
    let profile = svc.profile("bob").unwrap();
    assert_eq!(profile.email, "bob@example.com");
    assert_eq!(profile.name, "Bob");
}

#[test]
fn test_profile_update_from_json() {
    let update: ProfileUpdate = serde_json::from_value(json!({ "income": "65000" })).unwrap();
    assert_eq!(update.income, Some(dec!(65000)));
    assert_eq!(update.credit_score, None);
}

#[test]
fn test_auth_failures() {
    let mut svc = member_service();
    let err = svc.calculate("", &request(1_000, 1)).unwrap_err();
    assert!(matches!(err, LoanDecisionError::Unauthorized(_)));
    assert_eq!(err.to_string(), "Not authorized: no token");
    let err = svc.history("mallory").unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[test]
fn test_repository_sequences() {
    let mut store = InMemoryStore::new();
    store.register_user("Ada", "ada@example.com", 700).unwrap();
    assert_eq!(store.next_id(RecordKind::User), 2);
    assert_eq!(store.next_id(RecordKind::Loan), 1);
    let found = store.find_user(&|u| u.email == "ada@example.com").unwrap();
    assert_eq!(found.id, 1);
}

#[cfg(feature = "seed")]
mod seeded {
    use loan_decision_core::records::InMemoryStore;
    use loan_decision_core::seed::register_with_random_score;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_users_have_valid_scores() {
        let mut store = InMemoryStore::new();
        let mut rng = StdRng::seed_from_u64(42);
        for i in 0..20 {
            let user = register_with_random_score(
                &mut store,
                &format!("User {i}"),
                &format!("user{i}@example.com"),
                &mut rng,
            )
            .unwrap();
            assert!((300..=850).contains(&user.credit_score));
        }
    }
}
