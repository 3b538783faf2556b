//! Demo-data helpers. The engine itself never draws random numbers.

use rand::Rng;

use crate::records::{InMemoryStore, UserProfile};
use crate::{types::*, LoanResult};

/// Uniform over the full bureau range.
pub fn random_credit_score<R: Rng>(rng: &mut R) -> CreditScore {
    rng.gen_range(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE)
}

/// Register a user whose credit score is drawn from `rng`.
pub fn register_with_random_score<R: Rng>(
    store: &mut InMemoryStore,
    name: &str,
    email: &str,
    rng: &mut R,
) -> LoanResult<UserProfile> {
    let score = random_credit_score(rng);
    store.register_user(name, email, score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scores_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let s = random_credit_score(&mut rng);
            assert!((MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&s));
        }
    }

    #[test]
    fn test_seeded_registration_is_reproducible() {
        let mut a = InMemoryStore::new();
        let mut b = InMemoryStore::new();
        let ua = register_with_random_score(&mut a, "Ada", "ada@example.com", &mut StdRng::seed_from_u64(1)).unwrap();
        let ub = register_with_random_score(&mut b, "Ada", "ada@example.com", &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(ua.credit_score, ub.credit_score);
    }
}
