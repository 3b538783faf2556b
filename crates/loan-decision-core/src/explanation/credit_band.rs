use serde::{Deserialize, Serialize};

use super::ExplanationEntry;
use crate::{types::*, LoanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditBand {
    pub fn from_score(score: CreditScore) -> Self {
        match score {
            s if s >= 750 => CreditBand::Excellent,
            s if s >= 670 => CreditBand::Good,
            s if s >= 580 => CreditBand::Fair,
            _ => CreditBand::Poor,
        }
    }

    /// (standing, payment history, utilization)
    fn entries(self) -> [(&'static str, &'static str); 3] {
        match self {
            CreditBand::Excellent => [
                (
                    "Excellent Credit Standing",
                    "Your credit score is exceptionally high, indicating a very low risk to lenders. You are likely to qualify for the best interest rates and loan terms.",
                ),
                (
                    "Payment History",
                    "Consistently making on-time payments has significantly contributed to your excellent score. This demonstrates reliability.",
                ),
                (
                    "Credit Utilization",
                    "You are using a very small portion of your available credit, which is a key factor in maintaining a strong credit score.",
                ),
            ],
            CreditBand::Good => [
                (
                    "Good Credit Standing",
                    "Your credit score is good, making you eligible for most loans and credit products at favorable rates.",
                ),
                (
                    "Consistent Payments",
                    "You generally make payments on time, which is positive for your credit health. Keep up the good work!",
                ),
                (
                    "Moderate Credit Utilization",
                    "Your credit utilization is healthy, but there might be room for improvement by keeping balances even lower relative to your credit limits.",
                ),
            ],
            CreditBand::Fair => [
                (
                    "Fair Credit Standing",
                    "Your credit score is fair. While you may qualify for credit, interest rates might be higher, and terms less favorable. There is significant room for improvement.",
                ),
                (
                    "Occasional Late Payments",
                    "Occasional late payments have impacted your score. Focusing on timely payments will be beneficial.",
                ),
                (
                    "Higher Credit Utilization",
                    "You might be using a larger portion of your available credit. Reducing your credit utilization can positively affect your score.",
                ),
            ],
            CreditBand::Poor => [
                (
                    "Poor Credit Standing",
                    "Your credit score indicates high risk to lenders. You may find it difficult to obtain new credit or loans, and those you do get will likely have very high interest rates.",
                ),
                (
                    "History of Late/Missed Payments",
                    "A history of late or missed payments is significantly damaging your credit score. This is the primary area to address.",
                ),
                (
                    "High Credit Utilization",
                    "You are using a very high percentage of your available credit, which is a major red flag for lenders. Work on paying down existing debt.",
                ),
            ],
        }
    }
}

impl std::fmt::Display for CreditBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::Poor => write!(f, "Poor"),
        }
    }
}

/// The three canned explanations for the band a score falls in.
pub fn explain_credit_score(score: CreditScore) -> LoanResult<Vec<ExplanationEntry>> {
    let score = validate_credit_score(score)?;
    Ok(CreditBand::from_score(score)
        .entries()
        .iter()
        .map(|(title, description)| ExplanationEntry::new(*title, *description))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(score: CreditScore) -> Vec<String> {
        explain_credit_score(score)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect()
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(CreditBand::from_score(850), CreditBand::Excellent);
        assert_eq!(CreditBand::from_score(750), CreditBand::Excellent);
        assert_eq!(CreditBand::from_score(749), CreditBand::Good);
        assert_eq!(CreditBand::from_score(670), CreditBand::Good);
        assert_eq!(CreditBand::from_score(669), CreditBand::Fair);
        assert_eq!(CreditBand::from_score(580), CreditBand::Fair);
        assert_eq!(CreditBand::from_score(579), CreditBand::Poor);
    }

    #[test]
    fn test_good_band_titles() {
        assert_eq!(
            titles(720),
            vec![
                "Good Credit Standing",
                "Consistent Payments",
                "Moderate Credit Utilization"
            ]
        );
    }

    #[test]
    fn test_poor_band_titles() {
        assert_eq!(titles(300)[1], "History of Late/Missed Payments");
    }

    #[test]
    fn test_every_band_has_three_entries() {
        for score in [300, 600, 700, 800] {
            assert_eq!(explain_credit_score(score).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(explain_credit_score(0).is_err());
        assert!(explain_credit_score(1000).is_err());
    }
}
