use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanDecisionError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanDecisionError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanDecisionError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Arithmetic on `field` left the range a `Decimal` can hold.
    pub(crate) fn too_large(field: &str, label: &str) -> Self {
        Self::invalid(field, format!("{label} is too large to evaluate."))
    }

    /// HTTP-equivalent status code for the enclosing service.
    pub fn status_code(&self) -> u16 {
        match self {
            LoanDecisionError::InvalidInput { .. } => 400,
            LoanDecisionError::Unauthorized(_) => 401,
            LoanDecisionError::NotFound { .. } => 404,
            LoanDecisionError::SerializationError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for LoanDecisionError {
    fn from(e: serde_json::Error) -> Self {
        LoanDecisionError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(LoanDecisionError::invalid("income", "must be positive").status_code(), 400);
        assert_eq!(LoanDecisionError::Unauthorized("no token".into()).status_code(), 401);
        let missing = LoanDecisionError::NotFound {
            entity: "User".into(),
            id: "7".into(),
        };
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.to_string(), "User not found: 7");
    }

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = LoanDecisionError::invalid("termPeriods", "Term must be a positive integer.");
        assert_eq!(
            err.to_string(),
            "Invalid input: termPeriods — Term must be a positive integer."
        );
    }
}
