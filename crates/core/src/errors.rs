use chrono::NaiveDate;
use thiserror::Error;

/// Failure taxonomy for ledger operations.
///
/// Every validation failure is raised before any write; a caller never has to
/// distinguish "rejected" from "partially applied". `Retryable` is the only
/// variant after which a retry with the same arguments is meaningful.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid date range: check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange { check_in: NaiveDate, check_out: NaiveDate },
    #[error("requested room count must be at least 1")]
    InvalidRoomCount,
    #[error("insufficient availability on {date}: requested {requested}, available {available}")]
    InsufficientAvailability { date: NaiveDate, requested: u32, available: i64 },
    #[error("no record found for reference `{0}`")]
    NotFound(String),
    #[error("booking `{0}` is already cancelled")]
    AlreadyCancelled(String),
    #[error("block `{0}` is already released")]
    AlreadyReleased(String),
    #[error("transient contention, retry may succeed: {0}")]
    Retryable(String),
    #[error("persistence failure: {0}")]
    Storage(String),
}

impl LedgerError {
    /// True when the caller may retry the same request after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// True for the idempotency guards: the entity is already in the state
    /// the caller was driving it toward.
    pub fn is_idempotent_replay(&self) -> bool {
        matches!(self, Self::AlreadyCancelled(_) | Self::AlreadyReleased(_))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::LedgerError;

    #[test]
    fn insufficient_availability_reports_the_actual_count() {
        let error = LedgerError::InsufficientAvailability {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            requested: 3,
            available: 1,
        };
        assert_eq!(
            error.to_string(),
            "insufficient availability on 2026-03-14: requested 3, available 1"
        );
    }

    #[test]
    fn only_retryable_is_retryable() {
        assert!(LedgerError::Retryable("database is locked".to_string()).is_retryable());
        assert!(!LedgerError::NotFound("BKG1".to_string()).is_retryable());
        assert!(!LedgerError::Storage("disk full".to_string()).is_retryable());
    }

    #[test]
    fn idempotency_guards_are_flagged() {
        assert!(LedgerError::AlreadyCancelled("BKG1".to_string()).is_idempotent_replay());
        assert!(LedgerError::AlreadyReleased("BLK1".to_string()).is_idempotent_replay());
        assert!(!LedgerError::NotFound("BKG1".to_string()).is_idempotent_replay());
    }
}
