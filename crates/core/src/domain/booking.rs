use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::room::RoomTypeId;
use crate::errors::LedgerError;
use crate::stay::StayRange;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingReference(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Guest {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), email: None, phone: None }
    }
}

/// A reservation of `rooms_booked` rooms for every night of `stay`.
///
/// Cancelled bookings are retained for audit; only `Confirmed` rows enter the
/// availability sum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub reference: BookingReference,
    pub room_type_id: RoomTypeId,
    pub guest: Guest,
    pub stay: StayRange,
    pub rooms_booked: u32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub booked_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Whether this booking deducts rooms on the given date.
    pub fn deducts_on(&self, date: chrono::NaiveDate) -> bool {
        self.status == BookingStatus::Confirmed && self.stay.contains(date)
    }

    /// Cancellation is the only transition a booking ever makes.
    pub fn cancel(
        &mut self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        match self.status {
            BookingStatus::Confirmed => {
                self.status = BookingStatus::Cancelled;
                self.cancellation_reason = reason;
                self.cancelled_at = Some(now);
                Ok(())
            }
            BookingStatus::Cancelled => {
                Err(LedgerError::AlreadyCancelled(self.reference.0.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::{Booking, BookingReference, BookingStatus, Guest};
    use crate::domain::room::RoomTypeId;
    use crate::errors::LedgerError;
    use crate::stay::StayRange;

    fn booking() -> Booking {
        let stay = StayRange::new(
            NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
        )
        .unwrap();
        Booking {
            reference: BookingReference("BKG20260901AB12CD".to_string()),
            room_type_id: RoomTypeId("grand-hyatt-deluxe-king".to_string()),
            guest: Guest::named("Amira Tan"),
            stay,
            rooms_booked: 1,
            total_price: Decimal::new(70000, 2),
            status: BookingStatus::Confirmed,
            cancellation_reason: None,
            booked_at: Utc::now(),
            cancelled_at: None,
        }
    }

    #[test]
    fn confirmed_booking_deducts_only_inside_stay() {
        let booking = booking();
        assert!(booking.deducts_on(NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()));
        assert!(!booking.deducts_on(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()));
    }

    #[test]
    fn cancellation_is_terminal_and_idempotency_guarded() {
        let mut booking = booking();
        booking.cancel(Some("plans changed".to_string()), Utc::now()).expect("first cancel");
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(!booking.deducts_on(NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()));

        let error = booking.cancel(None, Utc::now()).expect_err("second cancel");
        assert!(matches!(error, LedgerError::AlreadyCancelled(_)));
        assert_eq!(
            booking.cancellation_reason.as_deref(),
            Some("plans changed"),
            "replayed cancel must not overwrite the audit trail",
        );
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        assert_eq!(BookingStatus::parse(BookingStatus::Confirmed.as_str()), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("COMPLETED"), None);
    }
}
