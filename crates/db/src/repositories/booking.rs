use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use lodgr_core::domain::booking::{Booking, BookingReference, BookingStatus, Guest};
use lodgr_core::domain::room::RoomTypeId;
use lodgr_core::stay::StayRange;

use super::{BookingRepository, RepositoryError};
use crate::DbPool;

pub struct SqlBookingRepository {
    pool: DbPool,
}

impl SqlBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "booking_reference, room_type_id, guest_name, guest_email, \
     guest_phone, check_in_date, check_out_date, rooms_booked, total_price, status, \
     cancellation_reason, booked_at, cancelled_at";

#[async_trait::async_trait]
impl BookingRepository for SqlBookingRepository {
    async fn find_by_reference(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_reference = ?"
        ))
        .bind(&reference.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(booking_from_row).transpose()
    }

    async fn list_for_room_type(
        &self,
        room_type_id: &RoomTypeId,
    ) -> Result<Vec<Booking>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE room_type_id = ?
             ORDER BY check_in_date ASC, booking_reference ASC"
        ))
        .bind(&room_type_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(booking_from_row).collect()
    }
}

pub(crate) fn booking_from_row(row: SqliteRow) -> Result<Booking, RepositoryError> {
    let reference: String = row.get("booking_reference");

    let status_text: String = row.get("status");
    let status = BookingStatus::parse(&status_text).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown booking status `{status_text}` on `{reference}`"))
    })?;

    let price_text: String = row.get("total_price");
    let total_price = Decimal::from_str(&price_text).map_err(|error| {
        RepositoryError::Decode(format!("total_price `{price_text}` on `{reference}`: {error}"))
    })?;

    let stay = StayRange::new(
        row.get::<NaiveDate, _>("check_in_date"),
        row.get::<NaiveDate, _>("check_out_date"),
    )
    .map_err(|error| RepositoryError::Decode(format!("stay range on `{reference}`: {error}")))?;

    Ok(Booking {
        reference: BookingReference(reference),
        room_type_id: RoomTypeId(row.get("room_type_id")),
        guest: Guest {
            name: row.get("guest_name"),
            email: row.get("guest_email"),
            phone: row.get("guest_phone"),
        },
        stay,
        rooms_booked: row.get::<i64, _>("rooms_booked") as u32,
        total_price,
        status,
        cancellation_reason: row.get("cancellation_reason"),
        booked_at: row.get::<DateTime<Utc>, _>("booked_at"),
        cancelled_at: row.get::<Option<DateTime<Utc>>, _>("cancelled_at"),
    })
}
