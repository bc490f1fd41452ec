use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Row, Sqlite, SqliteConnection, Transaction};
use tracing::info;

use lodgr_core::availability::{AvailabilityReport, NightAvailability};
use lodgr_core::domain::block::{BlockReference, BlockStatus, BlockType};
use lodgr_core::domain::booking::{BookingReference, BookingStatus, Guest};
use lodgr_core::domain::room::RoomTypeId;
use lodgr_core::errors::LedgerError;
use lodgr_core::pricing::{price_stay, NightlyRate};
use lodgr_core::reference;
use lodgr_core::stay::StayRange;

use crate::DbPool;

/// The date-indexed capacity ledger.
///
/// Availability is never stored: every answer is derived from
/// `total_rooms - confirmed bookings - active blocks` at query time. All
/// write operations run check-then-insert inside a single `BEGIN IMMEDIATE`
/// transaction, so SQLite's writer exclusivity serializes concurrent
/// confirmations for the same room-night and the availability check can
/// never miss a committed deduction.
#[derive(Clone)]
pub struct InventoryLedger {
    pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub available: bool,
    pub min_available: i64,
    pub report: AvailabilityReport,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub room_type_id: RoomTypeId,
    pub stay: StayRange,
    pub guest: Guest,
    pub rooms: u32,
}

impl BookingRequest {
    /// A request for one room; use [`Self::with_rooms`] for more.
    pub fn new(room_type_id: RoomTypeId, stay: StayRange, guest: Guest) -> Self {
        Self { room_type_id, stay, guest, rooms: 1 }
    }

    pub fn with_rooms(mut self, rooms: u32) -> Self {
        self.rooms = rooms;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reference: BookingReference,
    pub total_price: Decimal,
    pub nightly: Vec<NightlyRate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRequest {
    pub room_type_id: RoomTypeId,
    pub range: StayRange,
    pub rooms_blocked: u32,
    pub block_type: BlockType,
    pub reason: Option<String>,
    pub blocked_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl BlockRequest {
    pub fn new(
        room_type_id: RoomTypeId,
        range: StayRange,
        rooms_blocked: u32,
        block_type: BlockType,
    ) -> Self {
        Self {
            room_type_id,
            range,
            rooms_blocked,
            block_type,
            reason: None,
            blocked_by: None,
            expires_at: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_blocked_by(mut self, blocked_by: impl Into<String>) -> Self {
        self.blocked_by = Some(blocked_by.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfirmation {
    pub reference: BlockReference,
}

impl InventoryLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Per-night availability over the range; pure read, no side effects.
    pub async fn availability(
        &self,
        room_type_id: &RoomTypeId,
        stay: &StayRange,
    ) -> Result<AvailabilityReport, LedgerError> {
        let mut conn = self.pool.acquire().await.map_err(storage_error)?;
        let room_type = fetch_room_type(&mut conn, room_type_id).await?;
        compute_report(&mut conn, room_type_id, room_type.total_rooms, stay, Utc::now()).await
    }

    /// The `check_availability` operation: can `requested` rooms be held on
    /// every night of the range? `min_available` is the binding count.
    pub async fn check_availability(
        &self,
        room_type_id: &RoomTypeId,
        stay: &StayRange,
        requested: u32,
    ) -> Result<AvailabilityCheck, LedgerError> {
        let report = self.availability(room_type_id, stay).await?;
        Ok(AvailabilityCheck {
            available: report.can_accommodate(requested),
            min_available: report.min_available,
            report,
        })
    }

    /// Atomically reserves rooms for the stay, or fails without any effect.
    /// On success returns the generated reference and the computed price
    /// (per-date rate overrides applied, summed over nights × rooms).
    pub async fn confirm_booking(
        &self,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, LedgerError> {
        if request.rooms == 0 {
            return Err(LedgerError::InvalidRoomCount);
        }
        let now = Utc::now();
        let mut tx = self.begin_immediate().await?;
        let result = confirm_booking_in_tx(&mut tx, &request, now).await;
        let confirmation = finish(tx, result).await?;

        info!(
            event_name = "ledger.booking.confirmed",
            booking_reference = %confirmation.reference.0,
            room_type_id = %request.room_type_id.0,
            rooms = request.rooms,
            nights = request.stay.nights(),
            total_price = %confirmation.total_price,
            "booking confirmed"
        );
        Ok(confirmation)
    }

    /// Releases a confirmed booking's rooms back to the pool. The row is
    /// kept (status flip only) so the audit trail survives.
    pub async fn cancel_booking(
        &self,
        booking_reference: &BookingReference,
        reason: Option<String>,
    ) -> Result<(), LedgerError> {
        let now = Utc::now();
        let mut tx = self.begin_immediate().await?;
        let result = cancel_booking_in_tx(&mut tx, booking_reference, reason, now).await;
        finish(tx, result).await?;

        info!(
            event_name = "ledger.booking.cancelled",
            booking_reference = %booking_reference.0,
            "booking cancelled"
        );
        Ok(())
    }

    /// Withholds capacity for a non-guest reason. The requested count is
    /// validated against current derived availability, not just total
    /// capacity, inside the same write transaction as the insert.
    pub async fn create_block(
        &self,
        request: BlockRequest,
    ) -> Result<BlockConfirmation, LedgerError> {
        if request.rooms_blocked == 0 {
            return Err(LedgerError::InvalidRoomCount);
        }
        let now = Utc::now();
        let mut tx = self.begin_immediate().await?;
        let result = create_block_in_tx(&mut tx, &request, now).await;
        let confirmation = finish(tx, result).await?;

        info!(
            event_name = "ledger.block.created",
            block_reference = %confirmation.reference.0,
            room_type_id = %request.room_type_id.0,
            rooms_blocked = request.rooms_blocked,
            block_type = request.block_type.as_str(),
            "room block created"
        );
        Ok(confirmation)
    }

    pub async fn release_block(
        &self,
        block_reference: &BlockReference,
        reason: Option<String>,
    ) -> Result<(), LedgerError> {
        let now = Utc::now();
        let mut tx = self.begin_immediate().await?;
        let result = release_block_in_tx(&mut tx, block_reference, reason, now).await;
        finish(tx, result).await?;

        info!(
            event_name = "ledger.block.released",
            block_reference = %block_reference.0,
            "room block released"
        );
        Ok(())
    }

    /// Cosmetic sweep marking past-expiry ACTIVE blocks as EXPIRED. Reads
    /// never depend on it: the availability queries apply the expiry
    /// predicate themselves.
    pub async fn sweep_expired_blocks(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let swept = sqlx::query(
            "UPDATE room_blocks
             SET status = 'EXPIRED'
             WHERE status = 'ACTIVE' AND expires_at IS NOT NULL AND expires_at <= ?",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?
        .rows_affected();

        if swept > 0 {
            info!(event_name = "ledger.block.swept", swept, "expired blocks marked");
        }
        Ok(swept)
    }

    // Takes the write lock up front: the availability check inside the
    // transaction cannot race another writer's commit. The transaction rolls
    // back when dropped, so an abandoned caller (a disconnected HTTP client,
    // a cancelled task) leaves neither the lock nor partial writes behind.
    async fn begin_immediate(&self) -> Result<Transaction<'static, Sqlite>, LedgerError> {
        self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(storage_error)
    }
}

async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    result: Result<T, LedgerError>,
) -> Result<T, LedgerError> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(storage_error)?;
            Ok(value)
        }
        Err(error) => {
            // Rollback failures are unreported: the original error is the one
            // the caller must see.
            let _ = tx.rollback().await;
            Err(error)
        }
    }
}

struct RoomTypeCapacity {
    total_rooms: i64,
    base_price_per_night: Decimal,
}

async fn fetch_room_type(
    conn: &mut SqliteConnection,
    room_type_id: &RoomTypeId,
) -> Result<RoomTypeCapacity, LedgerError> {
    let row = sqlx::query(
        "SELECT total_rooms, base_price_per_night FROM room_types
         WHERE room_type_id = ? AND is_active = 1",
    )
    .bind(&room_type_id.0)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_error)?
    .ok_or_else(|| LedgerError::NotFound(room_type_id.0.clone()))?;

    let price_text: String = row.get("base_price_per_night");
    let base_price_per_night = Decimal::from_str(&price_text).map_err(|error| {
        LedgerError::Storage(format!(
            "base_price_per_night `{price_text}` on `{}`: {error}",
            room_type_id.0
        ))
    })?;

    Ok(RoomTypeCapacity { total_rooms: row.get("total_rooms"), base_price_per_night })
}

async fn night_availability(
    conn: &mut SqliteConnection,
    room_type_id: &RoomTypeId,
    total_rooms: i64,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<NightAvailability, LedgerError> {
    let booked_rooms: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(rooms_booked), 0) FROM bookings
         WHERE room_type_id = ?
           AND status = 'CONFIRMED'
           AND check_in_date <= ? AND check_out_date > ?",
    )
    .bind(&room_type_id.0)
    .bind(date)
    .bind(date)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage_error)?;

    // Lazy expiry: a block past expires_at is excluded here even while its
    // stored status still reads ACTIVE.
    let blocked_rooms: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(rooms_blocked), 0) FROM room_blocks
         WHERE room_type_id = ?
           AND status = 'ACTIVE'
           AND start_date <= ? AND end_date > ?
           AND (expires_at IS NULL OR expires_at > ?)",
    )
    .bind(&room_type_id.0)
    .bind(date)
    .bind(date)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(NightAvailability { date, total_rooms, booked_rooms, blocked_rooms })
}

async fn compute_report(
    conn: &mut SqliteConnection,
    room_type_id: &RoomTypeId,
    total_rooms: i64,
    stay: &StayRange,
    now: DateTime<Utc>,
) -> Result<AvailabilityReport, LedgerError> {
    let mut nights = Vec::with_capacity(stay.nights() as usize);
    for date in stay.iter_nights() {
        nights.push(night_availability(conn, room_type_id, total_rooms, date, now).await?);
    }
    Ok(AvailabilityReport::from_nights(nights))
}

async fn ensure_capacity(
    conn: &mut SqliteConnection,
    room_type_id: &RoomTypeId,
    total_rooms: i64,
    range: &StayRange,
    requested: u32,
    now: DateTime<Utc>,
) -> Result<(), LedgerError> {
    let report = compute_report(conn, room_type_id, total_rooms, range, now).await?;
    if let Some(shortfall) = report.first_shortfall(requested) {
        return Err(LedgerError::InsufficientAvailability {
            date: shortfall.date,
            requested,
            available: shortfall.available(),
        });
    }
    Ok(())
}

async fn confirm_booking_in_tx(
    conn: &mut SqliteConnection,
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingConfirmation, LedgerError> {
    let room_type = fetch_room_type(conn, &request.room_type_id).await?;
    ensure_capacity(
        conn,
        &request.room_type_id,
        room_type.total_rooms,
        &request.stay,
        request.rooms,
        now,
    )
    .await?;

    let overrides = rate_overrides(conn, &request.room_type_id, &request.stay).await?;
    let quote = price_stay(&request.stay, room_type.base_price_per_night, &overrides, request.rooms);
    let booking_reference = reference::booking_reference(now);

    sqlx::query(
        "INSERT INTO bookings (
            booking_reference, room_type_id, guest_name, guest_email, guest_phone,
            check_in_date, check_out_date, rooms_booked, total_price, status, booked_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&booking_reference.0)
    .bind(&request.room_type_id.0)
    .bind(&request.guest.name)
    .bind(&request.guest.email)
    .bind(&request.guest.phone)
    .bind(request.stay.check_in())
    .bind(request.stay.check_out())
    .bind(i64::from(request.rooms))
    .bind(quote.total.to_string())
    .bind(BookingStatus::Confirmed.as_str())
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(BookingConfirmation {
        reference: booking_reference,
        total_price: quote.total,
        nightly: quote.nightly,
    })
}

async fn cancel_booking_in_tx(
    conn: &mut SqliteConnection,
    booking_reference: &BookingReference,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), LedgerError> {
    let status_text: Option<String> =
        sqlx::query_scalar("SELECT status FROM bookings WHERE booking_reference = ?")
            .bind(&booking_reference.0)
            .fetch_optional(&mut *conn)
            .await
            .map_err(storage_error)?;

    let status_text =
        status_text.ok_or_else(|| LedgerError::NotFound(booking_reference.0.clone()))?;
    match BookingStatus::parse(&status_text) {
        Some(BookingStatus::Confirmed) => {}
        Some(BookingStatus::Cancelled) => {
            return Err(LedgerError::AlreadyCancelled(booking_reference.0.clone()));
        }
        None => {
            return Err(LedgerError::Storage(format!(
                "unknown booking status `{status_text}` on `{}`",
                booking_reference.0
            )));
        }
    }

    sqlx::query(
        "UPDATE bookings
         SET status = ?, cancellation_reason = ?, cancelled_at = ?
         WHERE booking_reference = ?",
    )
    .bind(BookingStatus::Cancelled.as_str())
    .bind(reason)
    .bind(now)
    .bind(&booking_reference.0)
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(())
}

async fn create_block_in_tx(
    conn: &mut SqliteConnection,
    request: &BlockRequest,
    now: DateTime<Utc>,
) -> Result<BlockConfirmation, LedgerError> {
    let room_type = fetch_room_type(conn, &request.room_type_id).await?;
    ensure_capacity(
        conn,
        &request.room_type_id,
        room_type.total_rooms,
        &request.range,
        request.rooms_blocked,
        now,
    )
    .await?;

    let block_reference = reference::block_reference(now);
    sqlx::query(
        "INSERT INTO room_blocks (
            block_reference, room_type_id, start_date, end_date, rooms_blocked,
            block_type, reason, blocked_by, status, expires_at, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&block_reference.0)
    .bind(&request.room_type_id.0)
    .bind(request.range.check_in())
    .bind(request.range.check_out())
    .bind(i64::from(request.rooms_blocked))
    .bind(request.block_type.as_str())
    .bind(&request.reason)
    .bind(&request.blocked_by)
    .bind(BlockStatus::Active.as_str())
    .bind(request.expires_at)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(BlockConfirmation { reference: block_reference })
}

async fn release_block_in_tx(
    conn: &mut SqliteConnection,
    block_reference: &BlockReference,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), LedgerError> {
    let row = sqlx::query(
        "SELECT status, expires_at FROM room_blocks WHERE block_reference = ?",
    )
    .bind(&block_reference.0)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_error)?
    .ok_or_else(|| LedgerError::NotFound(block_reference.0.clone()))?;

    let status_text: String = row.get("status");
    let expires_at: Option<DateTime<Utc>> = row.get("expires_at");

    match BlockStatus::parse(&status_text) {
        Some(BlockStatus::Active) => {
            // A block past its expiry has nothing left to release; effective
            // status wins over the stored field.
            if expires_at.is_some_and(|expiry| expiry <= now) {
                return Err(LedgerError::AlreadyReleased(block_reference.0.clone()));
            }
        }
        Some(BlockStatus::Released) | Some(BlockStatus::Expired) => {
            return Err(LedgerError::AlreadyReleased(block_reference.0.clone()));
        }
        None => {
            return Err(LedgerError::Storage(format!(
                "unknown block status `{status_text}` on `{}`",
                block_reference.0
            )));
        }
    }

    sqlx::query(
        "UPDATE room_blocks
         SET status = ?, release_reason = ?, released_at = ?
         WHERE block_reference = ?",
    )
    .bind(BlockStatus::Released.as_str())
    .bind(reason)
    .bind(now)
    .bind(&block_reference.0)
    .execute(&mut *conn)
    .await
    .map_err(storage_error)?;

    Ok(())
}

async fn rate_overrides(
    conn: &mut SqliteConnection,
    room_type_id: &RoomTypeId,
    stay: &StayRange,
) -> Result<HashMap<NaiveDate, Decimal>, LedgerError> {
    let rows = sqlx::query(
        "SELECT stay_date, nightly_rate FROM room_rates
         WHERE room_type_id = ? AND stay_date >= ? AND stay_date < ?",
    )
    .bind(&room_type_id.0)
    .bind(stay.check_in())
    .bind(stay.check_out())
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_error)?;

    let mut overrides = HashMap::with_capacity(rows.len());
    for row in rows {
        let date: NaiveDate = row.get("stay_date");
        let rate_text: String = row.get("nightly_rate");
        let rate = Decimal::from_str(&rate_text).map_err(|error| {
            LedgerError::Storage(format!("nightly_rate `{rate_text}` on {date}: {error}"))
        })?;
        overrides.insert(date, rate);
    }
    Ok(overrides)
}

fn storage_error(error: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(db_error) = &error {
        let message = db_error.message().to_ascii_lowercase();
        if message.contains("locked") || message.contains("busy") {
            return LedgerError::Retryable(db_error.message().to_string());
        }
    }
    if matches!(error, sqlx::Error::PoolTimedOut) {
        return LedgerError::Retryable("connection pool timed out".to_string());
    }
    LedgerError::Storage(error.to_string())
}
