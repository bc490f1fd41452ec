use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use lodgr_core::availability::NightAvailability;
use lodgr_core::domain::block::{BlockReference, BlockType};
use lodgr_core::domain::booking::{BookingReference, Guest};
use lodgr_core::domain::room::RoomTypeId;
use lodgr_core::errors::LedgerError;
use lodgr_core::pricing::NightlyRate;
use lodgr_core::stay::StayRange;
use lodgr_db::repositories::{
    BlockRepository, BookingRepository, RepositoryError, SqlBlockRepository, SqlBookingRepository,
};
use lodgr_db::{BlockRequest, BookingRequest, DbPool, InventoryLedger};

/// The operation contract consumed by the conversational agent layer. Each
/// route maps 1:1 onto a ledger operation; the ledger owns all invariants.
#[derive(Clone)]
pub struct ApiState {
    ledger: InventoryLedger,
    db_pool: DbPool,
}

pub fn router(ledger: InventoryLedger, db_pool: DbPool) -> Router {
    Router::new()
        .route("/availability", get(check_availability))
        .route("/bookings", post(confirm_booking))
        .route("/bookings/{reference}", get(get_booking))
        .route("/bookings/{reference}/cancel", post(cancel_booking))
        .route("/blocks", post(create_block))
        .route("/blocks/{reference}", get(get_block))
        .route("/blocks/{reference}/release", post(release_block))
        .with_state(ApiState { ledger, db_pool })
}

#[derive(Debug)]
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        Self(error)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(inner) => {
                Self(LedgerError::Storage(inner.to_string()))
            }
            RepositoryError::Decode(message) => Self(LedgerError::Storage(message)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_class) = match &self.0 {
            LedgerError::InvalidDateRange { .. } => (StatusCode::BAD_REQUEST, "invalid_date_range"),
            LedgerError::InvalidRoomCount => (StatusCode::BAD_REQUEST, "invalid_room_count"),
            LedgerError::InsufficientAvailability { .. } => {
                (StatusCode::CONFLICT, "insufficient_availability")
            }
            LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            LedgerError::AlreadyCancelled(_) => (StatusCode::CONFLICT, "already_cancelled"),
            LedgerError::AlreadyReleased(_) => (StatusCode::CONFLICT, "already_released"),
            LedgerError::Retryable(_) => (StatusCode::SERVICE_UNAVAILABLE, "retryable"),
            LedgerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
        };

        // Availability rejections carry the actual count so the agent layer
        // can offer alternatives instead of a bare failure.
        let mut body = json!({
            "error_class": error_class,
            "message": self.0.to_string(),
        });
        if let LedgerError::InsufficientAvailability { date, requested, available } = &self.0 {
            body["date"] = json!(date);
            body["requested"] = json!(requested);
            body["available"] = json!(available);
        }

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub room_type_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub min_available: i64,
    pub nights: Vec<NightAvailability>,
}

async fn check_availability(
    State(state): State<ApiState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let stay = StayRange::new(query.check_in, query.check_out)?;
    let check = state
        .ledger
        .check_availability(&RoomTypeId(query.room_type_id), &stay, query.count)
        .await?;

    Ok(Json(AvailabilityResponse {
        available: check.available,
        min_available: check.min_available,
        nights: check.report.nights,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmBookingBody {
    pub room_type_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest: Guest,
    #[serde(default = "default_count")]
    pub rooms: u32,
}

#[derive(Debug, Serialize)]
pub struct BookingConfirmedResponse {
    pub booking_reference: String,
    pub total_price: Decimal,
    pub nightly: Vec<NightlyRate>,
}

async fn confirm_booking(
    State(state): State<ApiState>,
    Json(body): Json<ConfirmBookingBody>,
) -> Result<(StatusCode, Json<BookingConfirmedResponse>), ApiError> {
    let stay = StayRange::new(body.check_in, body.check_out)?;
    let request = BookingRequest::new(RoomTypeId(body.room_type_id), stay, body.guest)
        .with_rooms(body.rooms);
    let confirmation = state.ledger.confirm_booking(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingConfirmedResponse {
            booking_reference: confirmation.reference.0,
            total_price: confirmation.total_price,
            nightly: confirmation.nightly,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonBody {
    pub reason: Option<String>,
}

async fn cancel_booking(
    State(state): State<ApiState>,
    Path(reference): Path<String>,
    body: Option<Json<ReasonBody>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reason = body.and_then(|Json(body)| body.reason);
    state.ledger.cancel_booking(&BookingReference(reference.clone()), reason).await?;
    Ok(Json(json!({ "booking_reference": reference, "status": "CANCELLED" })))
}

async fn get_booking(
    State(state): State<ApiState>,
    Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repository = SqlBookingRepository::new(state.db_pool.clone());
    let booking = repository
        .find_by_reference(&BookingReference(reference.clone()))
        .await?
        .ok_or(LedgerError::NotFound(reference))?;
    Ok(Json(serde_json::to_value(&booking).map_err(|error| {
        LedgerError::Storage(format!("booking serialization failed: {error}"))
    })?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockBody {
    pub room_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rooms_blocked: u32,
    pub block_type: BlockType,
    pub reason: Option<String>,
    pub blocked_by: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

async fn create_block(
    State(state): State<ApiState>,
    Json(body): Json<CreateBlockBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let range = StayRange::new(body.start_date, body.end_date)?;
    let mut request = BlockRequest::new(
        RoomTypeId(body.room_type_id),
        range,
        body.rooms_blocked,
        body.block_type,
    );
    request.reason = body.reason;
    request.blocked_by = body.blocked_by;
    request.expires_at = body.expires_at;

    let confirmation = state.ledger.create_block(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "block_reference": confirmation.reference.0 })),
    ))
}

async fn release_block(
    State(state): State<ApiState>,
    Path(reference): Path<String>,
    body: Option<Json<ReasonBody>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reason = body.and_then(|Json(body)| body.reason);
    state.ledger.release_block(&BlockReference(reference.clone()), reason).await?;
    Ok(Json(json!({ "block_reference": reference, "status": "RELEASED" })))
}

async fn get_block(
    State(state): State<ApiState>,
    Path(reference): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repository = SqlBlockRepository::new(state.db_pool.clone());
    let block = repository
        .find_by_reference(&BlockReference(reference.clone()))
        .await?
        .ok_or(LedgerError::NotFound(reference))?;

    let mut value = serde_json::to_value(&block).map_err(|error| {
        LedgerError::Storage(format!("block serialization failed: {error}"))
    })?;
    // Report the lazily-derived status, not the possibly stale stored one.
    value["effective_status"] = json!(block.effective_status(Utc::now()));
    Ok(Json(value))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use chrono::{Days, Utc};
    use tempfile::TempDir;

    use lodgr_core::domain::block::BlockType;
    use lodgr_core::domain::booking::Guest;
    use lodgr_db::{connect_with_settings, migrations, seed_demo_dataset, InventoryLedger};

    use super::{
        cancel_booking, check_availability, confirm_booking, create_block, ApiState,
        AvailabilityQuery, ConfirmBookingBody, CreateBlockBody, ReasonBody,
    };

    async fn seeded_state() -> (TempDir, ApiState) {
        let dir = TempDir::new().expect("temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
        let pool = connect_with_settings(&url, 2, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        seed_demo_dataset(&pool).await.expect("seed");
        (dir, ApiState { ledger: InventoryLedger::new(pool.clone()), db_pool: pool })
    }

    #[tokio::test]
    async fn booking_flow_over_the_http_contract() {
        let (_dir, state) = seeded_state().await;
        let check_in = Utc::now().date_naive() + Days::new(30);
        let check_out = check_in + Days::new(2);

        let (status, confirmed) = confirm_booking(
            State(state.clone()),
            Json(ConfirmBookingBody {
                room_type_id: "mandarin-oriental-kl-club-suite".to_string(),
                check_in,
                check_out,
                guest: Guest::named("Imran"),
                rooms: 2,
            }),
        )
        .await
        .expect("confirm");
        assert_eq!(status, StatusCode::CREATED);
        assert!(confirmed.0.booking_reference.starts_with("BKG"));

        let availability = check_availability(
            State(state.clone()),
            Query(AvailabilityQuery {
                room_type_id: "mandarin-oriental-kl-club-suite".to_string(),
                check_in,
                check_out,
                count: 1,
            }),
        )
        .await
        .expect("availability");
        assert_eq!(availability.0.min_available, 6); // 8 total - 2 booked

        cancel_booking(
            State(state.clone()),
            Path(confirmed.0.booking_reference.clone()),
            Some(Json(ReasonBody { reason: Some("guest request".to_string()) })),
        )
        .await
        .expect("cancel");

        let replay = cancel_booking(
            State(state),
            Path(confirmed.0.booking_reference),
            None,
        )
        .await
        .expect_err("replayed cancel");
        let response = replay.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn overcommitted_block_maps_to_conflict() {
        let (_dir, state) = seeded_state().await;
        let start = Utc::now().date_naive() + Days::new(10);

        let error = create_block(
            State(state),
            Json(CreateBlockBody {
                room_type_id: "mandarin-oriental-kl-club-suite".to_string(),
                start_date: start,
                end_date: start + Days::new(1),
                rooms_blocked: 9, // capacity is 8
                block_type: BlockType::Maintenance,
                reason: None,
                blocked_by: None,
                expires_at: None,
            }),
        )
        .await
        .expect_err("over capacity");
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
