use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tempfile::TempDir;

use lodgr_core::domain::block::{BlockStatus, BlockType};
use lodgr_core::domain::booking::{BookingStatus, Guest};
use lodgr_core::domain::hotel::{Hotel, PropertyId};
use lodgr_core::domain::room::{RoomType, RoomTypeId};
use lodgr_core::stay::StayRange;
use lodgr_db::repositories::{
    BlockRepository, BookingRepository, RoomTypeRepository, SqlBlockRepository,
    SqlBookingRepository, SqlRoomTypeRepository,
};
use lodgr_db::{
    connect_with_settings, migrations, BlockRequest, BookingRequest, DbPool, InventoryLedger,
};

async fn test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("repos.db").display());
    let pool = connect_with_settings(&url, 2, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");
    (dir, pool)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 5, day).expect("valid date")
}

fn sample_room_type(id: &str, total_rooms: u32) -> RoomType {
    RoomType {
        room_type_id: RoomTypeId(id.to_string()),
        property_id: PropertyId("harbour-view".to_string()),
        room_name: "Harbour Room".to_string(),
        total_rooms,
        base_price_per_night: Decimal::new(32000, 2),
        is_active: true,
        created_at: Utc::now(),
    }
}

async fn save_property(pool: &DbPool) -> SqlRoomTypeRepository {
    let repository = SqlRoomTypeRepository::new(pool.clone());
    repository
        .save_hotel(Hotel {
            property_id: PropertyId("harbour-view".to_string()),
            hotel_name: "Harbour View Hotel".to_string(),
            city_name: "Penang".to_string(),
            country_name: "Malaysia".to_string(),
            is_active: true,
            created_at: Utc::now(),
        })
        .await
        .expect("save hotel");
    repository
}

#[tokio::test]
async fn room_types_save_and_read_back() {
    let (_dir, pool) = test_pool().await;
    let repository = save_property(&pool).await;

    repository.save(sample_room_type("harbour-view-sea", 15)).await.expect("save");
    repository.save(sample_room_type("harbour-view-hill", 9)).await.expect("save");
    // Upsert: a capacity change replaces the row rather than duplicating it.
    repository.save(sample_room_type("harbour-view-sea", 14)).await.expect("re-save");

    let found = repository
        .find_by_id(&RoomTypeId("harbour-view-sea".to_string()))
        .await
        .expect("find")
        .expect("present");
    assert_eq!(found.total_rooms, 14);
    assert_eq!(found.base_price_per_night, Decimal::new(32000, 2));

    let listed = repository
        .list_for_property(&PropertyId("harbour-view".to_string()))
        .await
        .expect("list");
    assert_eq!(listed.len(), 2);

    let missing = repository
        .find_by_id(&RoomTypeId("harbour-view-penthouse".to_string()))
        .await
        .expect("find");
    assert!(missing.is_none());
}

#[tokio::test]
async fn bookings_written_by_the_ledger_decode_through_the_repository() {
    let (_dir, pool) = test_pool().await;
    let repository = save_property(&pool).await;
    repository.save(sample_room_type("harbour-view-sea", 15)).await.expect("save");

    let ledger = InventoryLedger::new(pool.clone());
    let sea = RoomTypeId("harbour-view-sea".to_string());
    let stay = StayRange::new(date(10), date(12)).expect("range");
    let confirmation = ledger
        .confirm_booking(BookingRequest::new(sea.clone(), stay, Guest::named("Mei Lin")))
        .await
        .expect("confirm");

    let bookings = SqlBookingRepository::new(pool.clone());
    let booking = bookings
        .find_by_reference(&confirmation.reference)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.stay, stay);
    assert_eq!(booking.total_price, confirmation.total_price);
    assert_eq!(booking.guest.name, "Mei Lin");

    ledger.cancel_booking(&confirmation.reference, Some("typo".to_string())).await.expect("cancel");
    let listed = bookings.list_for_room_type(&sea).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, BookingStatus::Cancelled);
    assert_eq!(listed[0].cancellation_reason.as_deref(), Some("typo"));
}

#[tokio::test]
async fn active_block_listing_applies_lazy_expiry() {
    let (_dir, pool) = test_pool().await;
    let repository = save_property(&pool).await;
    repository.save(sample_room_type("harbour-view-hill", 9)).await.expect("save");

    let ledger = InventoryLedger::new(pool.clone());
    let hill = RoomTypeId("harbour-view-hill".to_string());

    let live = ledger
        .create_block(
            BlockRequest::new(
                hill.clone(),
                StayRange::new(date(20), date(22)).expect("range"),
                2,
                BlockType::Maintenance,
            )
            .with_reason("repainting"),
        )
        .await
        .expect("live block");
    let stale = ledger
        .create_block(
            BlockRequest::new(
                hill.clone(),
                StayRange::new(date(20), date(21)).expect("range"),
                3,
                BlockType::VipHold,
            )
            .with_expiry(Utc::now() + Duration::hours(1)),
        )
        .await
        .expect("expiring block");

    let blocks = SqlBlockRepository::new(pool.clone());
    let active = blocks.list_active(&hill, Utc::now()).await.expect("list");
    assert_eq!(active.len(), 2);

    // Past the expiry the VIP hold drops out of the listing even though its
    // stored status is untouched.
    let later = Utc::now() + Duration::hours(2);
    let active = blocks.list_active(&hill, later).await.expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].reference, live.reference);

    let held = blocks
        .find_by_reference(&stale.reference)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(held.status, BlockStatus::Active, "stored status lags");
    assert_eq!(held.effective_status(later), BlockStatus::Expired);
    assert_eq!(held.rooms_blocked, 3);
}
