use chrono::{Days, Utc, Weekday};
use chrono::Datelike;
use serde::Serialize;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical demo dataset for local runs and smoke checks: one property,
/// three room types, weekend rate overrides for the next 60 nights.
struct SeedRoomType {
    room_type_id: &'static str,
    room_name: &'static str,
    total_rooms: i64,
    base_price_per_night: &'static str,
    weekend_rate: &'static str,
}

const SEED_PROPERTY_ID: &str = "mandarin-oriental-kl";
const SEED_HOTEL_NAME: &str = "Mandarin Oriental Kuala Lumpur";

const SEED_ROOM_TYPES: &[SeedRoomType] = &[
    SeedRoomType {
        room_type_id: "mandarin-oriental-kl-deluxe-king",
        room_name: "Deluxe King",
        total_rooms: 20,
        base_price_per_night: "450.00",
        weekend_rate: "520.00",
    },
    SeedRoomType {
        room_type_id: "mandarin-oriental-kl-club-suite",
        room_name: "Club Suite",
        total_rooms: 8,
        base_price_per_night: "890.00",
        weekend_rate: "980.00",
    },
    SeedRoomType {
        room_type_id: "mandarin-oriental-kl-twin-towers-view",
        room_name: "Twin Towers View",
        total_rooms: 12,
        base_price_per_night: "620.00",
        weekend_rate: "720.00",
    },
];

const SEED_RATE_HORIZON_DAYS: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub property_id: String,
    pub room_types: usize,
    pub rate_overrides: usize,
}

/// Idempotent: re-running refreshes the same rows rather than duplicating.
pub async fn seed_demo_dataset(pool: &DbPool) -> Result<SeedSummary, RepositoryError> {
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO hotels (property_id, hotel_name, city_name, country_name, is_active, created_at)
         VALUES (?, ?, 'Kuala Lumpur', 'Malaysia', 1, ?)
         ON CONFLICT(property_id) DO UPDATE SET hotel_name = excluded.hotel_name",
    )
    .bind(SEED_PROPERTY_ID)
    .bind(SEED_HOTEL_NAME)
    .bind(now)
    .execute(pool)
    .await?;

    let mut rate_overrides = 0usize;
    for seed in SEED_ROOM_TYPES {
        sqlx::query(
            "INSERT INTO room_types (
                room_type_id, property_id, room_name, total_rooms,
                base_price_per_night, is_active, created_at
             ) VALUES (?, ?, ?, ?, ?, 1, ?)
             ON CONFLICT(room_type_id) DO UPDATE SET
                room_name = excluded.room_name,
                total_rooms = excluded.total_rooms,
                base_price_per_night = excluded.base_price_per_night",
        )
        .bind(seed.room_type_id)
        .bind(SEED_PROPERTY_ID)
        .bind(seed.room_name)
        .bind(seed.total_rooms)
        .bind(seed.base_price_per_night)
        .bind(now)
        .execute(pool)
        .await?;

        // Friday/Saturday nights carry the weekend rate.
        for offset in 0..SEED_RATE_HORIZON_DAYS {
            let date = now.date_naive() + Days::new(offset);
            if !matches!(date.weekday(), Weekday::Fri | Weekday::Sat) {
                continue;
            }
            sqlx::query(
                "INSERT INTO room_rates (room_type_id, stay_date, nightly_rate, updated_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(room_type_id, stay_date) DO UPDATE SET
                    nightly_rate = excluded.nightly_rate,
                    updated_at = excluded.updated_at",
            )
            .bind(seed.room_type_id)
            .bind(date)
            .bind(seed.weekend_rate)
            .bind(now)
            .execute(pool)
            .await?;
            rate_overrides += 1;
        }
    }

    Ok(SeedSummary {
        property_id: SEED_PROPERTY_ID.to_string(),
        room_types: SEED_ROOM_TYPES.len(),
        rate_overrides,
    })
}
