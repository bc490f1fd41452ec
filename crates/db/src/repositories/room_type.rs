use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use lodgr_core::domain::hotel::{Hotel, PropertyId};
use lodgr_core::domain::room::{RoomType, RoomTypeId};

use super::{RepositoryError, RoomTypeRepository};
use crate::DbPool;

pub struct SqlRoomTypeRepository {
    pool: DbPool,
}

impl SqlRoomTypeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const ROOM_TYPE_COLUMNS: &str = "room_type_id, property_id, room_name, total_rooms, \
     base_price_per_night, is_active, created_at";

#[async_trait::async_trait]
impl RoomTypeRepository for SqlRoomTypeRepository {
    async fn find_by_id(&self, id: &RoomTypeId) -> Result<Option<RoomType>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE room_type_id = ?"
        ))
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(room_type_from_row).transpose()
    }

    async fn list_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<RoomType>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ROOM_TYPE_COLUMNS} FROM room_types
             WHERE property_id = ?
             ORDER BY room_type_id"
        ))
        .bind(&property_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(room_type_from_row).collect()
    }

    async fn save_hotel(&self, hotel: Hotel) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO hotels (property_id, hotel_name, city_name, country_name, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(property_id) DO UPDATE SET
                hotel_name = excluded.hotel_name,
                city_name = excluded.city_name,
                country_name = excluded.country_name,
                is_active = excluded.is_active",
        )
        .bind(&hotel.property_id.0)
        .bind(&hotel.hotel_name)
        .bind(&hotel.city_name)
        .bind(&hotel.country_name)
        .bind(hotel.is_active)
        .bind(hotel.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, room_type: RoomType) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO room_types (
                room_type_id, property_id, room_name, total_rooms,
                base_price_per_night, is_active, created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(room_type_id) DO UPDATE SET
                property_id = excluded.property_id,
                room_name = excluded.room_name,
                total_rooms = excluded.total_rooms,
                base_price_per_night = excluded.base_price_per_night,
                is_active = excluded.is_active",
        )
        .bind(&room_type.room_type_id.0)
        .bind(&room_type.property_id.0)
        .bind(&room_type.room_name)
        .bind(room_type.total_rooms)
        .bind(room_type.base_price_per_night.to_string())
        .bind(room_type.is_active)
        .bind(room_type.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn room_type_from_row(row: SqliteRow) -> Result<RoomType, RepositoryError> {
    let price_text: String = row.get("base_price_per_night");
    let base_price_per_night = Decimal::from_str(&price_text).map_err(|error| {
        RepositoryError::Decode(format!("base_price_per_night `{price_text}`: {error}"))
    })?;

    Ok(RoomType {
        room_type_id: RoomTypeId(row.get("room_type_id")),
        property_id: PropertyId(row.get("property_id")),
        room_name: row.get("room_name"),
        total_rooms: row.get::<i64, _>("total_rooms") as u32,
        base_price_per_night,
        is_active: row.get("is_active"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}
