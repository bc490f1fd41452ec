use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use lodgr_core::domain::block::{BlockReference, RoomBlock};
use lodgr_core::domain::booking::{Booking, BookingReference};
use lodgr_core::domain::hotel::{Hotel, PropertyId};
use lodgr_core::domain::room::{RoomType, RoomTypeId};

pub mod block;
pub mod booking;
pub mod room_type;

pub use block::SqlBlockRepository;
pub use booking::SqlBookingRepository;
pub use room_type::SqlRoomTypeRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RoomTypeRepository: Send + Sync {
    async fn find_by_id(&self, id: &RoomTypeId) -> Result<Option<RoomType>, RepositoryError>;
    async fn list_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Vec<RoomType>, RepositoryError>;
    async fn save_hotel(&self, hotel: Hotel) -> Result<(), RepositoryError>;
    async fn save(&self, room_type: RoomType) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_reference(
        &self,
        reference: &BookingReference,
    ) -> Result<Option<Booking>, RepositoryError>;
    async fn list_for_room_type(
        &self,
        room_type_id: &RoomTypeId,
    ) -> Result<Vec<Booking>, RepositoryError>;
}

#[async_trait]
pub trait BlockRepository: Send + Sync {
    async fn find_by_reference(
        &self,
        reference: &BlockReference,
    ) -> Result<Option<RoomBlock>, RepositoryError>;
    /// Blocks that still deduct capacity as of `now` (lazy expiry applied).
    async fn list_active(
        &self,
        room_type_id: &RoomTypeId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RoomBlock>, RepositoryError>;
}
