use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::hotel::PropertyId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomTypeId(pub String);

/// A sellable room category. `total_rooms` is the fixed physical capacity;
/// availability is always derived from it, never stored alongside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    pub room_type_id: RoomTypeId,
    pub property_id: PropertyId,
    pub room_name: String,
    pub total_rooms: u32,
    pub base_price_per_night: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
