use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub property_id: PropertyId,
    pub hotel_name: String,
    pub city_name: String,
    pub country_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
