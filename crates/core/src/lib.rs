pub mod availability;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod reference;
pub mod stay;

pub use availability::{AvailabilityReport, NightAvailability};
pub use domain::block::{BlockReference, BlockStatus, BlockType, RoomBlock};
pub use domain::booking::{Booking, BookingReference, BookingStatus, Guest};
pub use domain::hotel::{Hotel, PropertyId};
pub use domain::room::{RoomType, RoomTypeId};
pub use errors::LedgerError;
pub use pricing::{price_stay, NightlyRate, StayQuote};
pub use stay::StayRange;

// Downstream crates use the same chrono/decimal types in their public APIs.
pub use chrono;
pub use rust_decimal;
