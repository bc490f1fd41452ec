use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived availability for one room-night. Never stored; always recomputed
/// from capacity minus the two deduction classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightAvailability {
    pub date: NaiveDate,
    pub total_rooms: i64,
    pub booked_rooms: i64,
    pub blocked_rooms: i64,
}

impl NightAvailability {
    pub fn available(&self) -> i64 {
        self.total_rooms - self.booked_rooms - self.blocked_rooms
    }
}

/// Availability over a stay range. The binding constraint for a multi-night
/// stay is the worst single night, so `min_available` governs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub nights: Vec<NightAvailability>,
    pub min_available: i64,
}

impl AvailabilityReport {
    pub fn from_nights(nights: Vec<NightAvailability>) -> Self {
        let min_available =
            nights.iter().map(NightAvailability::available).min().unwrap_or(0);
        Self { nights, min_available }
    }

    pub fn can_accommodate(&self, requested: u32) -> bool {
        self.min_available >= i64::from(requested)
    }

    /// First night that cannot satisfy `requested`, if any. Used to report
    /// the binding date back to the caller on rejection.
    pub fn first_shortfall(&self, requested: u32) -> Option<&NightAvailability> {
        self.nights.iter().find(|night| night.available() < i64::from(requested))
    }
}
