use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::room::RoomTypeId;
use crate::errors::LedgerError;
use crate::stay::StayRange;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockReference(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Maintenance,
    VipHold,
    Event,
    StaffUse,
    InventoryManagement,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "MAINTENANCE",
            Self::VipHold => "VIP_HOLD",
            Self::Event => "EVENT",
            Self::StaffUse => "STAFF_USE",
            Self::InventoryManagement => "INVENTORY_MANAGEMENT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MAINTENANCE" => Some(Self::Maintenance),
            "VIP_HOLD" => Some(Self::VipHold),
            "EVENT" => Some(Self::Event),
            "STAFF_USE" => Some(Self::StaffUse),
            "INVENTORY_MANAGEMENT" => Some(Self::InventoryManagement),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockStatus {
    Active,
    Released,
    Expired,
}

impl BlockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Released => "RELEASED",
            Self::Expired => "EXPIRED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Self::Active),
            "RELEASED" => Some(Self::Released),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// A non-guest hold on capacity (maintenance, VIP, event, …).
///
/// Expiry is evaluated lazily: the stored status may still read `Active`
/// after `expires_at` has passed, so every consumer must go through
/// [`RoomBlock::is_active_at`] (or the equivalent SQL predicate) rather than
/// trust the stored field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomBlock {
    pub reference: BlockReference,
    pub room_type_id: RoomTypeId,
    pub range: StayRange,
    pub rooms_blocked: u32,
    pub block_type: BlockType,
    pub reason: Option<String>,
    pub blocked_by: Option<String>,
    pub status: BlockStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
    pub release_reason: Option<String>,
}

impl RoomBlock {
    /// Effective activity at `now`, regardless of what the stored status says.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == BlockStatus::Active
            && self.expires_at.map_or(true, |expiry| now < expiry)
    }

    /// The status a reader should report: lazily degrades `Active` to
    /// `Expired` once the expiry has passed.
    pub fn effective_status(&self, now: DateTime<Utc>) -> BlockStatus {
        if self.status == BlockStatus::Active && !self.is_active_at(now) {
            BlockStatus::Expired
        } else {
            self.status
        }
    }

    /// Whether this block deducts rooms on the given date, as of `now`.
    pub fn deducts_on(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        self.is_active_at(now) && self.range.contains(date)
    }

    pub fn release(
        &mut self,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        match self.effective_status(now) {
            BlockStatus::Active => {
                self.status = BlockStatus::Released;
                self.release_reason = reason;
                self.released_at = Some(now);
                Ok(())
            }
            BlockStatus::Released | BlockStatus::Expired => {
                Err(LedgerError::AlreadyReleased(self.reference.0.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};

    use super::{BlockReference, BlockStatus, BlockType, RoomBlock};
    use crate::domain::room::RoomTypeId;
    use crate::errors::LedgerError;
    use crate::stay::StayRange;

    fn block(expires_at: Option<chrono::DateTime<Utc>>) -> RoomBlock {
        RoomBlock {
            reference: BlockReference("BLK20260901EF34AB".to_string()),
            room_type_id: RoomTypeId("grand-hyatt-deluxe-king".to_string()),
            range: StayRange::single_night(NaiveDate::from_ymd_opt(2026, 9, 10).unwrap()),
            rooms_blocked: 2,
            block_type: BlockType::Maintenance,
            reason: Some("lift refurbishment".to_string()),
            blocked_by: Some("ops".to_string()),
            status: BlockStatus::Active,
            expires_at,
            created_at: Utc::now(),
            released_at: None,
            release_reason: None,
        }
    }

    #[test]
    fn expired_block_is_inactive_even_while_stored_active() {
        let now = Utc::now();
        let block = block(Some(now - Duration::hours(1)));

        assert_eq!(block.status, BlockStatus::Active, "stored status lags");
        assert!(!block.is_active_at(now));
        assert_eq!(block.effective_status(now), BlockStatus::Expired);
        assert!(!block.deducts_on(NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(), now));
    }

    #[test]
    fn unexpired_block_deducts_within_range_only() {
        let now = Utc::now();
        let block = block(Some(now + Duration::hours(6)));

        assert!(block.deducts_on(NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(), now));
        assert!(!block.deducts_on(NaiveDate::from_ymd_opt(2026, 9, 11).unwrap(), now));
    }

    #[test]
    fn release_guards_against_replay_and_expiry() {
        let now = Utc::now();

        let mut active = block(None);
        active.release(Some("works finished early".to_string()), now).expect("release");
        assert_eq!(active.status, BlockStatus::Released);
        let error = active.release(None, now).expect_err("second release");
        assert!(matches!(error, LedgerError::AlreadyReleased(_)));

        // An expired block has nothing left to release.
        let mut expired = block(Some(now - Duration::minutes(5)));
        let error = expired.release(None, now).expect_err("release after expiry");
        assert!(matches!(error, LedgerError::AlreadyReleased(_)));
    }
}
