use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::block::BlockReference;
use crate::domain::booking::BookingReference;

// References are shown to guests and operators, so they keep the upstream
// human-readable shape: prefix + issue date + a short uuid fragment.

pub fn booking_reference(now: DateTime<Utc>) -> BookingReference {
    BookingReference(reference_with_prefix("BKG", now))
}

pub fn block_reference(now: DateTime<Utc>) -> BlockReference {
    BlockReference(reference_with_prefix("BLK", now))
}

fn reference_with_prefix(prefix: &str, now: DateTime<Utc>) -> String {
    let fragment: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();
    format!("{prefix}{}{fragment}", now.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{block_reference, booking_reference};

    #[test]
    fn references_carry_prefix_and_issue_date() {
        let now = Utc.with_ymd_and_hms(2026, 9, 10, 12, 0, 0).unwrap();

        let booking = booking_reference(now).0;
        assert!(booking.starts_with("BKG20260910"));
        assert_eq!(booking.len(), "BKG20260910".len() + 6);

        let block = block_reference(now).0;
        assert!(block.starts_with("BLK20260910"));
    }

    #[test]
    fn fragments_make_references_unique() {
        let now = Utc::now();
        let first = booking_reference(now);
        let second = booking_reference(now);
        assert_ne!(first, second);
    }
}
