use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stay::StayRange;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightlyRate {
    pub date: NaiveDate,
    pub rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayQuote {
    pub nightly: Vec<NightlyRate>,
    pub rooms: u32,
    pub total: Decimal,
}

/// Prices a stay per-date: each night charges the date-specific override when
/// one exists, otherwise the room type's base rate; the total sums the nights
/// and multiplies by the room count.
pub fn price_stay(
    stay: &StayRange,
    base_rate: Decimal,
    overrides: &HashMap<NaiveDate, Decimal>,
    rooms: u32,
) -> StayQuote {
    let nightly: Vec<NightlyRate> = stay
        .iter_nights()
        .map(|date| NightlyRate { date, rate: overrides.get(&date).copied().unwrap_or(base_rate) })
        .collect();

    let per_room: Decimal = nightly.iter().map(|night| night.rate).sum();
    StayQuote { nightly, rooms, total: per_room * Decimal::from(rooms) }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::price_stay;
    use crate::stay::StayRange;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    #[test]
    fn flat_rate_is_nights_times_base_times_rooms() {
        let stay = StayRange::new(date(10), date(12)).unwrap();
        let quote = price_stay(&stay, Decimal::new(35000, 2), &HashMap::new(), 3);

        assert_eq!(quote.nightly.len(), 2);
        assert_eq!(quote.total, Decimal::new(210000, 2)); // 2 × 350.00 × 3
    }

    #[test]
    fn date_override_replaces_base_for_that_night_only() {
        let stay = StayRange::new(date(10), date(13)).unwrap();
        let mut overrides = HashMap::new();
        overrides.insert(date(11), Decimal::new(50000, 2));

        let quote = price_stay(&stay, Decimal::new(30000, 2), &overrides, 1);
        assert_eq!(quote.nightly[0].rate, Decimal::new(30000, 2));
        assert_eq!(quote.nightly[1].rate, Decimal::new(50000, 2));
        assert_eq!(quote.total, Decimal::new(110000, 2));
    }
}
