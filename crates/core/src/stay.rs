use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// A half-open stay range `[check_in, check_out)`.
///
/// The check-out date is the morning the guest leaves, so it is never a
/// room-night and never enters an availability sum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, LedgerError> {
        if check_out <= check_in {
            return Err(LedgerError::InvalidDateRange { check_in, check_out });
        }
        Ok(Self { check_in, check_out })
    }

    /// A single room-night: `[date, date + 1 day)`.
    pub fn single_night(date: NaiveDate) -> Self {
        Self { check_in: date, check_out: date + Days::new(1) }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// Iterates every room-night in the range, check-out excluded.
    pub fn iter_nights(&self) -> impl Iterator<Item = NaiveDate> {
        let check_out = self.check_out;
        std::iter::successors(Some(self.check_in), move |date| {
            let next = *date + Days::new(1);
            (next < check_out).then_some(next)
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::StayRange;
    use crate::errors::LedgerError;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, day).unwrap()
    }

    #[test]
    fn rejects_checkout_not_after_checkin() {
        let error = StayRange::new(date(10), date(10)).expect_err("zero-night stay");
        assert!(matches!(error, LedgerError::InvalidDateRange { .. }));

        let error = StayRange::new(date(10), date(8)).expect_err("inverted stay");
        assert!(matches!(error, LedgerError::InvalidDateRange { .. }));
    }

    #[test]
    fn counts_nights_and_excludes_checkout() {
        let stay = StayRange::new(date(10), date(13)).expect("valid range");
        assert_eq!(stay.nights(), 3);

        let nights: Vec<NaiveDate> = stay.iter_nights().collect();
        assert_eq!(nights, vec![date(10), date(11), date(12)]);
        assert!(stay.contains(date(12)));
        assert!(!stay.contains(date(13)));
    }

    #[test]
    fn single_night_spans_one_date() {
        let stay = StayRange::single_night(date(5));
        assert_eq!(stay.nights(), 1);
        assert_eq!(stay.iter_nights().collect::<Vec<_>>(), vec![date(5)]);
    }
}
