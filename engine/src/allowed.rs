//! Allowed-date whitelist and reference date snapping.

use chrono::{NaiveDate, NaiveDateTime};

/// Calendar days a value may fall on. Empty means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedDates {
    days: Vec<NaiveDate>,
}

impl AllowedDates {
    /// Sorted ascending, one entry per day.
    pub fn new(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut days: Vec<NaiveDate> = days.into_iter().collect();
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Truncates every timestamp to its day.
    pub fn from_timestamps(timestamps: impl IntoIterator<Item = NaiveDateTime>) -> Self {
        Self::new(timestamps.into_iter().map(|timestamp| timestamp.date()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    #[must_use]
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    #[must_use]
    pub fn allows(&self, value: &NaiveDateTime) -> bool {
        self.days.is_empty() || self.days.binary_search(&value.date()).is_ok()
    }

    /// The first allowed day on or after `reference`, else the last one
    /// before it. Keeps the reference's time of day.
    #[must_use]
    pub fn snap(&self, reference: NaiveDateTime) -> NaiveDateTime {
        let day = reference.date();
        let snapped = self
            .days
            .iter()
            .find(|allowed| **allowed >= day)
            .or_else(|| self.days.iter().rev().find(|allowed| **allowed <= day));
        snapped.map_or(reference, |allowed| allowed.and_time(reference.time()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sorted_and_distinct() {
        let allowed = AllowedDates::from_timestamps([
            day(2016, 7, 14).and_hms_opt(10, 0, 0).unwrap(),
            day(2016, 4, 16).and_hms_opt(0, 0, 0).unwrap(),
            day(2016, 7, 14).and_hms_opt(0, 0, 0).unwrap(),
        ]);
        assert_eq!(allowed.days(), &[day(2016, 4, 16), day(2016, 7, 14)]);
    }

    #[test]
    fn snaps_forward_first() {
        let allowed = AllowedDates::new([day(2016, 7, 14), day(2016, 4, 16), day(2016, 4, 17)]);
        let reference = day(2016, 4, 15).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(allowed.snap(reference).date(), day(2016, 4, 16));
    }

    #[test]
    fn snaps_backward_when_nothing_ahead() {
        let allowed = AllowedDates::new([day(2016, 2, 14), day(2016, 3, 16), day(2016, 4, 3)]);
        let reference = day(2016, 4, 15).and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(
            allowed.snap(reference),
            day(2016, 4, 3).and_hms_opt(8, 30, 0).unwrap()
        );
    }

    #[test]
    fn same_day_is_allowed_regardless_of_time() {
        let allowed = AllowedDates::new([day(2016, 4, 15)]);
        let reference = day(2016, 4, 15).and_hms_opt(17, 0, 0).unwrap();
        assert_eq!(allowed.snap(reference), reference);
        assert!(allowed.allows(&reference));
        assert!(!allowed.allows(&day(2016, 4, 16).and_hms_opt(0, 0, 0).unwrap()));
        assert!(AllowedDates::default().allows(&reference));
    }
}
