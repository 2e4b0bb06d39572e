//! Daily gate — once per calendar day, in the account's local time.
//!
//! Comparison is by calendar date, not elapsed time: 23:50 and 00:10
//! are different days, 00:10 and 23:50 the same day are not.
//! The check and the advance are separate steps; callers hold the
//! account lock across both.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

#[derive(Debug, Clone, Copy)]
pub struct DailyGate {
    offset: FixedOffset,
}

impl DailyGate {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// True if never taken, or last taken on a different local date.
    pub fn is_available(&self, last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last {
            None => true,
            Some(last) => self.local_date(last) != self.local_date(now),
        }
    }

    /// Record that the gated action happened at `now`.
    pub fn advance(&self, slot: &mut Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
        *slot = Some(now);
        now
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn open_when_never_taken() {
        assert!(DailyGate::utc().is_available(None, at(2024, 3, 1, 12, 0)));
    }

    #[test]
    fn straddling_midnight_is_a_new_day() {
        let gate = DailyGate::utc();
        assert!(gate.is_available(Some(at(2024, 3, 1, 23, 0)), at(2024, 3, 2, 1, 0)));
    }

    #[test]
    fn same_day_stays_closed_for_23_hours() {
        let gate = DailyGate::utc();
        assert!(!gate.is_available(Some(at(2024, 3, 1, 0, 30)), at(2024, 3, 1, 23, 30)));
    }

    #[test]
    fn local_offset_moves_the_day_boundary() {
        // UTC+09:00: 14:00Z and 16:00Z fall on different local dates.
        let tokyo = DailyGate::new(FixedOffset::east_opt(9 * 3600).unwrap());
        assert!(tokyo.is_available(Some(at(2024, 3, 1, 14, 0)), at(2024, 3, 1, 16, 0)));
        assert!(!DailyGate::utc().is_available(Some(at(2024, 3, 1, 14, 0)), at(2024, 3, 1, 16, 0)));
    }

    #[test]
    fn advance_stamps_now() {
        let gate = DailyGate::utc();
        let mut slot = None;
        let now = at(2024, 3, 1, 9, 0);
        assert_eq!(gate.advance(&mut slot, now), now);
        assert_eq!(slot, Some(now));
    }
}
