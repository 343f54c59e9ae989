//! Once-a-day build trigger.

use chrono::{NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSchedule {
    pub build_time: NaiveTime,
}

impl BuildSchedule {
    pub fn new(build_time: NaiveTime) -> Self {
        Self { build_time }
    }

    /// A build is due when none ran yet today and `now` has reached today's
    /// build time.
    pub fn is_due(&self, last_build: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
        if now.time() < self.build_time {
            return false;
        }
        last_build.map_or(true, |last| last.date() < now.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn schedule() -> BuildSchedule {
        BuildSchedule::new(NaiveTime::from_hms_opt(15, 30, 0).unwrap())
    }

    #[test]
    fn not_due_before_build_time() {
        assert!(!schedule().is_due(None, at(20, 15, 29)));
    }

    #[test]
    fn due_at_build_time_without_history() {
        assert!(schedule().is_due(None, at(20, 15, 30)));
    }

    #[test]
    fn once_per_day() {
        let s = schedule();
        assert!(!s.is_due(Some(at(20, 15, 31)), at(20, 18, 0)));
        assert!(s.is_due(Some(at(19, 15, 31)), at(20, 15, 45)));
        // A build earlier today, before the trigger, still counts.
        assert!(!s.is_due(Some(at(20, 9, 0)), at(20, 16, 0)));
    }

    proptest::proptest! {
        #[test]
        fn never_due_twice_on_one_day(last_secs in 0u32..86_400, now_secs in 0u32..86_400) {
            let day = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
            let time = |s: u32| NaiveTime::from_num_seconds_from_midnight_opt(s, 0).unwrap();
            let last = day.and_time(time(last_secs.min(now_secs)));
            let now = day.and_time(time(now_secs));
            proptest::prop_assert!(!schedule().is_due(Some(last), now));
        }
    }
}
