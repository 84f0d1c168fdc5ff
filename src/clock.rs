use chrono::{DateTime, Months, Utc};
use std::sync::RwLock;

/// Source of "now" for month-key derivation and billing rollovers
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable instant
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Shifts an instant by whole calendar months, keeping the day of month and
/// clamping to the last valid day (Jan 31 + 1 month = Feb 28/29)
pub fn shift_months(at: DateTime<Utc>, delta: i32) -> Option<DateTime<Utc>> {
    let months = Months::new(delta.unsigned_abs());
    if delta >= 0 {
        at.checked_add_months(months)
    } else {
        at.checked_sub_months(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_can_be_moved() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        let later = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_shift_months_preserves_day() {
        let at = Utc.with_ymd_and_hms(2024, 2, 5, 9, 30, 0).unwrap();
        assert_eq!(
            shift_months(at, 1),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_shift_months_clamps_to_month_end() {
        let at = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            shift_months(at, 1),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_shift_months_backwards_across_year() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(
            shift_months(at, -1),
            Some(Utc.with_ymd_and_hms(2023, 12, 15, 0, 0, 0).unwrap())
        );
    }
}
