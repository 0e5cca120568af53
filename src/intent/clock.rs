//! Wall-clock source for time and date replies

use chrono::{Local, NaiveDateTime};

/// Supplies the current local time
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// The system's local clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// `04:05 PM`
#[must_use]
pub fn format_time(now: NaiveDateTime) -> String {
    now.format("%I:%M %p").to_string()
}

/// `Sunday, October 18, 2026`
#[must_use]
pub fn format_date(now: NaiveDateTime) -> String {
    now.format("%A, %B %d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_formats_are_zero_padded() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 7)
            .and_then(|d| d.and_hms_opt(16, 5, 0))
            .unwrap();
        assert_eq!(format_time(now), "04:05 PM");
        assert_eq!(format_date(now), "Saturday, March 07, 2026");
    }
}
