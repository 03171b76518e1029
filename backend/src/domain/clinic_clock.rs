//! The clinic's notion of "now" and "today".
//!
//! Bookings are made against the clinic's local calendar, not the server's.
//! The clinic observes a fixed UTC offset, so a [`FixedOffset`] suffices.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use mockable::Clock;

/// Default offset: UTC+03:00.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 180;

/// Error raised for offsets outside ±24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("utc offset of {minutes} minutes is out of range")]
pub struct InvalidUtcOffset {
    /// Rejected offset.
    pub minutes: i32,
}

/// A [`Clock`] paired with the clinic's UTC offset.
#[derive(Clone)]
pub struct ClinicClock {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl ClinicClock {
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use clinic_backend::domain::ClinicClock;
    /// use mockable::DefaultClock;
    ///
    /// let clock = ClinicClock::with_offset_minutes(Arc::new(DefaultClock), 180)
    ///     .expect("valid offset");
    /// let _today = clock.today();
    /// ```
    pub fn with_offset_minutes(
        clock: Arc<dyn Clock>,
        minutes: i32,
    ) -> Result<Self, InvalidUtcOffset> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(InvalidUtcOffset { minutes })?;
        Ok(Self { clock, offset })
    }

    /// Clinic offset from UTC.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current instant, for timestamps.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Current wall-clock time at the clinic.
    pub fn local_now(&self) -> NaiveDateTime {
        self.clock.utc().with_timezone(&self.offset).naive_local()
    }

    /// Current date at the clinic.
    pub fn today(&self) -> NaiveDate {
        self.local_now().date()
    }
}

impl std::fmt::Debug for ClinicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicClock")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::{Local, TimeZone};
    use rstest::rstest;

    use super::*;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn clock_at(hour: u32, minutes: i32) -> ClinicClock {
        let instant = Utc
            .with_ymd_and_hms(2025, 3, 9, hour, 30, 0)
            .single()
            .expect("valid instant");
        ClinicClock::with_offset_minutes(Arc::new(FixedClock(instant)), minutes)
            .expect("valid offset")
    }

    #[rstest]
    #[case(20, 180, "2025-03-09")]
    #[case(21, 180, "2025-03-10")]
    #[case(21, 0, "2025-03-09")]
    #[case(2, -300, "2025-03-08")]
    fn today_follows_clinic_offset(
        #[case] utc_hour: u32,
        #[case] minutes: i32,
        #[case] expected: &str,
    ) {
        let expected: NaiveDate = expected.parse().expect("fixture date");
        assert_eq!(clock_at(utc_hour, minutes).today(), expected);
    }

    #[rstest]
    fn local_now_applies_offset() {
        let local = clock_at(6, 180).local_now();
        assert_eq!(local.format("%H:%M").to_string(), "09:30");
    }

    #[rstest]
    #[case(24 * 60)]
    #[case(-24 * 60)]
    #[case(i32::MAX)]
    fn rejects_out_of_range_offsets(#[case] minutes: i32) {
        let err = ClinicClock::with_offset_minutes(Arc::new(mockable::DefaultClock), minutes)
            .expect_err("out of range");
        assert_eq!(err.minutes, minutes);
    }
}
