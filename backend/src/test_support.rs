//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{AdminAccount, ClinicClock, DEFAULT_UTC_OFFSET_MINUTES};

/// Username of the account built by [`test_admin_account`].
pub const TEST_ADMIN_USERNAME: &str = "doctor";
/// Password of the account built by [`test_admin_account`].
pub const TEST_ADMIN_PASSWORD: &str = "correct horse battery staple";

/// A clock tests can move by hand.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock pinned to a UTC wall-clock instant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use clinic_backend::test_support::MutableClock;
    /// use mockable::Clock;
    ///
    /// let clock = MutableClock::at(2025, 3, 9, 6, 0);
    /// assert_eq!(clock.utc().to_rfc3339(), "2025-03-09T06:00:00+00:00");
    /// ```
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        match Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single() {
            Some(now) => Self::new(now),
            None => panic!("invalid clock instant {year}-{month}-{day} {hour}:{minute}"),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    /// Jump the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Clinic clock at the default offset driven by `clock`.
pub fn clinic_clock(clock: Arc<MutableClock>) -> ClinicClock {
    match ClinicClock::with_offset_minutes(clock, DEFAULT_UTC_OFFSET_MINUTES) {
        Ok(clinic) => clinic,
        Err(error) => panic!("default offset rejected: {error}"),
    }
}

/// The administrator account used across test suites.
pub fn test_admin_account() -> AdminAccount {
    match AdminAccount::with_password(TEST_ADMIN_USERNAME, TEST_ADMIN_PASSWORD) {
        Ok(account) => account,
        Err(error) => panic!("test admin account rejected: {error}"),
    }
}
