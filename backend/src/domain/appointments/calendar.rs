//! Calendar projections over the confirmed/completed feed.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};

use super::{Appointment, AppointmentStatus};

/// Group appointments by date, preserving feed order within each day.
pub fn group_by_date(appointments: &[Appointment]) -> BTreeMap<NaiveDate, Vec<Appointment>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
    for appointment in appointments {
        grouped
            .entry(appointment.preferred_date())
            .or_default()
            .push(appointment.clone());
    }
    grouped
}

/// Parameters for [`upcoming`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpcomingWindow {
    /// Clinic-local instant the window opens after.
    pub from: NaiveDateTime,
    /// Days after `from` to include.
    pub horizon_days: u32,
    /// Maximum rows to return.
    pub limit: usize,
}

impl UpcomingWindow {
    /// Days after `from` covered by default.
    pub const DEFAULT_HORIZON_DAYS: u32 = 7;
    /// Rows returned by default.
    pub const DEFAULT_LIMIT: usize = 5;

    /// Window starting at `from` with the default horizon and limit.
    pub fn new(from: NaiveDateTime) -> Self {
        Self {
            from,
            horizon_days: Self::DEFAULT_HORIZON_DAYS,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Last calendar date inside the window.
    pub fn last_date(&self) -> NaiveDate {
        let today = self.from.date();
        today
            .checked_add_days(Days::new(u64::from(self.horizon_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether `appointment` starts after `from` and within the horizon.
    pub fn contains(&self, appointment: &Appointment) -> bool {
        let date = appointment.preferred_date();
        let today = self.from.date();
        let starts_later = match date.cmp(&today) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => {
                appointment.preferred_time().minutes_from_midnight() * 60
                    > self.from.time().num_seconds_from_midnight()
            }
            std::cmp::Ordering::Less => false,
        };
        starts_later && date <= self.last_date()
    }
}

/// Confirmed or completed appointments starting inside `window`, soonest
/// first.
pub fn upcoming(appointments: &[Appointment], window: &UpcomingWindow) -> Vec<Appointment> {
    let mut selected: Vec<Appointment> = appointments
        .iter()
        .filter(|appointment| AppointmentStatus::SCHEDULED.contains(&appointment.status()))
        .filter(|appointment| window.contains(appointment))
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.slot().cmp(&b.slot()).then_with(|| a.id().cmp(&b.id())));
    selected.truncate(window.limit);
    selected
}
