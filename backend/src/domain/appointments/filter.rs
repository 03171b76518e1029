//! Record selection: which rows, in what order, how many.
//!
//! Store adapters translate an [`AppointmentSelection`] into their own query
//! language. [`AppointmentSelection::apply`] is the reference evaluation used
//! by the in-memory store and by tests that check adapters agree with it.

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::{Appointment, AppointmentId, AppointmentStatus, PatientLookup, SlotKey, TimeSlot};

/// Conjunction of optional predicates. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    /// Only rows on this date.
    pub preferred_date: Option<NaiveDate>,
    /// Only rows in this slot.
    pub preferred_time: Option<TimeSlot>,
    /// Exact patient name.
    pub name: Option<String>,
    /// Exact phone number.
    pub phone: Option<String>,
    /// Exact national identity number.
    pub national_id: Option<String>,
    /// Keep rows whose status is listed.
    pub status_in: Option<Vec<AppointmentStatus>>,
    /// Drop rows with this status.
    pub status_not: Option<AppointmentStatus>,
    /// Drop the row with this id.
    pub id_not: Option<AppointmentId>,
}

impl AppointmentFilter {
    /// Whether `appointment` passes every set criterion.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        let patient = appointment.patient();
        self.preferred_date
            .is_none_or(|date| appointment.preferred_date() == date)
            && self
                .preferred_time
                .is_none_or(|time| appointment.preferred_time() == time)
            && self.name.as_deref().is_none_or(|name| patient.name() == name)
            && self.phone.as_deref().is_none_or(|phone| patient.phone() == phone)
            && self
                .national_id
                .as_deref()
                .is_none_or(|national_id| patient.national_id() == national_id)
            && self
                .status_in
                .as_ref()
                .is_none_or(|statuses| statuses.contains(&appointment.status()))
            && self
                .status_not
                .is_none_or(|status| appointment.status() != status)
            && self.id_not.is_none_or(|id| appointment.id() != id)
    }
}

/// Supported orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOrder {
    /// Newest bookings first.
    CreatedAtDesc,
    /// Most recently changed first.
    UpdatedAtDesc,
    /// Chronological by appointment date, then slot.
    ScheduleAsc,
}

impl AppointmentOrder {
    /// Total order; ties break on id so repeated reads are stable.
    pub fn compare(self, a: &Appointment, b: &Appointment) -> Ordering {
        let primary = match self {
            Self::CreatedAtDesc => b.created_at().cmp(&a.created_at()),
            Self::UpdatedAtDesc => b.updated_at().cmp(&a.updated_at()),
            Self::ScheduleAsc => a.slot().cmp(&b.slot()),
        };
        primary.then_with(|| a.id().cmp(&b.id()))
    }
}

/// A full read request against the appointment table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentSelection {
    /// Row criteria.
    pub filter: AppointmentFilter,
    /// Sort order; `None` leaves store order.
    pub order: Option<AppointmentOrder>,
    /// Maximum rows to return.
    pub limit: Option<usize>,
}

impl AppointmentSelection {
    /// Active rows on `date`, optionally narrowed to one slot.
    pub fn slot_occupancy(date: NaiveDate, time: Option<TimeSlot>) -> Self {
        Self {
            filter: AppointmentFilter {
                preferred_date: Some(date),
                preferred_time: time,
                status_in: Some(AppointmentStatus::ACTIVE.to_vec()),
                ..AppointmentFilter::default()
            },
            order: None,
            limit: None,
        }
    }

    /// Active rows holding exactly `slot`.
    pub fn slot_holders(slot: SlotKey) -> Self {
        Self::slot_occupancy(slot.date, Some(slot.time))
    }

    /// The admin triage queue.
    pub fn pending_queue() -> Self {
        Self {
            filter: AppointmentFilter {
                status_in: Some(vec![AppointmentStatus::Pending]),
                ..AppointmentFilter::default()
            },
            order: Some(AppointmentOrder::CreatedAtDesc),
            limit: None,
        }
    }

    /// Confirmed and completed rows in schedule order.
    pub fn calendar_feed() -> Self {
        Self {
            filter: AppointmentFilter {
                status_in: Some(AppointmentStatus::SCHEDULED.to_vec()),
                ..AppointmentFilter::default()
            },
            order: Some(AppointmentOrder::ScheduleAsc),
            limit: None,
        }
    }

    /// Every row that has left the pending state.
    pub fn history() -> Self {
        Self {
            filter: AppointmentFilter {
                status_not: Some(AppointmentStatus::Pending),
                ..AppointmentFilter::default()
            },
            order: Some(AppointmentOrder::UpdatedAtDesc),
            limit: None,
        }
    }

    /// The most recent booking matching a patient's identity.
    pub fn status_lookup(lookup: &PatientLookup) -> Self {
        Self {
            filter: AppointmentFilter {
                name: Some(lookup.name().to_owned()),
                phone: Some(lookup.phone().to_owned()),
                national_id: Some(lookup.national_id().to_owned()),
                ..AppointmentFilter::default()
            },
            order: Some(AppointmentOrder::CreatedAtDesc),
            limit: Some(1),
        }
    }

    /// Exclude one appointment, used when it is moving into a new slot.
    #[must_use]
    pub fn excluding(mut self, id: AppointmentId) -> Self {
        self.filter.id_not = Some(id);
        self
    }

    /// Evaluate the selection over an in-memory row set.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<Appointment>
    where
        I: IntoIterator<Item = &'a Appointment>,
    {
        let mut selected: Vec<Appointment> = rows
            .into_iter()
            .filter(|row| self.filter.matches(row))
            .cloned()
            .collect();
        match self.order {
            Some(order) => selected.sort_by(|a, b| order.compare(a, b)),
            None => selected.sort_by_key(Appointment::id),
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}
