//! Appointment scheduling domain types.
//!
//! An appointment is one patient's request for a half-hour consultation
//! slot. At most one pending or confirmed appointment may hold a given
//! (date, slot) pair. Status moves forward only: pending to confirmed or
//! rejected, confirmed to completed or deleted.

use std::fmt;

mod appointment;
mod calendar;
mod filter;
mod history;
mod patient;
mod slot;
mod status;

pub use appointment::{
    Appointment, AppointmentDraft, AppointmentEdit, AppointmentId, NewAppointment, SlotKey,
};
pub use calendar::{UpcomingWindow, group_by_date, upcoming};
pub use filter::{AppointmentFilter, AppointmentOrder, AppointmentSelection};
pub use history::HistorySearch;
pub use patient::{PatientDetails, PatientLookup};
pub use slot::{ParseTimeSlotError, TimeSlot};
pub use status::{
    AppointmentAction, AppointmentStatus, InvalidTransition, ParseAppointmentStatusError,
};

/// Validation errors raised by appointment constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentValidationError {
    /// A required field is blank.
    EmptyField { field: &'static str },
    /// `updated_at` precedes `created_at`.
    UpdatedBeforeCreated,
}

impl AppointmentValidationError {
    /// Name of the offending field, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::EmptyField { field } => Some(*field),
            Self::UpdatedBeforeCreated => None,
        }
    }
}

impl fmt::Display for AppointmentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::UpdatedBeforeCreated => {
                write!(f, "appointment updated_at must be >= created_at")
            }
        }
    }
}

impl std::error::Error for AppointmentValidationError {}
