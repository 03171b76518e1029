//! Port for the appointment record store.
//!
//! Adapters must refuse any insert or update that would leave two pending or
//! confirmed rows on the same (date, slot), reporting
//! [`AppointmentRepositoryError::SlotTaken`]. Services check availability
//! before writing, so this only fires when two writers race.
//!
//! Updates are compare-and-set: the caller passes the row as it read it, and
//! adapters report [`AppointmentRepositoryError::Stale`] when the stored
//! status or `updated_at` no longer match.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Appointment, AppointmentId, AppointmentSelection, NewAppointment, TimeSlot,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "appointment repository query failed: {message}",
        /// Another active appointment already holds the slot.
        SlotTaken { date: NaiveDate, time: TimeSlot } =>
            "slot {date} {time} is already held by an active appointment",
        /// The row changed between the caller's read and its write.
        Stale { id: AppointmentId } =>
            "appointment {id} changed since it was read",
    }
}

/// Port for reading and writing appointment rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Store a new pending appointment, assigning its id.
    async fn insert(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError>;

    /// Rows matching `selection`, in the requested order.
    async fn select(
        &self,
        selection: &AppointmentSelection,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Fetch one row by id.
    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Replace `previous` with `next`, provided the stored row still carries
    /// the status and `updated_at` of `previous`.
    ///
    /// Returns `None` when the row no longer exists and
    /// [`AppointmentRepositoryError::Stale`] when another writer got there
    /// first.
    async fn update(
        &self,
        previous: &Appointment,
        next: &Appointment,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Hard-delete a row. Returns whether a row was removed.
    async fn delete(&self, id: &AppointmentId) -> Result<bool, AppointmentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentRepository;

#[async_trait]
impl AppointmentRepository for FixtureAppointmentRepository {
    async fn insert(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        Ok(appointment.clone().into_appointment(AppointmentId::random()))
    }

    async fn select(
        &self,
        _selection: &AppointmentSelection,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(None)
    }

    async fn update(
        &self,
        _previous: &Appointment,
        _next: &Appointment,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: &AppointmentId) -> Result<bool, AppointmentRepositoryError> {
        Ok(false)
    }
}
