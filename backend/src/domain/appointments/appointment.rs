//! The appointment aggregate.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patient::{optional, required};
use super::{
    AppointmentAction, AppointmentStatus, AppointmentValidationError, InvalidTransition,
    PatientDetails, TimeSlot,
};

/// Store-assigned appointment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(Uuid);

impl AppointmentId {
    /// Wrap an existing UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// A fresh random identifier, used by stores when inserting.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for AppointmentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A (date, slot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    /// Calendar date.
    pub date: NaiveDate,
    /// Half-hour slot.
    pub time: TimeSlot,
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// A booking that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    /// Patient contact details.
    pub patient: PatientDetails,
    /// Requested service.
    pub service: String,
    /// Date and time slot.
    pub slot: SlotKey,
    /// Optional note from the patient.
    pub message: Option<String>,
    /// Booking time; also the initial `updated_at`.
    pub created_at: DateTime<Utc>,
}

impl NewAppointment {
    /// Validate free-text fields for a fresh pending booking.
    pub fn new(
        patient: PatientDetails,
        service: impl Into<String>,
        slot: SlotKey,
        message: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AppointmentValidationError> {
        Ok(Self {
            patient,
            service: required("service", service)?,
            slot,
            message: optional(message),
            created_at,
        })
    }

    /// Materialise the stored row once the store has chosen an id.
    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            patient: self.patient,
            service: self.service,
            slot: self.slot,
            message: self.message,
            status: AppointmentStatus::Pending,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Input payload for [`Appointment::new`], typically a row read back from a
/// store.
#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// Patient contact details.
    pub patient: PatientDetails,
    /// Requested service.
    pub service: String,
    /// Appointment date.
    pub preferred_date: NaiveDate,
    /// Appointment time slot.
    pub preferred_time: TimeSlot,
    /// Optional note from the patient.
    pub message: Option<String>,
    /// Lifecycle status.
    pub status: AppointmentStatus,
    /// When the booking was made.
    pub created_at: DateTime<Utc>,
    /// When the row last changed.
    pub updated_at: DateTime<Utc>,
}

/// Field changes an administrator may make without changing status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentEdit {
    /// Replacement patient details.
    pub patient: Option<PatientDetails>,
    /// Replacement service.
    pub service: Option<String>,
    /// `Some(None)` clears the note.
    pub message: Option<Option<String>>,
    /// New date and slot.
    pub slot: Option<SlotKey>,
}

impl AppointmentEdit {
    /// Whether the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        self.patient.is_none()
            && self.service.is_none()
            && self.message.is_none()
            && self.slot.is_none()
    }
}

/// One patient's request for a consultation slot.
///
/// ## Invariants
/// - Patient fields and `service` are non-empty after trimming.
/// - `updated_at >= created_at`.
/// - Status only changes through [`Appointment::apply`], which follows
///   [`AppointmentStatus::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    id: AppointmentId,
    patient: PatientDetails,
    service: String,
    slot: SlotKey,
    message: Option<String>,
    status: AppointmentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Validate a stored row.
    ///
    /// # Errors
    ///
    /// Fails when a required field is blank or `updated_at` precedes
    /// `created_at`.
    pub fn new(draft: AppointmentDraft) -> Result<Self, AppointmentValidationError> {
        if draft.updated_at < draft.created_at {
            return Err(AppointmentValidationError::UpdatedBeforeCreated);
        }
        Ok(Self {
            id: draft.id,
            patient: draft.patient,
            service: required("service", draft.service)?,
            slot: SlotKey {
                date: draft.preferred_date,
                time: draft.preferred_time,
            },
            message: optional(draft.message),
            status: draft.status,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> AppointmentId {
        self.id
    }

    /// Patient contact details.
    pub fn patient(&self) -> &PatientDetails {
        &self.patient
    }

    /// Requested service.
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// Date and time slot held by this appointment.
    pub fn slot(&self) -> SlotKey {
        self.slot
    }

    /// Appointment date.
    pub fn preferred_date(&self) -> NaiveDate {
        self.slot.date
    }

    /// Appointment time slot.
    pub fn preferred_time(&self) -> TimeSlot {
        self.slot.time
    }

    /// Optional note from the patient.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    /// When the booking was made.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the row last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether this appointment currently holds its slot.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Apply a status transition stamped at `now`.
    ///
    /// `updated_at` always strictly increases, even when `now` does not lie
    /// after the stored timestamp.
    pub fn apply(
        &self,
        action: AppointmentAction,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidTransition> {
        let status = self.status.transition(action)?;
        let mut next = self.clone();
        next.status = status;
        next.touch(now);
        Ok(next)
    }

    /// Move the appointment to a new slot stamped at `now`.
    pub fn rescheduled(&self, slot: SlotKey, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.slot = slot;
        next.touch(now);
        next
    }

    /// Apply field edits stamped at `now`.
    pub fn edited(
        &self,
        edit: AppointmentEdit,
        now: DateTime<Utc>,
    ) -> Result<Self, AppointmentValidationError> {
        let mut next = self.clone();
        if let Some(patient) = edit.patient {
            next.patient = patient;
        }
        if let Some(service) = edit.service {
            next.service = required("service", service)?;
        }
        if let Some(message) = edit.message {
            next.message = optional(message);
        }
        if let Some(slot) = edit.slot {
            next.slot = slot;
        }
        next.touch(now);
        Ok(next)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        // Microseconds match the resolution of PostgreSQL timestamps.
        let floor = self.updated_at + TimeDelta::microseconds(1);
        self.updated_at = now.max(floor);
    }
}
