//! Driving port for appointment mutations.
//!
//! Booking is public. Every other mutation takes an [`AdminCapability`] so
//! authorisation is visible in the signature rather than ambient.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AdminCapability, Appointment, AppointmentId, AppointmentStatus, Error, TimeSlot,
};

/// Serializable appointment projection returned by driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// Patient name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email address.
    pub email: String,
    /// National identity number.
    pub national_id: String,
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

impl From<&Appointment> for AppointmentPayload {
    fn from(value: &Appointment) -> Self {
        let patient = value.patient();
        Self {
            id: value.id(),
            name: patient.name().to_owned(),
            phone: patient.phone().to_owned(),
            email: patient.email().to_owned(),
            national_id: patient.national_id().to_owned(),
            service: value.service().to_owned(),
            preferred_date: value.preferred_date(),
            preferred_time: value.preferred_time(),
            message: value.message().map(str::to_owned),
            status: value.status(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

impl From<Appointment> for AppointmentPayload {
    fn from(value: Appointment) -> Self {
        Self::from(&value)
    }
}

/// A patient's booking request. Fields arrive unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    /// Patient name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email address.
    pub email: String,
    /// National identity number.
    pub national_id: String,
    /// Requested service.
    pub service: String,
    /// Appointment date.
    pub preferred_date: NaiveDate,
    /// Slot label; must belong to the catalogue.
    pub preferred_time: String,
    /// Optional note from the patient.
    pub message: Option<String>,
}

/// A new (date, slot) for an existing appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    /// Appointment date.
    pub preferred_date: NaiveDate,
    /// Appointment time slot.
    pub preferred_time: String,
}

/// Confirm a pending appointment, optionally moving it first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmAppointmentRequest {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// New date and slot, if moving the appointment.
    pub reschedule: Option<RescheduleRequest>,
}

/// Partial field edit. Absent fields are left unchanged; a blank message
/// clears the note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAppointmentRequest {
    /// Patient name.
    pub name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// National identity number.
    pub national_id: Option<String>,
    /// Requested service.
    pub service: Option<String>,
    /// Optional note from the patient.
    pub message: Option<String>,
    /// New date and slot, if moving the appointment.
    pub reschedule: Option<RescheduleRequest>,
}

/// Driving port for appointment write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentCommand: Send + Sync {
    /// Book a pending appointment.
    ///
    /// Fails with `InvalidRequest` for missing fields, past dates or unknown
    /// slots, and `Conflict` when an active appointment already holds the
    /// slot.
    async fn book(&self, request: BookAppointmentRequest) -> Result<AppointmentPayload, Error>;

    /// Pending to confirmed. A reschedule is availability-checked first.
    async fn confirm(
        &self,
        capability: &AdminCapability,
        request: ConfirmAppointmentRequest,
    ) -> Result<AppointmentPayload, Error>;

    /// Pending to rejected.
    async fn reject(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error>;

    /// Confirmed to completed.
    async fn complete(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error>;

    /// Confirmed to deleted. The row stays queryable.
    async fn soft_delete(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error>;

    /// Edit fields without changing status.
    async fn edit(
        &self,
        capability: &AdminCapability,
        id: AppointmentId,
        request: EditAppointmentRequest,
    ) -> Result<AppointmentPayload, Error>;

    /// Remove the row entirely.
    async fn purge(&self, capability: &AdminCapability, id: AppointmentId) -> Result<(), Error>;
}

/// Fixture command that rejects every administrative action as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAppointmentCommand;

fn missing(id: AppointmentId) -> Error {
    Error::not_found(format!("appointment {id} not found"))
}

#[async_trait]
impl AppointmentCommand for FixtureAppointmentCommand {
    async fn book(&self, request: BookAppointmentRequest) -> Result<AppointmentPayload, Error> {
        let preferred_time: TimeSlot = request
            .preferred_time
            .parse()
            .map_err(|err| Error::invalid_request(format!("{err}")))?;
        let now = Utc::now();
        Ok(AppointmentPayload {
            id: AppointmentId::random(),
            name: request.name,
            phone: request.phone,
            email: request.email,
            national_id: request.national_id,
            service: request.service,
            preferred_date: request.preferred_date,
            preferred_time,
            message: request.message,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    async fn confirm(
        &self,
        _capability: &AdminCapability,
        request: ConfirmAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        Err(missing(request.id))
    }

    async fn reject(
        &self,
        _capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        Err(missing(id))
    }

    async fn complete(
        &self,
        _capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        Err(missing(id))
    }

    async fn soft_delete(
        &self,
        _capability: &AdminCapability,
        id: AppointmentId,
    ) -> Result<AppointmentPayload, Error> {
        Err(missing(id))
    }

    async fn edit(
        &self,
        _capability: &AdminCapability,
        id: AppointmentId,
        _request: EditAppointmentRequest,
    ) -> Result<AppointmentPayload, Error> {
        Err(missing(id))
    }

    async fn purge(&self, _capability: &AdminCapability, id: AppointmentId) -> Result<(), Error> {
        Err(missing(id))
    }
}
