//! Public appointment handlers.
//!
//! ```text
//! POST /api/v1/appointments
//! GET  /api/v1/appointments/slots?date=2025-03-10
//! POST /api/v1/appointments/status
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{AppointmentPayload, AvailableSlotsResponse, BookAppointmentRequest};
use crate::domain::{Error, PatientLookup};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AppointmentSchema, AvailableSlotsSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_required_date, require};

/// Booking form submitted by a patient.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentBody {
    /// Patient name.
    pub name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// National identity number.
    pub national_id: Option<String>,
    /// Requested service.
    #[schema(example = "Consultation")]
    pub service: Option<String>,
    /// Appointment date.
    #[schema(format = "date", example = "2025-03-10")]
    pub preferred_date: Option<String>,
    /// Slot label such as `10:00`.
    #[schema(example = "10:00")]
    pub preferred_time: Option<String>,
    /// Optional note from the patient.
    pub message: Option<String>,
}

impl TryFrom<BookAppointmentBody> for BookAppointmentRequest {
    type Error = Error;

    fn try_from(body: BookAppointmentBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: require(body.name, FieldName::new("name"))?,
            phone: require(body.phone, FieldName::new("phone"))?,
            email: require(body.email, FieldName::new("email"))?,
            national_id: require(body.national_id, FieldName::new("nationalId"))?,
            service: require(body.service, FieldName::new("service"))?,
            preferred_date: parse_required_date(
                body.preferred_date,
                FieldName::new("preferredDate"),
            )?,
            preferred_time: require(body.preferred_time, FieldName::new("preferredTime"))?,
            message: body.message,
        })
    }
}

/// Book a consultation slot.
///
/// The new appointment is `pending` until the clinic confirms it.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = BookAppointmentBody,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Slot already taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["appointments"],
    operation_id = "bookAppointment",
    security([])
)]
#[post("/appointments")]
pub async fn book_appointment(
    state: web::Data<HttpState>,
    payload: web::Json<BookAppointmentBody>,
) -> ApiResult<HttpResponse> {
    let request = BookAppointmentRequest::try_from(payload.into_inner())?;
    let booked = state.appointments.book(request).await?;
    Ok(HttpResponse::Created().json(booked))
}

/// Query string for [`available_slots`].
#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// List the free slots for a date.
///
/// Past dates have no free slots.
#[utoipa::path(
    get,
    path = "/api/v1/appointments/slots",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Free slots", body = AvailableSlotsSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["appointments"],
    operation_id = "availableSlots",
    security([])
)]
#[get("/appointments/slots")]
pub async fn available_slots(
    state: web::Data<HttpState>,
    query: web::Query<SlotsQuery>,
) -> ApiResult<web::Json<AvailableSlotsResponse>> {
    let date = parse_required_date(query.into_inner().date, FieldName::new("date"))?;
    let slots = state.appointments_query.available_slots(date).await?;
    Ok(web::Json(slots))
}

/// Identity fields a patient supplies to check on a booking.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusLookupBody {
    /// Patient name.
    pub name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// National identity number.
    pub national_id: Option<String>,
}

impl TryFrom<StatusLookupBody> for PatientLookup {
    type Error = Error;

    fn try_from(body: StatusLookupBody) -> Result<Self, Self::Error> {
        let name = require(body.name, FieldName::new("name"))?;
        let phone = require(body.phone, FieldName::new("phone"))?;
        let national_id = require(body.national_id, FieldName::new("nationalId"))?;
        Self::new(name, phone, national_id)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Look up the newest booking for a patient.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/status",
    request_body = StatusLookupBody,
    responses(
        (status = 200, description = "Most recent matching appointment", body = AppointmentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No matching appointment", body = ErrorSchema)
    ),
    tags = ["appointments"],
    operation_id = "appointmentStatus",
    security([])
)]
#[post("/appointments/status")]
pub async fn appointment_status(
    state: web::Data<HttpState>,
    payload: web::Json<StatusLookupBody>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let lookup = PatientLookup::try_from(payload.into_inner())?;
    let found = state.appointments_query.lookup_status(lookup).await?;
    Ok(web::Json(found))
}

#[cfg(test)]
#[path = "appointments_tests.rs"]
mod tests;
