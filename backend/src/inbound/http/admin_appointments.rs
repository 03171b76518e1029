//! Administrative appointment handlers.
//!
//! Every handler resolves the session cookie into an admin capability before
//! touching the store.
//!
//! ```text
//! GET    /api/v1/admin/appointments/pending
//! GET    /api/v1/admin/appointments/calendar
//! GET    /api/v1/admin/appointments/calendar/{year}/{month}
//! GET    /api/v1/admin/appointments/upcoming?from=&horizonDays=&limit=
//! GET    /api/v1/admin/appointments/history?q=&status=
//! GET    /api/v1/admin/appointments/{id}
//! POST   /api/v1/admin/appointments/{id}/confirm
//! POST   /api/v1/admin/appointments/{id}/reject
//! POST   /api/v1/admin/appointments/{id}/complete
//! POST   /api/v1/admin/appointments/{id}/delete
//! PATCH  /api/v1/admin/appointments/{id}
//! DELETE /api/v1/admin/appointments/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AppointmentPayload, CalendarMonthResponse, ConfirmAppointmentRequest,
    EditAppointmentRequest, RescheduleRequest, UpcomingRequest,
};
use crate::domain::{AppointmentId, Error, HistorySearch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AppointmentSchema, CalendarMonthSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_appointment_id, parse_date, parse_local_date_time,
    parse_optional_status, require,
};

fn appointment_id(path: web::Path<String>) -> Result<AppointmentId, Error> {
    parse_appointment_id(&path.into_inner(), FieldName::new("id"))
}

/// List pending appointments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/pending",
    responses(
        (status = 200, description = "Pending appointments", body = [AppointmentSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listPendingAppointments",
    security(("SessionCookie" = []))
)]
#[get("/admin/appointments/pending")]
pub async fn list_pending(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AppointmentPayload>>> {
    let admin = session.require_admin(&state).await?;
    let rows = state.appointments_query.pending_queue(&admin).await?;
    Ok(web::Json(rows))
}

/// Confirmed and completed appointments in schedule order.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/calendar",
    responses(
        (status = 200, description = "Calendar feed", body = [AppointmentSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "calendarFeed",
    security(("SessionCookie" = []))
)]
#[get("/admin/appointments/calendar")]
pub async fn calendar_feed(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<AppointmentPayload>>> {
    let admin = session.require_admin(&state).await?;
    let rows = state.appointments_query.calendar_feed(&admin).await?;
    Ok(web::Json(rows))
}

/// One month of the calendar feed grouped by date.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/calendar/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month number, 1 to 12")
    ),
    responses(
        (status = 200, description = "Month view", body = CalendarMonthSchema),
        (status = 400, description = "Invalid month", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "calendarMonth",
    security(("SessionCookie" = []))
)]
#[get("/admin/appointments/calendar/{year}/{month}")]
pub async fn calendar_month(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, u32)>,
) -> ApiResult<web::Json<CalendarMonthResponse>> {
    let admin = session.require_admin(&state).await?;
    let (year, month) = path.into_inner();
    let view = state
        .appointments_query
        .calendar_month(&admin, year, month)
        .await?;
    Ok(web::Json(view))
}

/// Query string for [`upcoming`].
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct UpcomingQuery {
    /// Clinic-local `YYYY-MM-DDTHH:MM`; defaults to now.
    pub from: Option<String>,
    /// Days after `from` to include; defaults to 7.
    pub horizon_days: Option<u32>,
    /// Maximum rows; defaults to 5.
    pub limit: Option<usize>,
}

/// Confirmed or completed appointments starting soon.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/upcoming",
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming appointments", body = [AppointmentSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "upcomingAppointments",
    security(("SessionCookie" = []))
)]
#[get("/admin/appointments/upcoming")]
pub async fn upcoming(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UpcomingQuery>,
) -> ApiResult<web::Json<Vec<AppointmentPayload>>> {
    let admin = session.require_admin(&state).await?;
    let UpcomingQuery {
        from,
        horizon_days,
        limit,
    } = query.into_inner();
    let request = UpcomingRequest {
        from: from
            .as_deref()
            .map(|raw| parse_local_date_time(raw, FieldName::new("from")))
            .transpose()?,
        horizon_days,
        limit,
    };
    let rows = state.appointments_query.upcoming(&admin, request).await?;
    Ok(web::Json(rows))
}

/// Query string for [`history`].
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Case-insensitive text matched against patient fields and service.
    pub q: Option<String>,
    /// Restrict to one status.
    pub status: Option<String>,
}

/// Appointments that have left the pending state, most recently changed
/// first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History", body = [AppointmentSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "appointmentHistory",
    security(("SessionCookie" = []))
)]
#[get("/admin/appointments/history")]
pub async fn history(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<HistoryQuery>,
) -> ApiResult<web::Json<Vec<AppointmentPayload>>> {
    let admin = session.require_admin(&state).await?;
    let HistoryQuery { q, status } = query.into_inner();
    let status = parse_optional_status(status.as_deref(), FieldName::new("status"))?;
    let rows = state
        .appointments_query
        .history(&admin, HistorySearch::new(q, status))
        .await?;
    Ok(web::Json(rows))
}

/// Fetch one appointment by id.
#[utoipa::path(
    get,
    path = "/api/v1/admin/appointments/{id}",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getAppointment",
    security(("SessionCookie" = []))
)]
#[get("/admin/appointments/{id}")]
pub async fn get_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let admin = session.require_admin(&state).await?;
    let id = appointment_id(path)?;
    let row = state.appointments_query.get(&admin, id).await?;
    Ok(web::Json(row))
}

/// New date and slot for an appointment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    /// Appointment date.
    #[schema(format = "date", example = "2025-03-11")]
    pub preferred_date: Option<String>,
    /// Slot label such as `14:00`.
    #[schema(example = "14:00")]
    pub preferred_time: Option<String>,
}

impl RescheduleBody {
    fn is_empty(&self) -> bool {
        self.preferred_date.is_none() && self.preferred_time.is_none()
    }

    /// `None` when neither field is set; both are required otherwise.
    fn into_request(self) -> Result<Option<RescheduleRequest>, Error> {
        if self.is_empty() {
            return Ok(None);
        }
        let date_field = FieldName::new("preferredDate");
        let raw_date = require(self.preferred_date, date_field)?;
        Ok(Some(RescheduleRequest {
            preferred_date: parse_date(&raw_date, date_field)?,
            preferred_time: require(self.preferred_time, FieldName::new("preferredTime"))?,
        }))
    }
}

fn optional_body<T>(body: &[u8]) -> Result<Option<T>, Error>
where
    T: for<'de> Deserialize<'de>,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|err| {
        Error::invalid_request(format!("malformed request body: {err}"))
            .with_details(json!({ "code": "invalid_json" }))
    })
}

/// Confirm a pending appointment, optionally moving it first.
#[utoipa::path(
    post,
    path = "/api/v1/admin/appointments/{id}/confirm",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    request_body(content = RescheduleBody, description = "Optional new slot; omit the body to confirm as booked"),
    responses(
        (status = 200, description = "Confirmed", body = AppointmentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Slot taken or not pending", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "confirmAppointment",
    security(("SessionCookie" = []))
)]
#[post("/admin/appointments/{id}/confirm")]
pub async fn confirm_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let admin = session.require_admin(&state).await?;
    let id = appointment_id(path)?;
    let reschedule = match optional_body::<RescheduleBody>(&body)? {
        Some(body) => body.into_request()?,
        None => None,
    };
    let row = state
        .appointments
        .confirm(&admin, ConfirmAppointmentRequest { id, reschedule })
        .await?;
    Ok(web::Json(row))
}

/// Reject a pending booking, freeing its slot.
#[utoipa::path(
    post,
    path = "/api/v1/admin/appointments/{id}/reject",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    responses(
        (status = 200, description = "Rejected", body = AppointmentSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Not pending", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "rejectAppointment",
    security(("SessionCookie" = []))
)]
#[post("/admin/appointments/{id}/reject")]
pub async fn reject_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let admin = session.require_admin(&state).await?;
    let row = state
        .appointments
        .reject(&admin, appointment_id(path)?)
        .await?;
    Ok(web::Json(row))
}

/// Mark a confirmed appointment as completed.
#[utoipa::path(
    post,
    path = "/api/v1/admin/appointments/{id}/complete",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    responses(
        (status = 200, description = "Completed", body = AppointmentSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Not confirmed", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "completeAppointment",
    security(("SessionCookie" = []))
)]
#[post("/admin/appointments/{id}/complete")]
pub async fn complete_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let admin = session.require_admin(&state).await?;
    let row = state
        .appointments
        .complete(&admin, appointment_id(path)?)
        .await?;
    Ok(web::Json(row))
}

/// Mark a confirmed appointment deleted. The row stays in history.
#[utoipa::path(
    post,
    path = "/api/v1/admin/appointments/{id}/delete",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    responses(
        (status = 200, description = "Marked deleted", body = AppointmentSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Not confirmed", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "softDeleteAppointment",
    security(("SessionCookie" = []))
)]
#[post("/admin/appointments/{id}/delete")]
pub async fn soft_delete_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let admin = session.require_admin(&state).await?;
    let row = state
        .appointments
        .soft_delete(&admin, appointment_id(path)?)
        .await?;
    Ok(web::Json(row))
}

/// Field edits. Absent fields are unchanged; a blank message clears it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditAppointmentBody {
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
    /// Note; blank clears it.
    pub message: Option<String>,
    /// Appointment date.
    #[schema(format = "date")]
    pub preferred_date: Option<String>,
    /// Slot label such as `14:00`.
    pub preferred_time: Option<String>,
}

impl TryFrom<EditAppointmentBody> for EditAppointmentRequest {
    type Error = Error;

    fn try_from(body: EditAppointmentBody) -> Result<Self, Self::Error> {
        let reschedule = RescheduleBody {
            preferred_date: body.preferred_date,
            preferred_time: body.preferred_time,
        }
        .into_request()?;
        Ok(Self {
            name: body.name,
            phone: body.phone,
            email: body.email,
            national_id: body.national_id,
            service: body.service,
            message: body.message,
            reschedule,
        })
    }
}

/// Edit patient details, service, note or slot.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/appointments/{id}",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    request_body = EditAppointmentBody,
    responses(
        (status = 200, description = "Edited", body = AppointmentSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Slot taken or appointment closed", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "editAppointment",
    security(("SessionCookie" = []))
)]
#[patch("/admin/appointments/{id}")]
pub async fn edit_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EditAppointmentBody>,
) -> ApiResult<web::Json<AppointmentPayload>> {
    let admin = session.require_admin(&state).await?;
    let id = appointment_id(path)?;
    let request = EditAppointmentRequest::try_from(payload.into_inner())?;
    let row = state.appointments.edit(&admin, id, request).await?;
    Ok(web::Json(row))
}

/// Remove an appointment permanently.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/appointments/{id}",
    params(("id" = String, Path, format = "uuid", description = "Appointment id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "purgeAppointment",
    security(("SessionCookie" = []))
)]
#[delete("/admin/appointments/{id}")]
pub async fn purge_appointment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin(&state).await?;
    state
        .appointments
        .purge(&admin, appointment_id(path)?)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "admin_appointments_tests.rs"]
mod tests;
