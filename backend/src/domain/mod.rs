//! Domain primitives, aggregates and services.
//!
//! Purpose: define the appointment aggregate, its status lifecycle and the
//! admin session model, and implement the driving ports on top of the driven
//! ports. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Appointment and friends (from `appointments`) — scheduling model.
//! - AdminCapability (from `auth`) — proof of a live admin session.
//! - ClinicClock — the clinic's local "now".

pub mod admin_auth_service;
pub mod appointment_service;
pub mod appointments;
pub mod auth;
pub mod clinic_clock;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::admin_auth_service::{AdminAuthService, DEFAULT_SESSION_TTL};
pub use self::appointment_service::{
    AppointmentCommandService, AppointmentQueryService, MAX_UPCOMING_HORIZON_DAYS,
    MAX_UPCOMING_LIMIT,
};
pub use self::appointments::{
    Appointment, AppointmentAction, AppointmentDraft, AppointmentEdit, AppointmentFilter,
    AppointmentId, AppointmentOrder, AppointmentSelection, AppointmentStatus,
    AppointmentValidationError, HistorySearch, InvalidTransition, NewAppointment,
    ParseAppointmentStatusError, ParseTimeSlotError, PatientDetails, PatientLookup, SlotKey,
    TimeSlot, UpcomingWindow, group_by_date, upcoming,
};
pub use self::auth::{
    AdminAccount, AdminAccountError, AdminCapability, AdminCredentials, AdminSession,
    AdminSessionToken, LoginValidationError, sha256_hex,
};
pub use self::clinic_clock::{ClinicClock, DEFAULT_UTC_OFFSET_MINUTES, InvalidUtcOffset};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use clinic_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
