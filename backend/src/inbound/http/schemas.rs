//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON produced by their domain types but
//! live in the inbound adapter layer where framework concerns belong.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with current state, such as a taken slot.
    #[schema(rename = "conflict")]
    Conflict,
    /// The appointment store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "the 2025-03-10 10:00 slot is no longer available")]
    message: String,
    /// Correlation identifier matching the `trace-id` response header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details; `details.code` refines `code`, for example
    /// `slot_conflict` or `invalid_transition`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::AppointmentStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AppointmentStatus)]
pub enum AppointmentStatusSchema {
    /// `pending`
    #[schema(rename = "pending")]
    Pending,
    /// `confirmed`
    #[schema(rename = "confirmed")]
    Confirmed,
    /// `rejected`
    #[schema(rename = "rejected")]
    Rejected,
    /// `completed`
    #[schema(rename = "completed")]
    Completed,
    /// `deleted`
    #[schema(rename = "deleted")]
    Deleted,
}

/// OpenAPI schema for [`crate::domain::ports::AppointmentPayload`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Appointment)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AppointmentSchema {
    #[schema(value_type = String, format = "uuid")]
    id: String,
    name: String,
    phone: String,
    email: String,
    #[schema(rename = "nationalId")]
    national_id: String,
    #[schema(example = "Consultation")]
    service: String,
    #[schema(rename = "preferredDate", value_type = String, format = "date", example = "2025-03-10")]
    preferred_date: String,
    /// One of the twelve half-hour slots from 09:00 to 16:30.
    #[schema(rename = "preferredTime", example = "10:00")]
    preferred_time: String,
    message: Option<String>,
    status: AppointmentStatusSchema,
    #[schema(rename = "createdAt", value_type = String, format = "date-time")]
    created_at: String,
    #[schema(rename = "updatedAt", value_type = String, format = "date-time")]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::AvailableSlotsResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AvailableSlots)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AvailableSlotsSchema {
    #[schema(value_type = String, format = "date")]
    date: String,
    #[schema(example = json!(["09:00", "09:30"]))]
    slots: Vec<String>,
}

/// OpenAPI schema for [`crate::domain::ports::CalendarMonthResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CalendarMonth)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CalendarMonthSchema {
    year: i32,
    month: u32,
    /// Appointments keyed by `YYYY-MM-DD`, each list in slot order.
    days: BTreeMap<String, Vec<AppointmentSchema>>,
}
