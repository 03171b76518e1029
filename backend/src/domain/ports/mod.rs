//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`AppointmentRepository`, `AdminSessionRepository`) are
//! implemented by outbound adapters. Driving ports (`AppointmentCommand`,
//! `AppointmentQuery`, `AdminAuth`) are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod admin_auth;
mod admin_session_repository;
mod appointment_command;
mod appointment_query;
mod appointment_repository;

#[cfg(test)]
pub use admin_auth::MockAdminAuth;
pub use admin_auth::{AdminAuth, AdminLogin, FixtureAdminAuth};
#[cfg(test)]
pub use admin_session_repository::MockAdminSessionRepository;
pub use admin_session_repository::{
    AdminSessionRepository, AdminSessionRepositoryError, FixtureAdminSessionRepository,
};
#[cfg(test)]
pub use appointment_command::MockAppointmentCommand;
pub use appointment_command::{
    AppointmentCommand, AppointmentPayload, BookAppointmentRequest, ConfirmAppointmentRequest,
    EditAppointmentRequest, FixtureAppointmentCommand, RescheduleRequest,
};
#[cfg(test)]
pub use appointment_query::MockAppointmentQuery;
pub use appointment_query::{
    AppointmentQuery, AvailableSlotsResponse, CalendarMonthResponse, FixtureAppointmentQuery,
    UpcomingRequest,
};
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentRepository, AppointmentRepositoryError, FixtureAppointmentRepository,
};
