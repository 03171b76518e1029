//! Process-local adapters.
//!
//! These back the server when no database URL is configured and give the
//! test suites a real store to exercise. Data lives only as long as the
//! process.

mod admin_session_repository;
mod appointment_repository;

pub use admin_session_repository::InMemoryAdminSessionRepository;
pub use appointment_repository::InMemoryAppointmentRepository;
