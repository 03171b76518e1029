//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdminAuth, AppointmentCommand, AppointmentQuery, FixtureAdminAuth, FixtureAppointmentCommand,
    FixtureAppointmentQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Appointment write port.
    pub appointments: Arc<dyn AppointmentCommand>,
    /// Appointment read port.
    pub appointments_query: Arc<dyn AppointmentQuery>,
    /// Admin authentication port.
    pub admin_auth: Arc<dyn AdminAuth>,
}

impl HttpStatePorts {
    /// Ports backed by fixtures; every admin request is refused.
    pub fn fixtures() -> Self {
        Self {
            appointments: Arc::new(FixtureAppointmentCommand),
            appointments_query: Arc::new(FixtureAppointmentQuery),
            admin_auth: Arc::new(FixtureAdminAuth),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Appointment write port.
    pub appointments: Arc<dyn AppointmentCommand>,
    /// Appointment read port.
    pub appointments_query: Arc<dyn AppointmentQuery>,
    /// Admin authentication port.
    pub admin_auth: Arc<dyn AdminAuth>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use clinic_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::fixtures());
    /// let _auth = state.admin_auth.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            appointments,
            appointments_query,
            admin_auth,
        } = ports;
        Self {
            appointments,
            appointments_query,
            admin_auth,
        }
    }
}
