//! Free-text search over the history view.

use super::{Appointment, AppointmentStatus};

/// Admin history search. Both criteria are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySearch {
    query: Option<String>,
    status: Option<AppointmentStatus>,
}

impl HistorySearch {
    /// Blank queries are ignored. Matching is case-insensitive.
    pub fn new(query: Option<String>, status: Option<AppointmentStatus>) -> Self {
        let query = query
            .map(|text| text.trim().to_lowercase())
            .filter(|text| !text.is_empty());
        Self { query, status }
    }

    /// Normalised search text, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Status restriction, if any.
    pub fn status(&self) -> Option<AppointmentStatus> {
        self.status
    }

    /// Substring match over name, phone, email, national id and service.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if self
            .status
            .is_some_and(|status| appointment.status() != status)
        {
            return false;
        }
        let Some(needle) = self.query.as_deref() else {
            return true;
        };
        let patient = appointment.patient();
        [
            patient.name(),
            patient.phone(),
            patient.email(),
            patient.national_id(),
            appointment.service(),
        ]
        .into_iter()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}
