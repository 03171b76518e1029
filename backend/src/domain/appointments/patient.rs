//! Patient identity fields attached to each appointment.

use super::AppointmentValidationError;

/// Trim `value` and reject it when nothing remains.
pub(super) fn required(
    field: &'static str,
    value: impl Into<String>,
) -> Result<String, AppointmentValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppointmentValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Trim `value`, treating blank text as absent.
pub(super) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Who the appointment is for.
///
/// Fields are required and trimmed but otherwise unvalidated; the clinic
/// contacts the patient by phone before confirming.
///
/// # Examples
/// ```
/// use clinic_backend::domain::PatientDetails;
///
/// let patient = PatientDetails::new(" Aylin Kaya ", "+90 555 000 0000", "a@example.com", "12345678901")
///     .expect("all fields present");
/// assert_eq!(patient.name(), "Aylin Kaya");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDetails {
    name: String,
    phone: String,
    email: String,
    national_id: String,
}

impl PatientDetails {
    /// Build patient details, trimming each field.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentValidationError`] naming the first blank field.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        national_id: impl Into<String>,
    ) -> Result<Self, AppointmentValidationError> {
        Ok(Self {
            name: required("name", name)?,
            phone: required("phone", phone)?,
            email: required("email", email)?,
            national_id: required("national_id", national_id)?,
        })
    }

    /// Patient name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact phone number.
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Contact email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// National identity number.
    pub fn national_id(&self) -> &str {
        self.national_id.as_str()
    }
}

/// Quasi-identifying fields a patient supplies to look up their booking.
///
/// Matching is exact after trimming. The lookup is deliberately limited to
/// the most recent booking so it reveals no booking history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientLookup {
    name: String,
    phone: String,
    national_id: String,
}

impl PatientLookup {
    /// Build a lookup, trimming each field.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentValidationError`] naming the first blank field.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        national_id: impl Into<String>,
    ) -> Result<Self, AppointmentValidationError> {
        Ok(Self {
            name: required("name", name)?,
            phone: required("phone", phone)?,
            national_id: required("national_id", national_id)?,
        })
    }

    /// Name to match.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Phone number to match.
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// National identity number to match.
    pub fn national_id(&self) -> &str {
        self.national_id.as_str()
    }
}
