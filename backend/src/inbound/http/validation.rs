//! Shared validation helpers for inbound HTTP adapters.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{AppointmentId, AppointmentStatus, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidDateTime,
    InvalidStatus,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidDateTime => "invalid_date_time",
            Self::InvalidStatus => "invalid_status",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

/// Require a present, non-blank value.
pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_appointment_id(value: &str, field: FieldName) -> Result<AppointmentId, Error> {
    Uuid::parse_str(value.trim())
        .map(AppointmentId::new)
        .map_err(|_| {
            let name = field.as_str();
            ValidationError::new(field, format!("{name} must be a valid UUID"))
                .with_value(ErrorCode::InvalidUuid, value)
        })
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let name = field.as_str();
        ValidationError::new(field, format!("{name} must be a YYYY-MM-DD date"))
            .with_value(ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_required_date(
    value: Option<String>,
    field: FieldName,
) -> Result<NaiveDate, Error> {
    let raw = require(value, field)?;
    parse_date(&raw, field)
}

/// Parse a clinic-local `YYYY-MM-DDTHH:MM[:SS]` date-time.
pub(crate) fn parse_local_date_time(
    value: &str,
    field: FieldName,
) -> Result<NaiveDateTime, Error> {
    let raw = value.trim();
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| {
            let name = field.as_str();
            ValidationError::new(field, format!("{name} must be a YYYY-MM-DDTHH:MM date-time"))
                .with_value(ErrorCode::InvalidDateTime, value)
        })
}

pub(crate) fn parse_optional_status(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<AppointmentStatus>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<AppointmentStatus>().map_err(|_| {
                let name = field.as_str();
                ValidationError::new(field, format!("{name} is not an appointment status"))
                    .with_value(ErrorCode::InvalidStatus, raw)
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::Value;

    use super::*;

    const FIELD: FieldName = FieldName::new("preferredDate");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    #[case(Some("   ".to_owned()))]
    fn require_rejects_absent_and_blank(#[case] value: Option<String>) {
        let err = require(value, FIELD).expect_err("missing");
        assert_eq!(detail(&err, "code"), Some("missing_field"));
        assert_eq!(detail(&err, "field"), Some("preferredDate"));
    }

    #[rstest]
    #[case("2025-03-10", true)]
    #[case(" 2025-03-10 ", true)]
    #[case("2025-02-30", false)]
    #[case("10/03/2025", false)]
    fn dates_are_iso_only(#[case] raw: &str, #[case] ok: bool) {
        let result = parse_date(raw, FIELD);
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(detail(&err, "code"), Some("invalid_date"));
            assert_eq!(detail(&err, "value"), Some(raw));
        }
    }

    #[rstest]
    #[case("2025-03-10T08:00", true)]
    #[case("2025-03-10T08:00:30", true)]
    #[case("2025-03-10 08:00", false)]
    #[case("2025-03-10T08:00Z", false)]
    fn local_date_times_accept_minutes_or_seconds(#[case] raw: &str, #[case] ok: bool) {
        let result = parse_local_date_time(raw, FieldName::new("from"));
        assert_eq!(result.is_ok(), ok);
        if let Err(err) = result {
            assert_eq!(detail(&err, "code"), Some("invalid_date_time"));
        }
    }

    #[rstest]
    fn appointment_ids_must_be_uuids() {
        let err = parse_appointment_id("abc", FieldName::new("id")).expect_err("not a uuid");
        assert_eq!(detail(&err, "code"), Some("invalid_uuid"));

        let id = parse_appointment_id("3fa85f64-5717-4562-b3fc-2c963f66afa6", FieldName::new("id"))
            .expect("valid uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("confirmed"), Some(AppointmentStatus::Confirmed))]
    fn optional_status_parses(
        #[case] raw: Option<&str>,
        #[case] expected: Option<AppointmentStatus>,
    ) {
        let parsed = parse_optional_status(raw, FieldName::new("status")).expect("valid");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let err = parse_optional_status(Some("archived"), FieldName::new("status"))
            .expect_err("unknown");
        assert_eq!(detail(&err, "code"), Some("invalid_status"));
    }
}
