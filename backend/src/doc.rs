//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the public booking endpoints, the admin endpoints and the
//!   health probes
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`AppointmentSchema`]
//!   and friends) that provide OpenAPI definitions without coupling domain
//!   types to the utoipa framework
//! - **Security**: the admin session cookie scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    AppointmentSchema, AppointmentStatusSchema, AvailableSlotsSchema, CalendarMonthSchema,
    ErrorCodeSchema, ErrorSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Admin session cookie issued by POST /api/v1/admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic appointments API",
        description = "Public booking for patients and a session-authenticated review workflow for the clinic.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::appointments::book_appointment,
        crate::inbound::http::appointments::available_slots,
        crate::inbound::http::appointments::appointment_status,
        crate::inbound::http::admin_session::admin_login,
        crate::inbound::http::admin_session::admin_logout,
        crate::inbound::http::admin_appointments::list_pending,
        crate::inbound::http::admin_appointments::calendar_feed,
        crate::inbound::http::admin_appointments::calendar_month,
        crate::inbound::http::admin_appointments::upcoming,
        crate::inbound::http::admin_appointments::history,
        crate::inbound::http::admin_appointments::get_appointment,
        crate::inbound::http::admin_appointments::confirm_appointment,
        crate::inbound::http::admin_appointments::reject_appointment,
        crate::inbound::http::admin_appointments::complete_appointment,
        crate::inbound::http::admin_appointments::soft_delete_appointment,
        crate::inbound::http::admin_appointments::edit_appointment,
        crate::inbound::http::admin_appointments::purge_appointment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AppointmentSchema,
        AppointmentStatusSchema,
        AvailableSlotsSchema,
        CalendarMonthSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "appointments", description = "Public booking and status lookup"),
        (name = "admin", description = "Clinic review workflow; requires an admin session"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema and path registration.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const APPOINTMENT_SCHEMA_NAME: &str = "crate.domain.Appointment";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_appointment_schema_uses_wire_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(APPOINTMENT_SCHEMA_NAME)
            .expect("Appointment schema");

        assert_object_schema_has_field(schema, "preferredDate");
        assert_object_schema_has_field(schema, "preferredTime");
        assert_object_schema_has_field(schema, "status");
    }

    #[rstest]
    #[case("/api/v1/appointments")]
    #[case("/api/v1/appointments/slots")]
    #[case("/api/v1/appointments/status")]
    #[case("/api/v1/admin/login")]
    #[case("/api/v1/admin/appointments/pending")]
    #[case("/api/v1/admin/appointments/calendar/{year}/{month}")]
    #[case("/api/v1/admin/appointments/{id}")]
    #[case("/api/v1/admin/appointments/{id}/confirm")]
    #[case("/health/ready")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
