//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::json;

use crate::domain::{
    AdminAuthService, AppointmentCommandService, AppointmentQueryService,
};
use crate::inbound::http::configure_routes;
use crate::inbound::http::error::configure_extractors;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{InMemoryAdminSessionRepository, InMemoryAppointmentRepository};
use crate::test_support::{
    MutableClock, TEST_ADMIN_PASSWORD, TEST_ADMIN_USERNAME, clinic_clock, test_admin_account,
};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Real services over in-memory stores, pinned to 2025-03-09 09:00 at the
/// clinic.
pub fn in_memory_state() -> (Arc<MutableClock>, HttpState) {
    let clock = Arc::new(MutableClock::at(2025, 3, 9, 6, 0));
    let appointments = Arc::new(InMemoryAppointmentRepository::new());
    let state = HttpState::new(HttpStatePorts {
        appointments: Arc::new(AppointmentCommandService::new(
            appointments.clone(),
            clinic_clock(clock.clone()),
        )),
        appointments_query: Arc::new(AppointmentQueryService::new(
            appointments,
            clinic_clock(clock.clone()),
        )),
        admin_auth: Arc::new(AdminAuthService::new(
            Arc::new(InMemoryAdminSessionRepository::new()),
            test_admin_account(),
            clock.clone(),
        )),
    });
    (clock, state)
}

/// The full `/api/v1` surface over `state`.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure_extractors)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(configure_routes),
        )
}

/// Log in as the test administrator and return the session cookie.
pub async fn admin_cookie(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/admin/login")
        .set_json(json!({
            "username": TEST_ADMIN_USERNAME,
            "password": TEST_ADMIN_PASSWORD,
        }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "admin login failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// A complete booking form for `name` at `date` and `time`.
pub fn booking_form(name: &str, date: &str, time: &str) -> serde_json::Value {
    json!({
        "name": name,
        "phone": "+90 555 000 0000",
        "email": format!("{}@example.com", name.to_lowercase()),
        "nationalId": "12345678901",
        "service": "Consultation",
        "preferredDate": date,
        "preferredTime": time,
    })
}

/// Book through the public endpoint and return the created appointment.
pub async fn book(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    name: &str,
    date: &str,
    time: &str,
) -> serde_json::Value {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/appointments")
        .set_json(booking_form(name, date, time))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
    actix_test::read_body_json(response).await
}

/// The `id` field of an appointment body.
pub fn appointment_id_of(body: &serde_json::Value) -> String {
    body.get("id")
        .and_then(serde_json::Value::as_str)
        .expect("appointment id")
        .to_owned()
}
