//! Tests for the public appointment handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::TimeDelta;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{api_app, book, booking_form, in_memory_state};

fn detail(body: &Value, key: &str) -> Option<String> {
    body.pointer(&format!("/details/{key}"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[rstest]
#[actix_web::test]
async fn booking_creates_a_pending_appointment() {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;

    let body = book(&app, "Ayse", "2025-03-10", "10:00").await;

    assert_eq!(body["status"], "pending");
    assert_eq!(body["preferredDate"], "2025-03-10");
    assert_eq!(body["preferredTime"], "10:00");
    assert_eq!(body["nationalId"], "12345678901");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[rstest]
#[actix_web::test]
async fn double_booking_reports_slot_conflict() {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;
    book(&app, "Ayse", "2025-03-10", "10:00").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/appointments")
        .set_json(booking_form("Burak", "2025-03-10", "10:00"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "conflict");
    assert_eq!(detail(&body, "code").as_deref(), Some("slot_conflict"));
    assert_eq!(detail(&body, "preferredTime").as_deref(), Some("10:00"));
}

#[rstest]
#[case("nationalId", Value::Null, "missing_field")]
#[case("name", json!("   "), "missing_field")]
#[case("preferredDate", json!("10/03/2025"), "invalid_date")]
#[case("preferredTime", json!("10:15"), "unknown_time_slot")]
#[case("preferredDate", json!("2025-03-08"), "date_in_past")]
#[actix_web::test]
async fn booking_validation_failures(
    #[case] field: &str,
    #[case] value: Value,
    #[case] code: &str,
) {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;
    let mut form = booking_form("Ayse", "2025-03-10", "10:00");
    form[field] = value;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/appointments")
        .set_json(form)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(detail(&body, "code").as_deref(), Some(code));
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_the_error_envelope() {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/appointments")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\":")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(detail(&body, "code").as_deref(), Some("invalid_json"));
}

#[rstest]
#[actix_web::test]
async fn slots_exclude_held_times() {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;
    book(&app, "Ayse", "2025-03-10", "10:00").await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/appointments/slots?date=2025-03-10")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["date"], "2025-03-10");
    let slots: Vec<&str> = body["slots"]
        .as_array()
        .expect("slots array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(slots.len(), 11);
    assert!(!slots.contains(&"10:00"));
    assert_eq!(slots.first(), Some(&"09:00"));
}

#[rstest]
#[actix_web::test]
async fn past_dates_have_no_slots() {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/appointments/slots?date=2025-03-01")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["slots"], json!([]));
}

#[rstest]
#[case("/api/v1/appointments/slots", "missing_field")]
#[case("/api/v1/appointments/slots?date=tomorrow", "invalid_date")]
#[actix_web::test]
async fn slots_require_an_iso_date(#[case] uri: &str, #[case] code: &str) {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;

    let request = actix_test::TestRequest::get().uri(uri).to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(detail(&body, "code").as_deref(), Some(code));
}

#[rstest]
#[actix_web::test]
async fn status_lookup_returns_the_latest_booking() {
    let (clock, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;
    book(&app, "Ayse", "2025-03-10", "10:00").await;
    clock.advance(TimeDelta::minutes(5));
    let latest = book(&app, "Ayse", "2025-03-12", "14:00").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/appointments/status")
        .set_json(json!({
            "name": "Ayse",
            "phone": "+90 555 000 0000",
            "nationalId": "12345678901",
        }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["id"], latest["id"]);
    assert_eq!(body["status"], "pending");
}

#[rstest]
#[case(json!({"name": "Nobody", "phone": "1", "nationalId": "2"}), StatusCode::NOT_FOUND)]
#[case(json!({"name": "Ayse", "phone": "", "nationalId": "2"}), StatusCode::BAD_REQUEST)]
#[case(json!({"name": "Ayse"}), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn status_lookup_failures(#[case] payload: Value, #[case] status: StatusCode) {
    let (_, state) = in_memory_state();
    let app = actix_test::init_service(api_app(state)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/appointments/status")
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
}
