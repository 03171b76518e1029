//! Tests for domain error construction and serialisation.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn slot_conflict() -> Error {
    Error::conflict("slot already taken").with_details(json!({
        "code": "slot_conflict",
        "date": "2025-03-10",
        "time": "10:00",
    }))
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn try_with_trace_id_rejects_blank_values() {
    let result = Error::internal("boom").try_with_trace_id(" ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::conflict("taken") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_envelope(slot_conflict: Error) {
    let value = serde_json::to_value(slot_conflict.with_trace_id(TRACE_ID)).expect("serialise");
    assert_eq!(value["code"], "conflict");
    assert_eq!(value["traceId"], TRACE_ID);
    assert_eq!(value["details"]["code"], "slot_conflict");
}

#[rstest]
fn omits_absent_optional_fields() {
    let value = serde_json::to_value(Error::not_found("gone")).expect("serialise");
    assert!(value.get("traceId").is_none());
    assert!(value.get("details").is_none());
}

#[rstest]
fn deserialising_rejects_blank_trace_id() {
    let raw = json!({"code": "not_found", "message": "gone", "traceId": " "});
    assert!(serde_json::from_value::<Error>(raw).is_err());
}

#[rstest]
fn deserialising_accepts_snake_case_trace_alias() {
    let raw = json!({"code": "not_found", "message": "gone", "trace_id": TRACE_ID});
    let error: Error = serde_json::from_value(raw).expect("deserialise");
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}
