//! Appointment booking backend library.
//!
//! Patients book half-hour consultation slots; an administrator reviews,
//! confirms, reschedules and closes them. The crate follows a hexagonal
//! layout: `domain` holds the model and services, `inbound` the HTTP
//! adapters and `outbound` the stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::trace::{Trace, TraceId};
