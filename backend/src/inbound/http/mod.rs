//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod admin_appointments;
pub mod admin_session;
pub mod appointments;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// The fixed admin collection paths are registered before
/// `/admin/appointments/{id}` so they are not captured as ids.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(appointments::book_appointment)
        .service(appointments::available_slots)
        .service(appointments::appointment_status)
        .service(admin_session::admin_login)
        .service(admin_session::admin_logout)
        .service(admin_appointments::list_pending)
        .service(admin_appointments::calendar_feed)
        .service(admin_appointments::calendar_month)
        .service(admin_appointments::upcoming)
        .service(admin_appointments::history)
        .service(admin_appointments::get_appointment)
        .service(admin_appointments::confirm_appointment)
        .service(admin_appointments::reject_appointment)
        .service(admin_appointments::complete_appointment)
        .service(admin_appointments::soft_delete_appointment)
        .service(admin_appointments::edit_appointment)
        .service(admin_appointments::purge_appointment);
}
