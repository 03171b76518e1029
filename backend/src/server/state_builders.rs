//! Builders for HTTP state ports backed by either Postgres or memory.

use std::io;
use std::sync::Arc;

use mockable::Clock;
use tracing::warn;

use clinic_backend::domain::ports::{AdminSessionRepository, AppointmentRepository};
use clinic_backend::domain::{
    AdminAuthService, AppointmentCommandService, AppointmentQueryService, ClinicClock,
};
use clinic_backend::inbound::http::state::{HttpState, HttpStatePorts};
use clinic_backend::outbound::memory::{
    InMemoryAdminSessionRepository, InMemoryAppointmentRepository,
};
use clinic_backend::outbound::persistence::{
    DieselAdminSessionRepository, DieselAppointmentRepository,
};

use super::ServerConfig;

/// Wire the domain services on top of one repository pair.
fn build_ports<A, S>(
    appointments: Arc<A>,
    sessions: Arc<S>,
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> io::Result<HttpStatePorts>
where
    A: AppointmentRepository + 'static,
    S: AdminSessionRepository + 'static,
{
    let clinic_clock = ClinicClock::with_offset_minutes(clock.clone(), config.utc_offset_minutes)
        .map_err(io::Error::other)?;

    Ok(HttpStatePorts {
        appointments: Arc::new(AppointmentCommandService::new(
            appointments.clone(),
            clinic_clock.clone(),
        )),
        appointments_query: Arc::new(AppointmentQueryService::new(appointments, clinic_clock)),
        admin_auth: Arc::new(
            AdminAuthService::new(sessions, config.admin_account.clone(), clock)
                .with_ttl(config.session_ttl),
        ),
    })
}

/// Build the handler state, preferring the database when a pool is present.
pub(super) fn build_http_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> io::Result<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Arc::new(DieselAppointmentRepository::new(pool.clone())),
            Arc::new(DieselAdminSessionRepository::new(pool.clone())),
            config,
            clock,
        )?,
        None => {
            warn!("no database configured; appointments are held in memory only");
            build_ports(
                Arc::new(InMemoryAppointmentRepository::new()),
                Arc::new(InMemoryAdminSessionRepository::new()),
                config,
                clock,
            )?
        }
    };
    Ok(HttpState::new(ports))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use actix_web::cookie::Key;
    use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::rstest;

    use super::*;
    use clinic_backend::domain::{AdminAccount, AdminCredentials, TimeSlot};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn config() -> ServerConfig {
        let account = AdminAccount::with_password("doctor", "s3cret").expect("valid account");
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("valid address");
        ServerConfig::new(Key::generate(), false, addr, account)
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_accepts_the_configured_admin() {
        let state = build_http_state(&config(), Arc::new(DefaultClock)).expect("state builds");
        let credentials =
            AdminCredentials::try_from_parts("doctor", "s3cret").expect("credential shape");

        let login = state.admin_auth.login(&credentials).await.expect("login");
        let capability = state
            .admin_auth
            .authorize(&login.token)
            .await
            .expect("fresh session authorizes");
        assert_eq!(capability.username(), "doctor");
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_applies_the_clinic_offset() {
        // 22:30 UTC is already the next day at UTC+03:00.
        let clock = FixedClock(
            Utc.with_ymd_and_hms(2025, 3, 9, 22, 30, 0)
                .single()
                .expect("valid instant"),
        );
        let state = build_http_state(&config().with_utc_offset_minutes(180), Arc::new(clock))
            .expect("state builds");

        let yesterday = NaiveDate::from_ymd_opt(2025, 3, 9).expect("valid date");
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date");
        let past = state
            .appointments_query
            .available_slots(yesterday)
            .await
            .expect("slots");
        let current = state
            .appointments_query
            .available_slots(today)
            .await
            .expect("slots");

        assert!(past.slots.is_empty());
        assert_eq!(current.slots.len(), TimeSlot::ALL.len());
    }

    #[rstest]
    fn out_of_range_offsets_fail_to_build() {
        let result = build_http_state(
            &config().with_utc_offset_minutes(24 * 60),
            Arc::new(DefaultClock),
        );
        assert!(result.is_err());
    }
}
