//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{AppSettings, BuildMode};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use chrono::TimeDelta;
use mockable::DefaultClock;

use clinic_backend::Trace;
#[cfg(debug_assertions)]
use clinic_backend::doc::ApiDoc;
use clinic_backend::inbound::http::configure_routes;
use clinic_backend::inbound::http::error::configure_extractors;
use clinic_backend::inbound::http::health::{HealthState, live, ready};
use clinic_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::build_http_state;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    session_ttl: TimeDelta,
}

fn session_middleware(
    key: Key,
    cookie_secure: bool,
    session_ttl: TimeDelta,
) -> SessionMiddleware<CookieSessionStore> {
    let ttl = actix_web::cookie::time::Duration::seconds(session_ttl.num_seconds());
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        session_ttl,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session_middleware(key, cookie_secure, session_ttl))
        .configure(configure_routes);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(configure_extractors)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The returned server must be awaited to drive the listener. Readiness is
/// flagged once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the clinic offset is invalid or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config, Arc::new(DefaultClock))?);
    let ServerConfig {
        key,
        cookie_secure,
        bind_addr,
        session_ttl,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            session_ttl,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
