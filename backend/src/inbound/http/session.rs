//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie carries only the opaque admin token. Whether that
//! token still names a live session is decided by the [`AdminAuth`] port on
//! every admin request.
//!
//! [`AdminAuth`]: crate::domain::ports::AdminAuth

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AdminCapability, AdminSessionToken, Error};
use crate::inbound::http::state::HttpState;

pub(crate) const ADMIN_TOKEN_KEY: &str = "admin_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the admin token in the session cookie, rotating the cookie.
    pub fn persist_admin_token(&self, token: &AdminSessionToken) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(ADMIN_TOKEN_KEY, token.expose())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the admin token from the session, if present.
    pub fn admin_token(&self) -> Result<Option<AdminSessionToken>, Error> {
        let raw = self
            .0
            .get::<String>(ADMIN_TOKEN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.as_deref().and_then(AdminSessionToken::from_presented))
    }

    /// Drop everything held in the session cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Resolve the session into an admin capability or return
    /// `401 Unauthorized`.
    pub async fn require_admin(&self, state: &HttpState) -> Result<AdminCapability, Error> {
        let token = self
            .admin_token()?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        state.admin_auth.authorize(&token).await
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::AdminCredentials;
    use crate::domain::ports::{AdminAuth, AdminLogin};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::test_session_middleware;

    /// Accepts exactly one token value.
    struct SingleTokenAuth;

    #[async_trait]
    impl AdminAuth for SingleTokenAuth {
        async fn login(&self, _credentials: &AdminCredentials) -> Result<AdminLogin, Error> {
            Err(Error::unauthorized("invalid credentials"))
        }

        async fn authorize(&self, token: &AdminSessionToken) -> Result<AdminCapability, Error> {
            if token.expose() == "good-token" {
                Ok(AdminCapability::granted_to("doctor"))
            } else {
                Err(Error::unauthorized("login required"))
            }
        }

        async fn logout(&self, _token: &AdminSessionToken) -> Result<(), Error> {
            Ok(())
        }
    }

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = HttpState::new(HttpStatePorts {
            admin_auth: Arc::new(SingleTokenAuth),
            ..HttpStatePorts::fixtures()
        });
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .route(
                "/set/{token}",
                web::get().to(|session: SessionContext, token: web::Path<String>| async move {
                    let token = AdminSessionToken::from_presented(&token)
                        .ok_or_else(|| Error::invalid_request("blank token"))?;
                    session.persist_admin_token(&token)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/clear",
                web::get().to(|session: SessionContext| async move {
                    session.clear();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/whoami",
                web::get().to(
                    |session: SessionContext, state: web::Data<HttpState>| async move {
                        let admin = session.require_admin(&state).await?;
                        Ok::<_, Error>(HttpResponse::Ok().body(admin.username().to_owned()))
                    },
                ),
            )
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[rstest]
    #[case("good-token", StatusCode::OK)]
    #[case("stale-token", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn token_in_cookie_is_authorised_by_the_port(
        #[case] token: &str,
        #[case] expected: StatusCode,
    ) {
        let app = test::init_service(session_test_app()).await;
        let set_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/set/{token}"))
                .to_request(),
        )
        .await;
        assert_eq!(set_res.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn cleared_session_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set/good-token").to_request(),
        )
        .await;
        let clear_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/clear")
                .cookie(session_cookie(&set_res))
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(session_cookie(&clear_res))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
