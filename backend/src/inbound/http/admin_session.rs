//! Admin login and logout.
//!
//! ```text
//! POST /api/v1/admin/login {"username":"doctor","password":"..."}
//! POST /api/v1/admin/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AdminCredentials, Error, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/admin/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    /// Administrator login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl TryFrom<AdminLoginRequest> for AdminCredentials {
    type Error = LoginValidationError;

    fn try_from(value: AdminLoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Confirmation returned after a successful login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    /// Administrator login name.
    pub username: String,
    /// When the session lapses.
    #[schema(format = "date-time")]
    pub expires_at: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Open an admin session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login success", body = AdminLoginResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<web::Json<AdminLoginResponse>> {
    let credentials =
        AdminCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let login = state.admin_auth.login(&credentials).await?;
    session.persist_admin_token(&login.token)?;
    Ok(web::Json(AdminLoginResponse {
        username: login.username,
        expires_at: login.expires_at.to_rfc3339(),
    }))
}

/// Close the admin session. Succeeds even when no session is open.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses(
        (status = 204, description = "Session closed"),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminLogout"
)]
#[post("/admin/logout")]
pub async fn admin_logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(token) = session.admin_token()? {
        state.admin_auth.logout(&token).await?;
    }
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::inbound::http::test_utils::{admin_cookie, api_app, in_memory_state};
    use crate::test_support::TEST_ADMIN_USERNAME;

    #[rstest]
    #[case("   ", "pw", StatusCode::BAD_REQUEST, Some("empty_username"))]
    #[case("doctor", "", StatusCode::BAD_REQUEST, Some("empty_password"))]
    #[case("doctor", "wrong", StatusCode::UNAUTHORIZED, None)]
    #[case("nurse", "wrong", StatusCode::UNAUTHORIZED, None)]
    #[actix_web::test]
    async fn login_rejects_bad_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] status: StatusCode,
        #[case] detail_code: Option<&str>,
    ) {
        let (_, state) = in_memory_state();
        let app = actix_test::init_service(api_app(state)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(AdminLoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), status);
        assert!(
            response
                .response()
                .cookies()
                .all(|cookie| cookie.name() != "session"),
            "no session cookie on failure"
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.pointer("/details/code").and_then(Value::as_str),
            detail_code
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_revokes_the_session() {
        let (_, state) = in_memory_state();
        let app = actix_test::init_service(api_app(state)).await;
        let cookie = admin_cookie(&app).await;

        let pending = actix_test::TestRequest::get()
            .uri("/api/v1/admin/appointments/pending")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, pending).await.status(),
            StatusCode::OK
        );

        let logout = actix_test::TestRequest::post()
            .uri("/api/v1/admin/logout")
            .cookie(cookie.clone())
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, logout).await.status(),
            StatusCode::NO_CONTENT
        );

        // Replaying the old cookie must fail: the token row is gone.
        let replay = actix_test::TestRequest::get()
            .uri("/api/v1/admin/appointments/pending")
            .cookie(cookie)
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, replay).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn login_reports_username_and_expiry() {
        let (_, state) = in_memory_state();
        let app = actix_test::init_service(api_app(state)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/login")
            .set_json(json!({
                "username": TEST_ADMIN_USERNAME,
                "password": crate::test_support::TEST_ADMIN_PASSWORD,
            }))
            .to_request();

        let body: AdminLoginResponse =
            actix_test::read_body_json(actix_test::call_service(&app, request).await).await;

        assert_eq!(body.username, TEST_ADMIN_USERNAME);
        assert_eq!(body.expires_at, "2025-03-10T06:00:00+00:00");
    }
}
