//! Registration and login handlers.
//!
//! ```text
//! POST /register {"name":"Ada","email":"ada@example.com","phone":"555","password":"pw"}
//! POST /login {"email":"ada@example.com","password":"pw"}
//! ```

use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::domain::auth::{hash_password, verify_password};
use crate::domain::{Error, LoginCredentials, NewUser, Registration};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for `POST /register`.
///
/// Fields are optional at the serde level; absent and blank values are
/// rejected identically with a single `Missing fields` error.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    pub name: Option<String>,
    /// Login email, unique across users.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Raw password, hashed before persistence.
    pub password: Option<String>,
}

/// Response body for a successful registration.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Store-assigned identity of the new user.
    pub user_id: String,
}

/// Request body for `POST /login`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: Option<String>,
    /// Raw password.
    pub password: Option<String>,
}

/// Response body for a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token bound to the user identity.
    pub access_token: String,
    /// Display name for the authenticated user.
    pub name: String,
    /// Store-assigned identity, mirroring the token subject.
    pub identity: String,
}

/// Register a new user.
///
/// The email uniqueness check is check-then-insert: two concurrent
/// registrations for the same email can both pass it. The store carries no
/// unique index to serialize them.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing fields or email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration = Registration::try_from_parts(
        payload.name.as_deref().unwrap_or_default(),
        payload.email.as_deref().unwrap_or_default(),
        payload.phone.as_deref().unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
    )
    .map_err(|_| Error::invalid_request("Missing fields"))?;

    if state.users.find_by_email(registration.email()).await?.is_some() {
        return Err(Error::conflict("Email already registered"));
    }

    let password_hash = hash_password(registration.password()).map_err(|err| {
        error!(error = %err, "password hashing failed");
        Error::internal("Internal server error")
    })?;
    let user_id = state
        .users
        .insert(NewUser::from_registration(&registration, password_hash))
        .await?;
    info!(user_id = %user_id, "user registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully".to_owned(),
        user_id,
    }))
}

/// Authenticate a user and mint an access token.
///
/// Lookup is by email; the password is verified against the stored hash. A
/// missing user and a wrong password produce the same response.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        payload.email.as_deref().unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
    )
    .map_err(|_| Error::invalid_request("Missing email or password"))?;

    let user = state
        .users
        .find_by_email(credentials.email())
        .await?
        .filter(|user| verify_password(credentials.password(), &user.password_hash))
        .ok_or_else(|| Error::unauthorized("Invalid email or password"))?;

    let access_token = state.tokens.mint(&user.id, Utc::now()).map_err(|err| {
        error!(error = %err, "token minting failed");
        Error::internal("Internal server error")
    })?;
    info!(user_id = %user.id, "login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        name: user.name,
        identity: user.id,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::auth::TokenIssuer;
    use crate::outbound::persistence::{InMemoryTaskRepository, InMemoryUserRepository};

    const TEST_SECRET: &[u8] = b"test signing secret";

    fn test_state() -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(InMemoryTaskRepository::default()),
            TokenIssuer::from_secret(TEST_SECRET),
        ))
    }

    async fn init(
        state: web::Data<HttpState>,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(App::new().app_data(state).service(register).service(login)).await
    }

    fn register_body() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "phone": "555-0100",
            "password": "correct horse"
        })
    }

    #[actix_web::test]
    async fn register_persists_and_returns_identity() {
        let app = init(test_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("User registered successfully")
        );
        let user_id = body.get("user_id").and_then(Value::as_str).expect("user_id");
        assert_eq!(user_id.len(), 24);
    }

    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let app = init(test_state()).await;
        let first = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(second).await;
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some("Email already registered")
        );
    }

    #[rstest]
    #[case(json!({ "email": "a@b.c", "phone": "1", "password": "pw" }))]
    #[case(json!({ "name": "", "email": "a@b.c", "phone": "1", "password": "pw" }))]
    #[case(json!({ "name": "Ada", "email": "a@b.c", "phone": "1" }))]
    #[actix_web::test]
    async fn incomplete_registration_is_rejected(#[case] body: Value) {
        let app = init(test_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.get("error").and_then(Value::as_str), Some("Missing fields"));
    }

    #[actix_web::test]
    async fn login_round_trips_a_verifiable_token() {
        let state = test_state();
        let app = init(state.clone()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;
        let registered: Value = test::read_body_json(res).await;
        let user_id = registered
            .get("user_id")
            .and_then(Value::as_str)
            .expect("user_id")
            .to_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": "ada@example.com", "password": "correct horse" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.get("name").and_then(Value::as_str), Some("Ada"));
        assert_eq!(
            body.get("identity").and_then(Value::as_str),
            Some(user_id.as_str())
        );

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .expect("access_token");
        let claims = state.tokens.verify(token).expect("token verifies");
        assert_eq!(claims.sub, user_id);
    }

    #[rstest]
    #[case(json!({ "email": "ada@example.com", "password": "wrong" }))]
    #[case(json!({ "email": "nobody@example.com", "password": "correct horse" }))]
    #[actix_web::test]
    async fn bad_credentials_yield_401(#[case] body: Value) {
        let app = init(test_state()).await;
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/login").set_json(body).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some("Invalid email or password")
        );
    }

    #[actix_web::test]
    async fn missing_login_fields_yield_400() {
        let app = init(test_state()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": "ada@example.com" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some("Missing email or password")
        );
    }
}
