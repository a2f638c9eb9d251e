use axum::{extract::State, routing::post, Router};

use super::common::ValidatedJson;
use crate::{
    auth::CurrentUser,
    dto::{LoginRequest, RegisterRequest},
    errors::ServiceError,
    ApiResponse, AppState,
};

/// Public routes: registration and login.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "user created successfully", body = ApiResponse),
        (status = 400, description = "Invalid registration data", body = ApiResponse),
        (status = 409, description = "Email already registered", body = ApiResponse)
    ),
    tag = "auth"
)]
/// Open to anonymous callers. The requested role only sticks when an ADMIN
/// registers the account, or when it is the first account.
pub async fn register(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<ApiResponse, ServiceError> {
    let user = state
        .services
        .users
        .register(request, caller.as_ref())
        .await?;
    Ok(ApiResponse::ok("user created successfully").with_user(user))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "user logged in successfully", body = ApiResponse),
        (status = 400, description = "password does not match", body = ApiResponse),
        (status = 404, description = "Email not Found", body = ApiResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse, ServiceError> {
    let outcome = state.services.users.login(request).await?;
    Ok(ApiResponse::ok("user logged in successfully").with_token(
        outcome.token,
        outcome.role,
        outcome.expiration_time,
    ))
}
