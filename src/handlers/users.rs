use axum::{
    extract::State,
    routing::{delete, get, put},
    Router,
};

use super::common::{PathParam, ValidatedJson};
use crate::{
    auth::{AuthRouterExt, CurrentUser},
    dto::UpdateUserRequest,
    entities::UserRole,
    errors::ServiceError,
    ApiResponse, AppState,
};

pub fn user_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/users/all", get(list_users))
        .route("/users/delete/:id", delete(delete_user))
        .with_role(UserRole::Admin);

    let signed_in = Router::new()
        .route("/users/current", get(current_user))
        .route("/users/update/:id", put(update_user))
        .route("/users/transactions/:id", get(user_transactions))
        .with_auth();

    admin.merge(signed_in)
}

#[utoipa::path(
    get,
    path = "/api/users/all",
    responses(
        (status = 200, description = "All users, newest first", body = ApiResponse),
        (status = 403, description = "ADMIN role required", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<ApiResponse, ServiceError> {
    let users = state.services.users.list_users().await?;
    Ok(ApiResponse::ok("success").with_users(users))
}

#[utoipa::path(
    get,
    path = "/api/users/current",
    responses(
        (status = 200, description = "Profile of the caller", body = ApiResponse),
        (status = 401, description = "Authentication required", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn current_user(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<ApiResponse, ServiceError> {
    let profile = state.services.users.get_user(user.id).await?;
    Ok(ApiResponse::ok("success").with_user(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/update/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User Successfully updated", body = ApiResponse),
        (status = 403, description = "Not the caller's profile, or a role change by a non-ADMIN", body = ApiResponse),
        (status = 404, description = "User Not Found", body = ApiResponse),
        (status = 409, description = "Email already registered", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    PathParam(id): PathParam<i64>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<ApiResponse, ServiceError> {
    let user = state
        .services
        .users
        .update_user(id, request, &caller)
        .await?;
    Ok(ApiResponse::ok("User Successfully updated").with_user(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/delete/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User Successfully Deleted", body = ApiResponse),
        (status = 404, description = "User Not Found", body = ApiResponse),
        (status = 409, description = "User owns ledger rows", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    state.services.users.delete_user(id).await?;
    Ok(ApiResponse::ok("User Successfully Deleted"))
}

#[utoipa::path(
    get,
    path = "/api/users/transactions/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User with their transactions", body = ApiResponse),
        (status = 404, description = "User Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn user_transactions(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    let user = state.services.users.user_transactions(id).await?;
    Ok(ApiResponse::ok("success").with_user(user))
}
