use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Router,
};

use super::common::{PathParam, ValidatedJson};
use crate::{
    auth::AuthRouterExt, dto::CategoryRequest, entities::UserRole, errors::ServiceError,
    ApiResponse, AppState,
};

pub fn category_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/categories/add", post(create_category))
        .route("/categories/update/:id", put(update_category))
        .route("/categories/delete/:id", delete(delete_category))
        .with_role(UserRole::Admin);

    let signed_in = Router::new()
        .route("/categories/all", get(list_categories))
        .route("/categories/:id", get(get_category))
        .with_auth();

    admin.merge(signed_in)
}

#[utoipa::path(
    post,
    path = "/api/categories/add",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created successfully", body = ApiResponse),
        (status = 409, description = "Name already in use", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CategoryRequest>,
) -> Result<ApiResponse, ServiceError> {
    let category = state.services.categories.create(request).await?;
    Ok(ApiResponse::ok("Category created successfully").with_category(category))
}

#[utoipa::path(
    get,
    path = "/api/categories/all",
    responses((status = 200, description = "All categories", body = ApiResponse)),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<ApiResponse, ServiceError> {
    let categories = state.services.categories.list().await?;
    Ok(ApiResponse::ok("success").with_categories(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse),
        (status = 404, description = "Category Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    let category = state.services.categories.get(id).await?;
    Ok(ApiResponse::ok("success").with_category(category))
}

#[utoipa::path(
    put,
    path = "/api/categories/update/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category Successfully Updated", body = ApiResponse),
        (status = 404, description = "Category Not Found", body = ApiResponse),
        (status = 409, description = "Name already in use", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    ValidatedJson(request): ValidatedJson<CategoryRequest>,
) -> Result<ApiResponse, ServiceError> {
    let category = state.services.categories.update(id, request).await?;
    Ok(ApiResponse::ok("Category Successfully Updated").with_category(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/delete/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category Successfully Deleted", body = ApiResponse),
        (status = 404, description = "Category Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    state.services.categories.delete(id).await?;
    Ok(ApiResponse::ok("Category Successfully Deleted"))
}
