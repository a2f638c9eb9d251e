use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Router,
};

use super::common::{PathParam, ValidatedJson};
use crate::{
    auth::AuthRouterExt, dto::SupplierRequest, entities::UserRole, errors::ServiceError,
    ApiResponse, AppState,
};

pub fn supplier_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/suppliers/add", post(create_supplier))
        .route("/suppliers/update/:id", put(update_supplier))
        .route("/suppliers/delete/:id", delete(delete_supplier))
        .with_role(UserRole::Admin);

    let signed_in = Router::new()
        .route("/suppliers/all", get(list_suppliers))
        .route("/suppliers/:id", get(get_supplier))
        .with_auth();

    admin.merge(signed_in)
}

#[utoipa::path(
    post,
    path = "/api/suppliers/add",
    request_body = SupplierRequest,
    responses(
        (status = 200, description = "Supplier created successfully", body = ApiResponse),
        (status = 400, description = "Invalid supplier", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SupplierRequest>,
) -> Result<ApiResponse, ServiceError> {
    let supplier = state.services.suppliers.create(request).await?;
    Ok(ApiResponse::ok("Supplier created successfully").with_supplier(supplier))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/all",
    responses((status = 200, description = "All suppliers", body = ApiResponse)),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn list_suppliers(State(state): State<AppState>) -> Result<ApiResponse, ServiceError> {
    let suppliers = state.services.suppliers.list().await?;
    Ok(ApiResponse::ok("success").with_suppliers(suppliers))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(("id" = i64, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier", body = ApiResponse),
        (status = 404, description = "Supplier Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    let supplier = state.services.suppliers.get(id).await?;
    Ok(ApiResponse::ok("success").with_supplier(supplier))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/update/{id}",
    params(("id" = i64, Path, description = "Supplier id")),
    request_body = SupplierRequest,
    responses(
        (status = 200, description = "Supplier Successfully Updated", body = ApiResponse),
        (status = 404, description = "Supplier Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    ValidatedJson(request): ValidatedJson<SupplierRequest>,
) -> Result<ApiResponse, ServiceError> {
    let supplier = state.services.suppliers.update(id, request).await?;
    Ok(ApiResponse::ok("Supplier Successfully Updated").with_supplier(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/delete/{id}",
    params(("id" = i64, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier Successfully Deleted", body = ApiResponse),
        (status = 404, description = "Supplier Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    state.services.suppliers.delete(id).await?;
    Ok(ApiResponse::ok("Supplier Successfully Deleted"))
}
