use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Router,
};

use super::common::{PathParam, ValidatedJson};
use crate::{
    auth::AuthRouterExt,
    dto::{ProductRequest, UpdateProductRequest},
    entities::UserRole,
    errors::ServiceError,
    ApiResponse, AppState,
};

pub fn product_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/products/add", post(create_product))
        .route("/products/update/:id", put(update_product))
        .route("/products/delete/:id", delete(delete_product))
        .with_role(UserRole::Admin);

    let signed_in = Router::new()
        .route("/products/all", get(list_products))
        .route("/products/:id", get(get_product))
        .with_auth();

    admin.merge(signed_in)
}

#[utoipa::path(
    post,
    path = "/api/products/add",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product created successfully", body = ApiResponse),
        (status = 400, description = "Invalid product", body = ApiResponse),
        (status = 409, description = "Sku already in use", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ProductRequest>,
) -> Result<ApiResponse, ServiceError> {
    let product = state.services.products.create(request).await?;
    Ok(ApiResponse::ok("Product created successfully").with_product(product))
}

#[utoipa::path(
    get,
    path = "/api/products/all",
    responses((status = 200, description = "All products, newest first", body = ApiResponse)),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<ApiResponse, ServiceError> {
    let products = state.services.products.list().await?;
    Ok(ApiResponse::ok("success").with_products(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ApiResponse),
        (status = 404, description = "Product Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    let product = state.services.products.get(id).await?;
    Ok(ApiResponse::ok("success").with_product(product))
}

/// Catalog edit; stock can only change through the transaction endpoints
#[utoipa::path(
    put,
    path = "/api/products/update/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product Successfully Updated", body = ApiResponse),
        (status = 404, description = "Product Not Found", body = ApiResponse),
        (status = 409, description = "Sku already in use", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> Result<ApiResponse, ServiceError> {
    let product = state.services.products.update(id, request).await?;
    Ok(ApiResponse::ok("Product Successfully Updated").with_product(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/delete/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product Successfully Deleted", body = ApiResponse),
        (status = 404, description = "Product Not Found", body = ApiResponse),
        (status = 409, description = "Product is referenced by the ledger", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(ApiResponse::ok("Product Successfully Deleted"))
}
