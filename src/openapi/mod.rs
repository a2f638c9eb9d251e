use axum::Json;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory Ledger API",
        version = "0.1.0",
        description = r#"
Products, categories and suppliers, with every stock movement recorded in an
append-only transaction ledger.

Authenticate with `POST /api/auth/login` and send the returned token as

```
Authorization: Bearer <token>
```
"#
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "transactions", description = "Stock movements and the ledger"),
        (name = "users", description = "User administration"),
        (name = "products", description = "Product catalog"),
        (name = "categories", description = "Product categories"),
        (name = "suppliers", description = "Suppliers"),
        (name = "health", description = "Health check")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,

        crate::handlers::transactions::restock,
        crate::handlers::transactions::sell,
        crate::handlers::transactions::return_to_supplier,
        crate::handlers::transactions::list_transactions,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::list_by_period,
        crate::handlers::transactions::update_status,

        crate::handlers::users::list_users,
        crate::handlers::users::current_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::user_transactions,

        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::ApiResponse,
            crate::dto::TransactionRequest,
            crate::dto::UpdateStatusRequest,
            crate::dto::TransactionDto,
            crate::dto::RegisterRequest,
            crate::dto::LoginRequest,
            crate::dto::UpdateUserRequest,
            crate::dto::UserDto,
            crate::dto::UserSummary,
            crate::dto::ProductRequest,
            crate::dto::UpdateProductRequest,
            crate::dto::ProductDto,
            crate::dto::CategoryRequest,
            crate::dto::CategoryDto,
            crate::dto::SupplierRequest,
            crate::dto::SupplierDto,
            crate::entities::TransactionType,
            crate::entities::TransactionStatus,
            crate::entities::UserRole,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme the secured paths refer to.
pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Serves the generated document at `/api-docs/openapi.json`.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
