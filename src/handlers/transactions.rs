use axum::{
    extract::State,
    routing::{get, post, put},
    Router,
};

use super::common::{
    resolve_paging, JsonBody, PathParam, QueryParams, ValidatedJson,
};
use crate::{
    auth::CurrentUser,
    dto::{PageQuery, PeriodQuery, TransactionRequest, UpdateStatusRequest},
    errors::ServiceError,
    ApiResponse, AppState,
};

/// Ledger routes. Every one of them requires a signed-in caller; the guard is
/// attached where the router is assembled.
pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/all", get(list_transactions))
        .route("/transactions/purchase", post(restock))
        .route("/transactions/sell", post(sell))
        .route("/transactions/return", post(return_to_supplier))
        .route("/transactions/by-month-year", get(list_by_period))
        .route(
            "/transactions/:id",
            get(get_transaction).put(update_status),
        )
        .route("/transactions/update/:id", put(update_status))
}

/// Record a purchase from a supplier
#[utoipa::path(
    post,
    path = "/api/transactions/purchase",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction Made Successfully", body = ApiResponse),
        (status = 400, description = "Missing supplier or invalid quantity", body = ApiResponse),
        (status = 401, description = "Authentication required", body = ApiResponse),
        (status = 404, description = "Product or supplier not found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn restock(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<TransactionRequest>,
) -> Result<ApiResponse, ServiceError> {
    let transaction = state.services.transactions.restock(request, &user).await?;
    Ok(ApiResponse::ok("Transaction Made Successfully").with_transaction(transaction))
}

/// Record a sale
#[utoipa::path(
    post,
    path = "/api/transactions/sell",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction Sold Successfully", body = ApiResponse),
        (status = 400, description = "Invalid quantity", body = ApiResponse),
        (status = 401, description = "Authentication required", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse),
        (status = 422, description = "Insufficient stock", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn sell(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<TransactionRequest>,
) -> Result<ApiResponse, ServiceError> {
    let transaction = state.services.transactions.sell(request, &user).await?;
    Ok(ApiResponse::ok("Transaction Sold Successfully").with_transaction(transaction))
}

/// Start a return to a supplier
#[utoipa::path(
    post,
    path = "/api/transactions/return",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction Returned Successfully Initialized", body = ApiResponse),
        (status = 400, description = "Missing supplier or invalid quantity", body = ApiResponse),
        (status = 401, description = "Authentication required", body = ApiResponse),
        (status = 404, description = "Product or supplier not found", body = ApiResponse),
        (status = 422, description = "Insufficient stock", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn return_to_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<TransactionRequest>,
) -> Result<ApiResponse, ServiceError> {
    let transaction = state
        .services
        .transactions
        .return_to_supplier(request, &user)
        .await?;
    Ok(ApiResponse::ok("Transaction Returned Successfully Initialized")
        .with_transaction(transaction))
}

/// Page through the ledger, newest first
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of transactions", body = ApiResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiResponse),
        (status = 401, description = "Authentication required", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<ApiResponse, ServiceError> {
    let (page, size) = resolve_paging(&query, &state.config)?;
    let result = state
        .services
        .transactions
        .list_transactions(page, size, query.search_text.as_deref())
        .await?;

    Ok(ApiResponse::ok("success")
        .with_paging(result.total_pages, result.total_elements)
        .with_transactions(result.items))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction with product, user and supplier", body = ApiResponse),
        (status = 404, description = "Transaction Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<ApiResponse, ServiceError> {
    let transaction = state.services.transactions.get_transaction(id).await?;
    Ok(ApiResponse::ok("success").with_transaction(transaction))
}

/// Transactions created in one calendar month
#[utoipa::path(
    get,
    path = "/api/transactions/by-month-year",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Transactions of the month", body = ApiResponse),
        (status = 400, description = "Month or year out of range", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn list_by_period(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> Result<ApiResponse, ServiceError> {
    let transactions = state
        .services
        .transactions
        .list_transactions_by_period(query.month, query.year)
        .await?;
    Ok(ApiResponse::ok("success").with_transactions(transactions))
}

#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    params(("id" = i64, Path, description = "Transaction id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Transaction Status Successfully Updated", body = ApiResponse),
        (status = 400, description = "Unknown status", body = ApiResponse),
        (status = 404, description = "Transaction Not Found", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "transactions"
)]
pub async fn update_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> Result<ApiResponse, ServiceError> {
    let transaction = state
        .services
        .transactions
        .update_status(id, request.status())
        .await?;
    Ok(ApiResponse::ok("Transaction Status Successfully Updated").with_transaction(transaction))
}
