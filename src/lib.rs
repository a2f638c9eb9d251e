//! Inventory Ledger API
//!
//! Products, categories and suppliers, with every stock movement recorded in
//! an append-only transaction ledger behind bearer-token authentication.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, TokenService};
use crate::dto::{CategoryDto, ProductDto, SupplierDto, TransactionDto, UserDto};
use crate::entities::UserRole;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    /// Signing key material, fixed for the life of the process
    pub tokens: Arc<TokenService>,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: config::AppConfig) -> Self {
        let db = Arc::new(db);
        let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.jwt_ttl_secs));
        let services = services::AppServices::new(db.clone(), tokens.clone(), config.stock_policy);

        Self {
            db,
            config: Arc::new(config),
            tokens,
            services,
        }
    }
}

/// Uniform envelope for every response, successful or not.
///
/// Only `status`, `message` and `timestamp` are always present; everything
/// else is omitted unless the operation fills it.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: u16,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<SupplierDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppliers: Option<Vec<SupplierDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionDto>>,
}

impl ApiResponse {
    /// Empty envelope stamped with the current time and request id.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            token: None,
            role: None,
            expiration_time: None,
            total_pages: None,
            total_elements: None,
            user: None,
            users: None,
            product: None,
            products: None,
            category: None,
            categories: None,
            supplier: None,
            suppliers: None,
            transaction: None,
            transactions: None,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }

    /// Error envelope; never carries a payload.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message)
    }

    pub fn with_token(mut self, token: String, role: UserRole, expiration_time: String) -> Self {
        self.token = Some(token);
        self.role = Some(role);
        self.expiration_time = Some(expiration_time);
        self
    }

    pub fn with_paging(mut self, total_pages: u64, total_elements: u64) -> Self {
        self.total_pages = Some(total_pages);
        self.total_elements = Some(total_elements);
        self
    }

    pub fn with_user(mut self, user: UserDto) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_users(mut self, users: Vec<UserDto>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_product(mut self, product: ProductDto) -> Self {
        self.product = Some(product);
        self
    }

    pub fn with_products(mut self, products: Vec<ProductDto>) -> Self {
        self.products = Some(products);
        self
    }

    pub fn with_category(mut self, category: CategoryDto) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_categories(mut self, categories: Vec<CategoryDto>) -> Self {
        self.categories = Some(categories);
        self
    }

    pub fn with_supplier(mut self, supplier: SupplierDto) -> Self {
        self.supplier = Some(supplier);
        self
    }

    pub fn with_suppliers(mut self, suppliers: Vec<SupplierDto>) -> Self {
        self.suppliers = Some(suppliers);
        self
    }

    pub fn with_transaction(mut self, transaction: TransactionDto) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<TransactionDto>) -> Self {
        self.transactions = Some(transactions);
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}


/// Every route under `/api`. Identity comes from the gate installed by
/// [`build_router`]; the guards on each group decide who gets through.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth::auth_routes())
        .merge(handlers::transactions::transaction_routes().with_auth())
        .merge(handlers::users::user_routes())
        .merge(handlers::products::product_routes())
        .merge(handlers::categories::category_routes())
        .merge(handlers::suppliers::supplier_routes())
}

/// Full application: API, health, OpenAPI document and the middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .fallback(handlers::common::route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_gate))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(crate::tracing::configure_http_tracing())
        .layer(middleware::from_fn(middleware_helpers::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// Explicit origins when configured, permissive when allowed, otherwise
/// same-origin only.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let configured_origins = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

async fn request_logging_middleware(
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    ::tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
