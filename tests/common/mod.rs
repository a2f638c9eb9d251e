#![allow(dead_code)]

use std::str::FromStr;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use inventory_ledger_api::{
    config::{AppConfig, StockPolicy},
    db,
    dto::{ProductDto, ProductRequest, RegisterRequest, SupplierDto, SupplierRequest, UserDto},
    entities::UserRole,
    AppState,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const MANAGER_EMAIL: &str = "manager@example.com";
pub const PASSWORD: &str = "s3cret-pass";

/// Helper harness for spinning up the full router over a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: UserDto,
    pub manager: UserDto,
    admin_token: String,
    manager_token: String,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_stock_policy(StockPolicy::Enforce).await
    }

    pub async fn with_stock_policy(stock_policy: StockPolicy) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("ledger_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.stock_policy = stock_policy;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(pool, cfg);
        let admin = register(&state, "Admin", ADMIN_EMAIL, UserRole::Admin).await;
        let manager = register(&state, "Manager", MANAGER_EMAIL, UserRole::Manager).await;

        let admin_token = state.tokens.issue(ADMIN_EMAIL).expect("issue admin token");
        let manager_token = state
            .tokens
            .issue(MANAGER_EMAIL)
            .expect("issue manager token");

        let router = inventory_ledger_api::build_router(state.clone());

        Self {
            router,
            state,
            admin,
            manager,
            admin_token,
            manager_token,
            _dir: dir,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn manager_token(&self) -> &str {
        &self.manager_token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Request as the seeded manager.
    pub async fn request_as_manager(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.manager_token()))
            .await
    }

    /// Request as the seeded admin.
    pub async fn request_as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.admin_token()))
            .await
    }

    pub async fn seed_product(&self, sku: &str, price: &str, stock: i32) -> ProductDto {
        self.state
            .services
            .products
            .create(ProductRequest {
                name: format!("Product {}", sku),
                sku: sku.to_string(),
                price: Decimal::from_str(price).expect("valid price"),
                stock_quantity: stock,
                category_id: None,
                description: None,
                image_url: None,
                expiry_date: None,
            })
            .await
            .expect("seed product for tests")
    }

    pub async fn seed_supplier(&self, name: &str) -> SupplierDto {
        self.state
            .services
            .suppliers
            .create(SupplierRequest {
                name: name.to_string(),
                contact_info: Some("orders@supplier.test".to_string()),
                address: None,
            })
            .await
            .expect("seed supplier for tests")
    }

    /// Current stock of a product, read through the catalog service.
    pub async fn stock_of(&self, product_id: i64) -> i32 {
        self.state
            .services
            .products
            .get(product_id)
            .await
            .expect("product exists")
            .stock_quantity
    }
}

/// Seeds through the service with no caller; the admin is registered first so
/// it takes the bootstrap path that honours the requested role.
async fn register(state: &AppState, name: &str, email: &str, role: UserRole) -> UserDto {
    let request = RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        phone_number: "555-0100".to_string(),
        role: Some(role),
    };
    state
        .services
        .users
        .register(request, None)
        .await
        .expect("seed user for tests")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimal fields serialize as strings; compare by value, not scale.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}
