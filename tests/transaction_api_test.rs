//! End-to-end tests for the stock movement endpoints and ledger queries.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Datelike, Utc};
use common::{decimal, response_json, TestApp};
use inventory_ledger_api::config::StockPolicy;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn sell_reduces_stock_and_records_the_sale() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "12.50", 10).await;

    let response = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": product.id, "quantity": 3, "description": "counter sale" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "Transaction Sold Successfully");

    let tx = &body["transaction"];
    assert_eq!(tx["transactionType"], "SALE");
    assert_eq!(tx["status"], "COMPLETED");
    assert_eq!(tx["totalProducts"], 3);
    assert_eq!(decimal(&tx["totalPrice"]), Decimal::new(375, 1));
    assert_eq!(tx["userId"], app.manager.id);
    assert!(tx.get("supplierId").is_none());

    assert_eq!(app.stock_of(product.id).await, 7);
}

#[tokio::test]
async fn missing_authorization_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "12.50", 10).await;

    let response = app
        .request(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": product.id, "quantity": 3 })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["status"], 401);
    assert!(body["message"].is_string());
    assert!(body.get("transaction").is_none());

    assert_eq!(app.stock_of(product.id).await, 10);
    let listed = app
        .request_as_admin(Method::GET, "/api/transactions/all", None)
        .await;
    assert_eq!(response_json(listed).await["totalElements"], 0);
}

#[tokio::test]
async fn invalid_and_expired_tokens_behave_like_no_token() {
    let app = TestApp::new().await;

    let garbage = app
        .request(
            Method::GET,
            "/api/transactions/all",
            None,
            Some("not-a-jwt"),
        )
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let issued_long_ago = Utc::now() - chrono::Duration::days(400);
    let expired = app
        .state
        .tokens
        .issue_at(common::MANAGER_EMAIL, issued_long_ago)
        .unwrap();
    let response = app
        .request(Method::GET, "/api/transactions/all", None, Some(&expired))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let unknown_subject = app.state.tokens.issue("ghost@example.com").unwrap();
    let response = app
        .request(
            Method::GET,
            "/api/transactions/all",
            None,
            Some(&unknown_subject),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn purchase_without_supplier_is_refused_and_stock_unchanged() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "12.50", 10).await;

    let response = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "quantity": 5 })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Supplier Id is Required");
    assert_eq!(app.stock_of(product.id).await, 10);
}

#[tokio::test]
async fn purchase_increases_stock_and_links_the_supplier() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "2.00", 1).await;
    let supplier = app.seed_supplier("Acme Wholesale").await;

    let response = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "quantity": 20, "supplierId": supplier.id })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Transaction Made Successfully");
    assert_eq!(body["transaction"]["transactionType"], "PURCHASE");
    assert_eq!(body["transaction"]["supplierId"], supplier.id);
    assert_eq!(decimal(&body["transaction"]["totalPrice"]), Decimal::new(40, 0));
    assert_eq!(app.stock_of(product.id).await, 21);
}

#[tokio::test]
async fn return_to_supplier_starts_processing_with_zero_value() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "9.99", 8).await;
    let supplier = app.seed_supplier("Acme Wholesale").await;

    let response = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/return",
            Some(json!({ "productId": product.id, "quantity": 2, "supplierId": supplier.id })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Transaction Returned Successfully Initialized");
    assert_eq!(body["transaction"]["transactionType"], "RETURN_TO_SUPPLIER");
    assert_eq!(body["transaction"]["status"], "PROCESSING");
    assert_eq!(decimal(&body["transaction"]["totalPrice"]), Decimal::ZERO);
    assert_eq!(app.stock_of(product.id).await, 6);
}

#[tokio::test]
async fn selling_more_than_available_is_refused() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "12.50", 2).await;

    let response = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": product.id, "quantity": 5 })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("WIDGET-1"), "unexpected message: {message}");
    assert_eq!(app.stock_of(product.id).await, 2);
}

#[tokio::test]
async fn allow_negative_policy_lets_stock_go_below_zero() {
    let app = TestApp::with_stock_policy(StockPolicy::AllowNegative).await;
    let product = app.seed_product("WIDGET-1", "1.00", 2).await;

    let response = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": product.id, "quantity": 5 })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.stock_of(product.id).await, -3);
}

#[tokio::test]
async fn non_positive_quantities_and_unknown_references_are_rejected() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "12.50", 5).await;

    let zero = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": product.id, "quantity": 0 })),
        )
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let missing_product = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": 9999, "quantity": 1 })),
        )
        .await;
    assert_eq!(missing_product.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(missing_product).await["message"],
        "Product Not Found"
    );

    let missing_supplier = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "quantity": 1, "supplierId": 4242 })),
        )
        .await;
    assert_eq!(missing_supplier.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(missing_supplier).await["message"],
        "Supplier Not Found"
    );

    let malformed = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": "abc" })),
        )
        .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.stock_of(product.id).await, 5);
}

#[tokio::test]
async fn listing_is_newest_first_and_filters_by_text() {
    let app = TestApp::new().await;
    let widget = app.seed_product("WIDGET-1", "1.00", 50).await;
    let gadget = app.seed_product("GADGET-2", "3.00", 50).await;

    for (product_id, qty) in [(widget.id, 1), (gadget.id, 2), (widget.id, 3)] {
        let response = app
            .request_as_manager(
                Method::POST,
                "/api/transactions/sell",
                Some(json!({ "productId": product_id, "quantity": qty })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let all = response_json(
        app.request_as_manager(Method::GET, "/api/transactions/all", None)
            .await,
    )
    .await;
    assert_eq!(all["totalElements"], 3);
    assert_eq!(all["totalPages"], 1);
    let quantities: Vec<i64> = all["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["totalProducts"].as_i64().unwrap())
        .collect();
    assert_eq!(quantities, vec![3, 2, 1]);

    let filtered = response_json(
        app.request_as_manager(
            Method::GET,
            "/api/transactions/all?searchText=widget-1",
            None,
        )
        .await,
    )
    .await;
    assert_eq!(filtered["totalElements"], 2);
    assert!(filtered["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .all(|tx| tx["productId"] == widget.id));

    let paged = response_json(
        app.request_as_manager(Method::GET, "/api/transactions?page=1&size=2", None)
            .await,
    )
    .await;
    assert_eq!(paged["totalPages"], 2);
    assert_eq!(paged["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_ledger_lists_cleanly_and_bad_page_size_is_rejected() {
    let app = TestApp::new().await;

    let empty = app
        .request_as_manager(Method::GET, "/api/transactions/all", None)
        .await;
    assert_eq!(empty.status(), StatusCode::OK);
    let body = response_json(empty).await;
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["transactions"], json!([]));

    let zero_size = app
        .request_as_manager(Method::GET, "/api/transactions/all?size=0", None)
        .await;
    assert_eq!(zero_size.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_embeds_product_user_and_supplier_without_cycles() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "4.00", 0).await;
    let supplier = app.seed_supplier("Acme Wholesale").await;

    let created = response_json(
        app.request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "quantity": 4, "supplierId": supplier.id })),
        )
        .await,
    )
    .await;
    let id = created["transaction"]["id"].as_i64().unwrap();

    let response = app
        .request_as_manager(Method::GET, &format!("/api/transactions/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let tx = response_json(response).await["transaction"].clone();

    assert_eq!(tx["product"]["sku"], "WIDGET-1");
    assert_eq!(tx["product"]["stockQuantity"], 4);
    assert_eq!(tx["supplier"]["name"], "Acme Wholesale");
    assert_eq!(tx["user"]["email"], common::MANAGER_EMAIL);
    assert!(tx["user"].get("transactions").is_none());
    assert!(tx["user"].get("password").is_none());

    let missing = app
        .request_as_manager(Method::GET, "/api/transactions/9999", None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(missing).await["message"], "Transaction Not Found");
}

#[tokio::test]
async fn status_update_touches_only_the_status() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "12.50", 10).await;

    let created = response_json(
        app.request_as_manager(
            Method::POST,
            "/api/transactions/sell",
            Some(json!({ "productId": product.id, "quantity": 3 })),
        )
        .await,
    )
    .await;
    let id = created["transaction"]["id"].as_i64().unwrap();

    let response = app
        .request_as_manager(
            Method::PUT,
            &format!("/api/transactions/{id}"),
            Some(json!("CANCELED")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Transaction Status Successfully Updated");
    assert_eq!(body["transaction"]["status"], "CANCELED");
    assert_eq!(body["transaction"]["totalProducts"], 3);
    assert_eq!(app.stock_of(product.id).await, 7);

    let wrapped = app
        .request_as_manager(
            Method::PUT,
            &format!("/api/transactions/update/{id}"),
            Some(json!({ "status": "PENDING" })),
        )
        .await;
    assert_eq!(wrapped.status(), StatusCode::OK);
    assert_eq!(response_json(wrapped).await["transaction"]["status"], "PENDING");

    let unknown = app
        .request_as_manager(
            Method::PUT,
            &format!("/api/transactions/{id}"),
            Some(json!("LOST")),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn by_month_year_returns_rows_of_that_month_only() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "1.00", 10).await;

    app.request_as_manager(
        Method::POST,
        "/api/transactions/sell",
        Some(json!({ "productId": product.id, "quantity": 1 })),
    )
    .await;

    let now = Utc::now();
    let current = response_json(
        app.request_as_manager(
            Method::GET,
            &format!(
                "/api/transactions/by-month-year?month={}&year={}",
                now.month(),
                now.year()
            ),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(current["transactions"].as_array().unwrap().len(), 1);

    let long_ago = response_json(
        app.request_as_manager(
            Method::GET,
            "/api/transactions/by-month-year?month=1&year=2001",
            None,
        )
        .await,
    )
    .await;
    assert_eq!(long_ago["transactions"], json!([]));

    let invalid = app
        .request_as_manager(
            Method::GET,
            "/api/transactions/by-month-year?month=13&year=2024",
            None,
        )
        .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn restock_cannot_overflow_the_stock_column() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Acme Wholesale").await;
    let nearly_full = i32::MAX - 10;
    let product = app.seed_product("BULK-1", "0.01", nearly_full).await;

    let overflow = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "supplierId": supplier.id, "quantity": 100 })),
        )
        .await;
    assert_eq!(overflow.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let message = response_json(overflow).await["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("BULK-1"), "unexpected message: {message}");

    let oversized = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "supplierId": supplier.id, "quantity": 2_000_000_000 })),
        )
        .await;
    assert_eq!(oversized.status(), StatusCode::BAD_REQUEST);

    let fits = app
        .request_as_manager(
            Method::POST,
            "/api/transactions/purchase",
            Some(json!({ "productId": product.id, "supplierId": supplier.id, "quantity": 10 })),
        )
        .await;
    assert_eq!(fits.status(), StatusCode::OK);

    assert_eq!(app.stock_of(product.id).await, i32::MAX);
    let listed = app
        .request_as_manager(Method::GET, "/api/transactions", None)
        .await;
    assert_eq!(response_json(listed).await["totalElements"], 1);
}

#[tokio::test]
async fn malformed_query_and_path_values_get_the_json_envelope() {
    let app = TestApp::new().await;

    for uri in [
        "/api/transactions/by-month-year?month=abc&year=2024",
        "/api/transactions/xyz",
        "/api/transactions?page=-1",
        "/api/users/transactions/not-a-number",
    ] {
        let response = app.request_as_manager(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = response_json(response).await;
        assert_eq!(body["status"], 400, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
        assert!(body["requestId"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn unknown_routes_get_an_enveloped_404() {
    let app = TestApp::new().await;

    for token in [None, Some(app.manager_token())] {
        let response = app
            .request(Method::GET, "/api/transactions-archive", None, token)
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["message"], "Route Not Found");
    }
}

#[tokio::test]
async fn search_text_wildcards_match_literally() {
    let app = TestApp::new().await;
    let product = app.seed_product("WIDGET-1", "1.00", 50).await;

    for description in ["50% off", "500 units", "crate_7", "crate-7"] {
        let response = app
            .request_as_manager(
                Method::POST,
                "/api/transactions/sell",
                Some(json!({ "productId": product.id, "quantity": 1, "description": description })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    for (search, expected) in [("50%25", "50% off"), ("crate_7", "crate_7")] {
        let body = response_json(
            app.request_as_manager(
                Method::GET,
                &format!("/api/transactions/all?searchText={search}"),
                None,
            )
            .await,
        )
        .await;
        assert_eq!(body["totalElements"], 1, "{search}");
        assert_eq!(body["transactions"][0]["description"], expected);
    }
}
