//! Catalog endpoints: categories, suppliers and products.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, response_json, TestApp};
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn category_lifecycle_for_admins() {
    let app = TestApp::new().await;

    let created = app
        .request_as_admin(
            Method::POST,
            "/api/categories/add",
            Some(json!({ "name": "Hardware" })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let body = response_json(created).await;
    assert_eq!(body["message"], "Category created successfully");
    let id = body["category"]["id"].as_i64().unwrap();

    let duplicate = app
        .request_as_admin(
            Method::POST,
            "/api/categories/add",
            Some(json!({ "name": "Hardware" })),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let renamed = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/categories/update/{id}"),
            Some(json!({ "name": "Tools" })),
        )
        .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = response_json(renamed).await;
    assert_eq!(body["message"], "Category Successfully Updated");
    assert_eq!(body["category"]["name"], "Tools");

    let listed = response_json(
        app.request_as_manager(Method::GET, "/api/categories/all", None)
            .await,
    )
    .await;
    assert_eq!(listed["categories"].as_array().unwrap().len(), 1);

    let deleted = app
        .request_as_admin(Method::DELETE, &format!("/api/categories/delete/{id}"), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        response_json(deleted).await["message"],
        "Category Successfully Deleted"
    );

    let gone = app
        .request_as_manager(Method::GET, &format!("/api/categories/{id}"), None)
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(gone).await["message"], "Category Not Found");
}

#[tokio::test]
async fn catalog_mutations_are_admin_only() {
    let app = TestApp::new().await;

    for (uri, body) in [
        ("/api/categories/add", json!({ "name": "Hardware" })),
        ("/api/suppliers/add", json!({ "name": "Acme" })),
        (
            "/api/products/add",
            json!({ "name": "Widget", "sku": "W-1", "price": "1.00" }),
        ),
    ] {
        let response = app
            .request_as_manager(Method::POST, uri, Some(body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");

        let response = app.request(Method::POST, uri, Some(body), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let reads = app
        .request(Method::GET, "/api/products/all", None, None)
        .await;
    assert_eq!(reads.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn supplier_lifecycle_for_admins() {
    let app = TestApp::new().await;

    let created = app
        .request_as_admin(
            Method::POST,
            "/api/suppliers/add",
            Some(json!({ "name": "Acme", "contactInfo": "sales@acme.test" })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let body = response_json(created).await;
    assert_eq!(body["message"], "Supplier created successfully");
    assert_eq!(body["supplier"]["contactInfo"], "sales@acme.test");
    let id = body["supplier"]["id"].as_i64().unwrap();

    let updated = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/suppliers/update/{id}"),
            Some(json!({ "name": "Acme Ltd", "address": "1 Dock Road" })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = response_json(updated).await;
    assert_eq!(body["supplier"]["name"], "Acme Ltd");
    assert_eq!(body["supplier"]["address"], "1 Dock Road");

    let fetched = response_json(
        app.request_as_manager(Method::GET, &format!("/api/suppliers/{id}"), None)
            .await,
    )
    .await;
    assert_eq!(fetched["supplier"]["name"], "Acme Ltd");

    let blank = app
        .request_as_admin(Method::POST, "/api/suppliers/add", Some(json!({ "name": "  " })))
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_creation_validates_and_update_never_touches_stock() {
    let app = TestApp::new().await;

    let category = response_json(
        app.request_as_admin(
            Method::POST,
            "/api/categories/add",
            Some(json!({ "name": "Hardware" })),
        )
        .await,
    )
    .await["category"]["id"]
        .as_i64()
        .unwrap();

    let created = app
        .request_as_admin(
            Method::POST,
            "/api/products/add",
            Some(json!({
                "name": "Widget",
                "sku": "W-1",
                "price": "12.50",
                "stockQuantity": 10,
                "categoryId": category
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::OK);
    let body = response_json(created).await;
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["product"]["stockQuantity"], 10);
    assert_eq!(body["product"]["categoryId"], category);
    let id = body["product"]["id"].as_i64().unwrap();

    let duplicate_sku = app
        .request_as_admin(
            Method::POST,
            "/api/products/add",
            Some(json!({ "name": "Other", "sku": "W-1", "price": "1.00" })),
        )
        .await;
    assert_eq!(duplicate_sku.status(), StatusCode::CONFLICT);

    let negative_price = app
        .request_as_admin(
            Method::POST,
            "/api/products/add",
            Some(json!({ "name": "Other", "sku": "W-2", "price": "-1.00" })),
        )
        .await;
    assert_eq!(negative_price.status(), StatusCode::BAD_REQUEST);

    let unknown_category = app
        .request_as_admin(
            Method::POST,
            "/api/products/add",
            Some(json!({ "name": "Other", "sku": "W-3", "price": "1.00", "categoryId": 999 })),
        )
        .await;
    assert_eq!(unknown_category.status(), StatusCode::NOT_FOUND);

    let updated = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/products/update/{id}"),
            Some(json!({ "price": "15.00", "stockQuantity": 999 })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = response_json(updated).await;
    assert_eq!(body["message"], "Product Successfully Updated");
    assert_eq!(decimal(&body["product"]["price"]), Decimal::new(15, 0));
    assert_eq!(body["product"]["stockQuantity"], 10);
    assert_eq!(body["product"]["name"], "Widget");
}

#[tokio::test]
async fn product_referenced_by_the_ledger_cannot_be_deleted() {
    let app = TestApp::new().await;
    let sold = app.seed_product("SOLD-1", "1.00", 5).await;
    let idle = app.seed_product("IDLE-1", "1.00", 5).await;

    app.request_as_manager(
        Method::POST,
        "/api/transactions/sell",
        Some(json!({ "productId": sold.id, "quantity": 1 })),
    )
    .await;

    let blocked = app
        .request_as_admin(
            Method::DELETE,
            &format!("/api/products/delete/{}", sold.id),
            None,
        )
        .await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);
    assert_eq!(app.stock_of(sold.id).await, 4);

    let deleted = app
        .request_as_admin(
            Method::DELETE,
            &format!("/api/products/delete/{}", idle.id),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        response_json(deleted).await["message"],
        "Product Successfully Deleted"
    );

    let listed = response_json(
        app.request_as_manager(Method::GET, "/api/products/all", None)
            .await,
    )
    .await;
    assert_eq!(listed["products"].as_array().unwrap().len(), 1);
}
