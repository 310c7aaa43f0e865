//! Product listing, search and admin product creation.

use axum::http::{Method, StatusCode};
use serde_json::json;

use emporium_integration_tests::TestContext;

#[tokio::test]
async fn test_add_product_requires_admin() {
    let ctx = TestContext::new();
    let customer = ctx.customer().await;
    let body = json!({ "product_name": "Kettle", "price": 1500 });

    let anonymous = ctx
        .post("/api/v1/admin/addproduct", None, Some(body.clone()))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = ctx
        .post("/api/v1/admin/addproduct", Some(&customer.token), Some(body))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_product_rejects_bad_input() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;

    let blank = ctx
        .post(
            "/api/v1/admin/addproduct",
            Some(&admin.token),
            Some(json!({ "product_name": "  ", "price": 100 })),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let negative = ctx
        .post(
            "/api/v1/admin/addproduct",
            Some(&admin.token),
            Some(json!({ "product_name": "Kettle", "price": -5 })),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_products_paginate() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    for i in 1..=25 {
        ctx.product(&admin, &format!("Item {i:02}"), 100 * i).await;
    }

    let page = ctx
        .get("/api/v1/products?page=2&page_size=10", Some(&admin.token))
        .await;
    assert_eq!(page.status, StatusCode::OK);

    let names: Vec<&str> = page.body["data"]
        .as_array()
        .expect("data is an array")
        .iter()
        .filter_map(|p| p["product_name"].as_str())
        .collect();
    assert_eq!(names.len(), 10);
    assert_eq!(names.first(), Some(&"Item 11"));
    assert_eq!(names.last(), Some(&"Item 20"));
    assert_eq!(
        page.body["pagination"],
        json!({ "page": 2, "page_size": 10, "total": 25, "total_pages": 3 })
    );

    let garbage = ctx
        .get("/api/v1/products?page=abc&page_size=-3", Some(&admin.token))
        .await;
    assert_eq!(garbage.body["pagination"]["page"], 1);
    assert_eq!(garbage.body["pagination"]["page_size"], 10);
}

#[tokio::test]
async fn test_products_far_page_is_empty() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    ctx.product(&admin, "Kettle", 300).await;

    let far = ctx
        .get(
            "/api/v1/products?page=100000000000000000&page_size=100",
            Some(&admin.token),
        )
        .await;
    assert_eq!(far.status, StatusCode::OK);
    assert_eq!(far.body["data"], json!([]));
    assert_eq!(far.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_products_requires_token() {
    let ctx = TestContext::new();
    let response = ctx.get("/api/v1/products", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_product_view_by_name() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    ctx.product(&admin, "Blue Phone", 500).await;
    ctx.product(&admin, "Kettle", 300).await;

    let found = ctx.get("/api/v1/users/productview?search=phone", None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body["data"][0]["product_name"], "Blue Phone");
    assert_eq!(found.body["data"].as_array().map(Vec::len), Some(1));

    let none = ctx.get("/api/v1/users/productview?search=laptop", None).await;
    assert_eq!(none.status, StatusCode::OK);
    assert_eq!(none.body["data"], json!([]));

    let missing = ctx.get("/api/v1/users/productview", None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_by_name_and_price() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    ctx.product(&admin, "Cheap Phone", 50).await;
    ctx.product(&admin, "Mid Phone", 150).await;
    ctx.product(&admin, "Pricey Phone", 900).await;
    ctx.product(&admin, "Mid Kettle", 150).await;

    let response = ctx
        .get("/api/v1/users/search?search=phone&min_price=100&max_price=500", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["pagination"]["total"], 1);
    assert_eq!(response.body["data"][0]["product_name"], "Mid Phone");

    let price_only = ctx
        .get("/api/v1/users/search?min_price=150&max_price=150", None)
        .await;
    assert_eq!(price_only.body["pagination"]["total"], 2);
}

#[tokio::test]
async fn test_search_rejects_bad_queries() {
    let ctx = TestContext::new();

    for uri in [
        "/api/v1/users/search",
        "/api/v1/users/search?min_price=abc",
        "/api/v1/users/search?min_price=-1",
        "/api/v1/users/search?min_price=100&max_price=50",
    ] {
        let response = ctx.send(Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.body["success"], false);
    }
}

#[tokio::test]
async fn test_sold_products_disappear_from_listing() {
    let ctx = TestContext::new();
    let admin = ctx.admin().await;
    let buyer = ctx.customer().await;
    let sold = ctx.product(&admin, "Only One Lamp", 700).await;
    ctx.product(&admin, "Other Lamp", 800).await;

    let bought = ctx
        .post(
            &format!("/api/v1/cart/instantbuy?id={sold}"),
            Some(&buyer.token),
            None,
        )
        .await;
    assert_eq!(bought.status, StatusCode::OK);

    let listing = ctx.get("/api/v1/products", Some(&buyer.token)).await;
    assert_eq!(listing.body["pagination"]["total"], 1);
    assert_eq!(listing.body["data"][0]["product_name"], "Other Lamp");

    let search = ctx.get("/api/v1/users/productview?search=lamp", None).await;
    assert_eq!(search.body["data"].as_array().map(Vec::len), Some(1));
}
