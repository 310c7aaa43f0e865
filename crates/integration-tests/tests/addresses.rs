//! Address book over HTTP.

#![allow(clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use emporium_integration_tests::{TestContext, TestResponse};

fn address(house: &str) -> Value {
    json!({
        "house_name": house,
        "street_name": "MG Road",
        "city_name": "Bengaluru",
        "pin_code": "560001",
    })
}

async fn put(ctx: &TestContext, uri: &str, token: &str, body: Value) -> TestResponse {
    ctx.send(Method::PUT, uri, Some(token), Some(body)).await
}

#[tokio::test]
async fn test_add_and_list() {
    let ctx = TestContext::new();
    let user = ctx.customer().await;

    let added = ctx
        .post("/api/v1/address", Some(&user.token), Some(address("Rose Villa")))
        .await;
    assert_eq!(added.status, StatusCode::CREATED);
    let address_id = added.body["data"]["address_id"].clone();

    let list = ctx.get("/api/v1/address", Some(&user.token)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"][0]["address_id"], address_id);
    assert_eq!(list.body["data"][0]["house_name"], "Rose Villa");
}

#[tokio::test]
async fn test_add_rejects_blank_field() {
    let ctx = TestContext::new();
    let user = ctx.customer().await;

    let mut body = address("Rose Villa");
    body["city_name"] = json!("");
    let response = ctx.post("/api/v1/address", Some(&user.token), Some(body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "city_name is required");
}

#[tokio::test]
async fn test_edit_home_needs_an_address() {
    let ctx = TestContext::new();
    let user = ctx.customer().await;

    let response = put(&ctx, "/api/v1/address/home", &user.token, address("Home")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "no addresses found");
}

#[tokio::test]
async fn test_edit_home_and_work() {
    let ctx = TestContext::new();
    let user = ctx.customer().await;
    let added = ctx
        .post("/api/v1/address", Some(&user.token), Some(address("Old Home")))
        .await;
    let home_id = added.body["data"]["address_id"].clone();

    let home = put(&ctx, "/api/v1/address/home", &user.token, address("New Home")).await;
    assert_eq!(home.status, StatusCode::OK);
    assert_eq!(home.body["data"]["address_id"], home_id);

    // Only one address so far: editing work appends it
    let work = put(&ctx, "/api/v1/address/work", &user.token, address("Office")).await;
    assert_eq!(work.status, StatusCode::OK);

    let list = ctx.get("/api/v1/address", Some(&user.token)).await;
    let entries = list.body["data"].as_array().expect("data is an array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["house_name"], "New Home");
    assert_eq!(entries[1]["house_name"], "Office");
}

#[tokio::test]
async fn test_delete_address() {
    let ctx = TestContext::new();
    let user = ctx.customer().await;
    let first = ctx
        .post("/api/v1/address", Some(&user.token), Some(address("A")))
        .await;
    ctx.post("/api/v1/address", Some(&user.token), Some(address("B")))
        .await;
    let id = first.body["data"]["address_id"]
        .as_str()
        .expect("address_id")
        .to_owned();

    let uri = format!("/api/v1/address?id={id}");
    let deleted = ctx.send(Method::DELETE, &uri, Some(&user.token), None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let again = ctx.send(Method::DELETE, &uri, Some(&user.token), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let missing_id = ctx
        .send(Method::DELETE, "/api/v1/address", Some(&user.token), None)
        .await;
    assert_eq!(missing_id.status, StatusCode::BAD_REQUEST);

    let list = ctx.get("/api/v1/address", Some(&user.token)).await;
    assert_eq!(list.body["data"][0]["house_name"], "B");
    assert_eq!(list.body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_add_rejects_existing_address_id() {
    let ctx = TestContext::new();
    let user = ctx.customer().await;
    let first = ctx
        .post("/api/v1/address", Some(&user.token), Some(address("A")))
        .await;

    let mut copy = address("A again");
    copy["address_id"] = first.body["data"]["address_id"].clone();
    let response = ctx.post("/api/v1/address", Some(&user.token), Some(copy)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "address id already exists");

    let list = ctx.get("/api/v1/address", Some(&user.token)).await;
    assert_eq!(list.body["data"].as_array().map(Vec::len), Some(1));
}
