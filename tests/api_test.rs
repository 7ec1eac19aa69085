mod common;

use std::sync::Arc;
use std::time::Duration;

use asset_manager_backend::app_state::AppState;
use asset_manager_backend::build_router;
use asset_manager_backend::config::Config;
use asset_manager_backend::db::store::{
    Batch, DocumentStore, Fields, InMemoryStore, Record, StoreResult,
};
use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum_test::TestServer;
use common::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn health_checks_are_public() {
    let (server, _) = create_test_server();

    let response = server.get("/health/live").await;
    assert_eq!(response.status_code(), 200);

    let response = server.get("/health/ready").await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (server, _) = create_test_server();

    let response = server.get("/users/me").await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    let response = server
        .get("/users/me")
        .authorization_bearer("not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .get("/users/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Token abc"))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn profile_is_required_until_signup() {
    let (server, _) = create_test_server();
    let token = token_for("alice@mail.io");

    let response = server.get("/users/me").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), 403);

    let response = server
        .post("/users")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Alice", "dob": "1990-04-01" }))
        .await;
    assert_eq!(response.status_code(), 201);
    let user = data(&response);
    assert_eq!(user["email"], "alice@mail.io");
    assert_eq!(user["role"], "employee");
    assert!(user["company_name"].is_null());

    let response = server.get("/users/me").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(data(&response)["name"], "Alice");

    let response = server
        .post("/users")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Alice again" }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn hr_signup_needs_company_details() {
    let (server, _) = create_test_server();
    let token = token_for("hr@acme.io");

    let response = server
        .post("/users")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Hana", "role": "hr", "packages": "basic" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let hr = signup_hr(&server, "hr2@acme.io", "  Acme Corp ", "premium").await;
    let response = server.get("/users/me").authorization_bearer(&hr.token).await;
    let me = data(&response);
    assert_eq!(me["company_name"], "acmecorp");
    assert_eq!(me["packages"], "premium");
}

#[tokio::test]
async fn profile_updates_are_visible_immediately() {
    let (server, _) = create_test_server();
    let alice = signup_employee(&server, "alice@mail.io").await;

    let response = server
        .patch("/users/me")
        .authorization_bearer(&alice.token)
        .json(&json!({ "name": "Alice Liddell" }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());

    let response = server.get("/users/me").authorization_bearer(&alice.token).await;
    assert_eq!(data(&response)["name"], "Alice Liddell");

    let response = server
        .patch("/users/me")
        .authorization_bearer(&alice.token)
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn asset_listing_filters_and_isolates_companies() {
    let (server, _) = create_test_server();
    let acme = signup_hr(&server, "hr@acme.io", "Acme", "basic").await;
    let globex = signup_hr(&server, "hr@globex.io", "Globex", "basic").await;
    create_asset(&server, &acme, "ThinkPad", 3).await;
    let macbook = create_asset(&server, &acme, "MacBook", 1).await;
    server
        .patch(&format!("/assets/{}", macbook))
        .authorization_bearer(&acme.token)
        .json(&json!({ "product_quantity": 0 }))
        .await;
    let foreign = create_asset(&server, &globex, "Dell", 9).await;

    let response = server.get("/assets").authorization_bearer(&acme.token).await;
    assert_eq!(data(&response).as_array().unwrap().len(), 2);

    let response = server
        .get("/assets")
        .add_query_param("availability", "Available")
        .authorization_bearer(&acme.token)
        .await;
    let available = data(&response);
    let available = available.as_array().unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0]["product_name"], "ThinkPad");

    let response = server
        .get("/assets")
        .add_query_param("search", "mac")
        .authorization_bearer(&acme.token)
        .await;
    assert_eq!(data(&response).as_array().unwrap().len(), 1);

    let response = server
        .get(&format!("/assets/{}", foreign))
        .authorization_bearer(&acme.token)
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .get("/assets/limited")
        .authorization_bearer(&acme.token)
        .await;
    assert_eq!(data(&response).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn asset_validation_and_deletion() {
    let (server, _) = create_test_server();
    let hr = signup_hr(&server, "hr@acme.io", "Acme", "basic").await;
    let employee = hire(&server, &hr, "alice@acme.io").await;

    let response = server
        .post("/assets")
        .authorization_bearer(&hr.token)
        .json(&json!({ "product_name": "Chair", "product_type": "Office Chair", "product_quantity": -1 }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/assets")
        .authorization_bearer(&employee.token)
        .json(&json!({ "product_name": "Chair", "product_type": "Office Chair", "product_quantity": 1 }))
        .await;
    assert_eq!(response.status_code(), 403);

    let asset_id = create_asset(&server, &hr, "Projector", 2).await;
    let response = server
        .delete(&format!("/assets/{}", asset_id))
        .authorization_bearer(&hr.token)
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .get(&format!("/assets/{}", asset_id))
        .authorization_bearer(&hr.token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn reports_reflect_company_activity() {
    let (server, _) = create_test_server();
    let hr = signup_hr(&server, "hr@acme.io", "Acme", "basic").await;
    let alice = hire(&server, &hr, "alice@acme.io").await;
    let bob = hire(&server, &hr, "bob@acme.io").await;
    let laptop = create_asset(&server, &hr, "Laptop Pro", 10).await;
    let mouse = create_asset(&server, &hr, "Mouse", 2).await;

    let first = request_asset(&server, &alice, &laptop).await;
    request_asset(&server, &bob, &laptop).await;
    request_asset(&server, &bob, &mouse).await;
    server
        .patch(&format!("/requests/{}", first))
        .authorization_bearer(&hr.token)
        .json(&json!({ "status": "Approved" }))
        .await;

    let response = server
        .get("/reports/dashboard")
        .authorization_bearer(&hr.token)
        .await;
    assert_eq!(response.status_code(), 200);
    let stats = data(&response);
    assert_eq!(stats["total_employees"], 2);
    assert_eq!(stats["total_assets"], 2);
    assert_eq!(stats["pending_requests"], 2);
    assert_eq!(stats["approved_this_month"], 1);

    let response = server
        .get("/reports/requests")
        .authorization_bearer(&hr.token)
        .await;
    let report = data(&response);
    assert_eq!(report["total_requests"], 3);
    assert_eq!(report["approved_requests"], 1);

    let response = server
        .get("/reports/top-requested")
        .authorization_bearer(&hr.token)
        .await;
    let top = data(&response);
    assert_eq!(top[0]["asset_name"], "Laptop Pro");
    assert_eq!(top[0]["count"], 2);

    let response = server
        .get("/reports/dashboard")
        .authorization_bearer(&alice.token)
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (server, _) = create_test_server();
    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let doc: Value = response.json();
    assert!(doc["paths"]["/requests/{request_id}"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearerAuth"].is_object());
}

#[tokio::test]
async fn registered_company_cannot_be_taken_over() {
    let (server, _) = create_test_server();
    let owner = signup_hr(&server, "hr@acme.io", "Acme", "basic").await;
    hire(&server, &owner, "alice@acme.io").await;
    let asset_id = create_asset(&server, &owner, "ThinkPad", 2).await;

    let intruder = token_for("evil@mail.io");
    let response = server
        .post("/users")
        .authorization_bearer(&intruder)
        .json(&json!({
            "name": "Eve",
            "role": "hr",
            "company_name": "ACME",
            "company_logo": "https://img.example/evil.png",
            "packages": "premium",
        }))
        .await;
    assert_eq!(response.status_code(), 409, "{}", response.text());

    // No profile was created, so the company stays out of reach.
    let response = server.get("/users/company").authorization_bearer(&intruder).await;
    assert_eq!(response.status_code(), 403);
    let response = server
        .delete(&format!("/assets/{}", asset_id))
        .authorization_bearer(&intruder)
        .await;
    assert_eq!(response.status_code(), 403);

    assert_eq!(asset_quantity(&server, &owner, &asset_id).await, 2);
}

/// Store whose readiness check hangs.
struct StalledStore(InMemoryStore);

#[async_trait]
impl DocumentStore for StalledStore {
    async fn create_data(&self, collection: &str, fields: Fields) -> StoreResult<Record> {
        self.0.create_data(collection, fields).await
    }

    async fn set_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Record> {
        self.0.set_data(collection, id, fields).await
    }

    async fn get_all_data(&self, collection: &str) -> StoreResult<Vec<Record>> {
        self.0.get_all_data(collection).await
    }

    async fn get_data_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        self.0.get_data_by_id(collection, id).await
    }

    async fn update_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        self.0.update_data(collection, id, fields).await
    }

    async fn delete_data(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.0.delete_data(collection, id).await
    }

    async fn commit(&self, batch: Batch) -> StoreResult<()> {
        self.0.commit(batch).await
    }

    async fn ping(&self) -> StoreResult<()> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.0.ping().await
    }
}

#[tokio::test]
async fn slow_requests_time_out_with_408() {
    let store: Arc<dyn DocumentStore> = Arc::new(StalledStore(InMemoryStore::new()));
    let mut config = Config::in_memory(SECRET);
    config.request_timeout = Duration::from_millis(50);
    let server = TestServer::new(build_router(AppState::new(store, config))).unwrap();

    let response = server.get("/health/ready").await;
    assert_eq!(response.status_code(), 408);

    let response = server.get("/health/live").await;
    assert_eq!(response.status_code(), 200);
}
