//! Common test utilities for API integration tests
#![allow(dead_code)]

use std::sync::Arc;

use asset_manager_backend::api::auth::{issue_token, Claims};
use asset_manager_backend::app_state::AppState;
use asset_manager_backend::build_router;
use asset_manager_backend::config::Config;
use asset_manager_backend::db::store::{DocumentStore, InMemoryStore};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

pub const SECRET: &str = "integration-test-secret";

/// Test server over a fresh in-memory store. The store is returned so
/// tests can inspect records directly.
pub fn create_test_server() -> (TestServer, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), Config::in_memory(SECRET));
    let server = TestServer::new(build_router(state)).expect("Failed to create test server");
    (server, store)
}

/// Token the identity provider would issue for `email`.
pub fn token_for(email: &str) -> String {
    let name = email.split('@').next().unwrap_or(email).to_string();
    issue_token(&Claims::new(email, Some(name), 3600), SECRET).expect("Failed to sign token")
}

/// `data` of the response envelope.
pub fn data(response: &TestResponse) -> Value {
    response.json::<Value>()["data"].clone()
}

pub struct Account {
    pub token: String,
    pub id: String,
    pub email: String,
}

pub async fn signup_hr(server: &TestServer, email: &str, company: &str, package: &str) -> Account {
    let token = token_for(email);
    let response = server
        .post("/users")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "Hana",
            "role": "hr",
            "company_name": company,
            "company_logo": "https://img.example/logo.png",
            "packages": package,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    Account {
        id: data(&response)["id"].as_str().unwrap().to_string(),
        email: email.to_string(),
        token,
    }
}

pub async fn signup_employee(server: &TestServer, email: &str) -> Account {
    let token = token_for(email);
    let response = server
        .post("/users")
        .authorization_bearer(&token)
        .json(&json!({ "name": email.split('@').next().unwrap() }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    Account {
        id: data(&response)["id"].as_str().unwrap().to_string(),
        email: email.to_string(),
        token,
    }
}

/// Sign up an employee and have `hr` add them to the company.
pub async fn hire(server: &TestServer, hr: &Account, email: &str) -> Account {
    let employee = signup_employee(server, email).await;
    let response = server
        .post("/users/company/employees")
        .authorization_bearer(&hr.token)
        .json(&json!({ "user_ids": [employee.id] }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    employee
}

/// Create an asset as `hr` and return its key.
pub async fn create_asset(server: &TestServer, hr: &Account, name: &str, quantity: i64) -> String {
    let response = server
        .post("/assets")
        .authorization_bearer(&hr.token)
        .json(&json!({
            "product_name": name,
            "product_type": "Laptop",
            "product_quantity": quantity,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    data(&response)["id"].as_str().unwrap().to_string()
}

/// File a request as `employee` and return its key.
pub async fn request_asset(server: &TestServer, employee: &Account, asset_id: &str) -> String {
    let response = server
        .post("/requests")
        .authorization_bearer(&employee.token)
        .json(&json!({ "asset_id": asset_id, "note": "needed for work" }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    data(&response)["id"].as_str().unwrap().to_string()
}

pub async fn asset_quantity(server: &TestServer, hr: &Account, asset_id: &str) -> i64 {
    let response = server
        .get(&format!("/assets/{}", asset_id))
        .authorization_bearer(&hr.token)
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    data(&response)["product_quantity"].as_i64().unwrap()
}
