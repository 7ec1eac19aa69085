use serde_json::{json, Value};

use crate::db::models::User;
use crate::db::store::{fields_of, DocumentStore, Record, USERS};
use crate::middleware::auth::Session;

pub(crate) async fn seed(store: &dyn DocumentStore, collection: &str, value: Value) -> Record {
    store.create_data(collection, fields_of(value)).await.unwrap()
}

pub(crate) async fn seed_user(store: &dyn DocumentStore, value: Value) -> User {
    seed(store, USERS, value).await.decode(USERS).unwrap()
}

pub(crate) async fn hr_session(store: &dyn DocumentStore, company: &str, package: &str) -> Session {
    let user = seed_user(
        store,
        json!({
            "name": "Hana",
            "email": format!("hr@{}.io", company),
            "role": "hr",
            "company_name": company,
            "company_logo": "https://img.example/logo.png",
            "packages": package,
            "payment_status": true,
        }),
    )
    .await;
    Session::new(user)
}

pub(crate) async fn employee(store: &dyn DocumentStore, email: &str, company: Option<&str>) -> User {
    let mut value = json!({ "name": email.split('@').next().unwrap_or(email), "email": email, "role": "employee" });
    if let Some(company) = company {
        value["company_name"] = json!(company);
    }
    seed_user(store, value).await
}
