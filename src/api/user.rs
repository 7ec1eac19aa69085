use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::user::*;

/// Routes that need a verified token but no profile yet.
pub fn signup_routes() -> Router<AppState> {
    Router::new().route("/users", post(signup))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/unaffiliated", get(get_unaffiliated_users))
        .route("/users/company", get(get_company_users))
        .route("/users/company/employees", post(add_employees))
        .route("/users/company/employees/{user_id}", delete(remove_employee))
}
