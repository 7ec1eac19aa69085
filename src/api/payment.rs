use axum::{routing::post, Router};

use crate::app_state::AppState;
use crate::db::queries::payment::*;

pub fn payment_routes() -> Router<AppState> {
    Router::new().route("/payments", post(create_payment))
}
