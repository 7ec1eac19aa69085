use axum::{
    routing::get,
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::requests::*;

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(get_company_requests).post(create_asset_request))
        .route("/requests/pending", get(get_pending_requests))
        .route("/requests/mine", get(get_my_requests))
        .route("/requests/{request_id}", get(get_request).patch(decide_request))
}
