use axum::{
    routing::{get, patch},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::user_assets::*;

pub fn user_asset_routes() -> Router<AppState> {
    Router::new()
        .route("/user-assets/mine", get(get_my_assets))
        .route("/user-assets/{assignment_id}/return", patch(return_asset))
}
