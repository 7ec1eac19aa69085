use axum::{
    routing::get,
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::asset::*;

pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/assets", get(get_company_assets).post(create_asset))
        .route("/assets/limited", get(get_limited_stock))
        .route(
            "/assets/{asset_id}",
            get(get_asset).patch(update_asset).delete(delete_asset),
        )
}
