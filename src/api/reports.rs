use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::db::queries::reports::*;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/dashboard", get(get_dashboard_stats))
        .route("/reports/assets", get(get_asset_report))
        .route("/reports/requests", get(get_request_report))
        .route("/reports/top-requested", get(get_top_requested))
}
