pub mod api;
pub mod app_state;
pub mod config;
pub mod db;
pub mod domain;
pub mod logging;
pub mod middleware;
pub mod utils;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::auth::AuthDoc;
use crate::app_state::AppState;
use crate::db::queries::asset::AssetDoc;
use crate::db::queries::payment::PaymentDoc;
use crate::db::queries::reports::ReportDoc;
use crate::db::queries::requests::RequestDoc;
use crate::db::queries::user::UserDoc;
use crate::db::queries::user_assets::UserAssetDoc;
use crate::middleware::auth::{jwt_middleware, session_middleware};

/// Merged OpenAPI document of every route group.
pub fn openapi() -> utoipa::openapi::OpenApi {
    AuthDoc::openapi()
        .merge_from(UserDoc::openapi())
        .merge_from(AssetDoc::openapi())
        .merge_from(RequestDoc::openapi())
        .merge_from(UserAssetDoc::openapi())
        .merge_from(PaymentDoc::openapi())
        .merge_from(ReportDoc::openapi())
}

/// Full application router: health and docs are public, signup needs a
/// token, everything else needs a token and an existing profile.
pub fn build_router(state: AppState) -> Router {
    let merged_doc = openapi();

    // Token only
    let signup_routes = api::user::signup_routes()
        .route_layer(from_fn_with_state(state.clone(), jwt_middleware));

    // Token + profile. Layers run bottom-up: JWT first, then the session lookup.
    let private_routes = Router::new()
        .merge(api::user::user_routes())
        .merge(api::asset::asset_routes())
        .merge(api::requests::request_routes())
        .merge(api::user_assets::user_asset_routes())
        .merge(api::payment::payment_routes())
        .merge(api::reports::report_routes())
        .route_layer(from_fn_with_state(state.clone(), session_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_middleware));

    Router::new()
        .merge(api::health::health_routes())
        .merge(signup_routes)
        .merge(private_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
