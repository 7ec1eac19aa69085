use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use chrono::Utc;
use serde_json::json;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::user_assets::{AssignmentStatus, UserAsset, UserAssetFilterParams};
use crate::db::store::USER_ASSETS;
use crate::domain::{approval, read_models};
use crate::middleware::auth::Session;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    get,
    path = "/user-assets/mine",
    params(
        UserAssetFilterParams
    ),
    responses(
        (status = 200, description = "Assets assigned to the caller", body = [UserAsset])
    ),
    tag = "Assignments",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_my_assets(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(filter): Query<UserAssetFilterParams>,
) -> Result<ApiResponse<Vec<UserAsset>>, ApiResponse<()>> {
    let records = state
        .store
        .get_data_by_field(USER_ASSETS, "user_id", &json!(session.email()))
        .await?;
    let list: Vec<UserAsset> = read_models::decoded(USER_ASSETS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Assigned assets retrieved successfully",
        read_models::user_assets_for(&list, session.email(), &filter),
    ))
}

/// Hand an asset back. Stock is not replenished.
#[utoipa::path(
    patch,
    path = "/user-assets/{assignment_id}/return",
    params(
        ("assignment_id" = String, Path, description = "Assignment key")
    ),
    responses(
        (status = 200, description = "Asset returned", body = UserAsset),
        (status = 400, description = "Asset was already returned"),
        (status = 403, description = "Assignment belongs to someone else"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn return_asset(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(assignment_id): Path<String>,
) -> Result<ApiResponse<UserAsset>, ApiResponse<()>> {
    let assignment =
        approval::return_asset(state.store.as_ref(), &session, &assignment_id, Utc::now()).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Asset returned successfully",
        assignment,
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(get_my_assets, return_asset),
    components(
        schemas(UserAsset, AssignmentStatus)
    ),
    tags(
        (name = "Assignments", description = "Assets held by employees")
    )
)]
pub struct UserAssetDoc;
