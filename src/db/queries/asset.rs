use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::asset::{
    Asset, AssetFilterParams, AssetType, Availability, NewAsset, SortOrder, UpdateAsset,
};
use crate::db::store::ASSETS;
use crate::domain::{assets, read_models};
use crate::middleware::auth::Session;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    post,
    path = "/assets",
    request_body = NewAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid asset fields"),
        (status = 403, description = "Caller is not an HR manager")
    ),
    tag = "Assets",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<NewAsset>,
) -> Result<ApiResponse<Asset>, ApiResponse<()>> {
    let asset = assets::add_asset(state.store.as_ref(), &session, payload, Utc::now()).await?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Asset created successfully",
        asset,
    ))
}

#[utoipa::path(
    get,
    path = "/assets",
    params(
        AssetFilterParams
    ),
    responses(
        (status = 200, description = "Assets of the caller's company", body = [Asset]),
        (status = 403, description = "Caller is not affiliated")
    ),
    tag = "Assets",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_company_assets(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(filter): Query<AssetFilterParams>,
) -> Result<ApiResponse<Vec<Asset>>, ApiResponse<()>> {
    let company = session.company()?;
    let records = state.store.get_data_by_company(ASSETS, company).await?;
    let list: Vec<Asset> = read_models::decoded(ASSETS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Assets retrieved successfully",
        read_models::assets_for_company(&list, company, &filter),
    ))
}

/// Assets with fewer than five units left, most recently touched first.
#[utoipa::path(
    get,
    path = "/assets/limited",
    responses(
        (status = 200, description = "Assets running low", body = [Asset])
    ),
    tag = "Assets",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_limited_stock(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<Vec<Asset>>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let records = state.store.get_data_by_company(ASSETS, company).await?;
    let list: Vec<Asset> = read_models::decoded(ASSETS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Limited stock retrieved successfully",
        read_models::low_stock_assets(&list, company),
    ))
}

#[utoipa::path(
    get,
    path = "/assets/{asset_id}",
    params(
        ("asset_id" = String, Path, description = "Asset key")
    ),
    responses(
        (status = 200, description = "Asset found", body = Asset),
        (status = 404, description = "Asset not found")
    ),
    tag = "Assets",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(asset_id): Path<String>,
) -> Result<ApiResponse<Asset>, ApiResponse<()>> {
    let company = session.company()?;
    let asset = assets::load_company_asset(state.store.as_ref(), company, &asset_id).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Asset retrieved successfully",
        asset,
    ))
}

#[utoipa::path(
    patch,
    path = "/assets/{asset_id}",
    params(
        ("asset_id" = String, Path, description = "Asset key")
    ),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 400, description = "No fields to update or invalid values"),
        (status = 404, description = "Asset not found")
    ),
    tag = "Assets",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(asset_id): Path<String>,
    Json(payload): Json<UpdateAsset>,
) -> Result<ApiResponse<Asset>, ApiResponse<()>> {
    let asset =
        assets::update_asset(state.store.as_ref(), &session, &asset_id, payload, Utc::now()).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Asset updated successfully",
        asset,
    ))
}

#[utoipa::path(
    delete,
    path = "/assets/{asset_id}",
    params(
        ("asset_id" = String, Path, description = "Asset key")
    ),
    responses(
        (status = 200, description = "Asset deleted", body = Asset),
        (status = 404, description = "Asset not found")
    ),
    tag = "Assets",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(asset_id): Path<String>,
) -> Result<ApiResponse<Asset>, ApiResponse<()>> {
    let asset = assets::delete_asset(state.store.as_ref(), &session, &asset_id).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Asset deleted successfully",
        asset,
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_asset,
        get_company_assets,
        get_limited_stock,
        get_asset,
        update_asset,
        delete_asset,
    ),
    components(
        schemas(Asset, NewAsset, UpdateAsset, AssetType, Availability, SortOrder)
    ),
    tags(
        (name = "Assets", description = "Company inventory")
    )
)]
pub struct AssetDoc;
