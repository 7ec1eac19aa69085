use axum::{extract::State, http::StatusCode, Extension};
use chrono::Utc;
use serde_json::json;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::asset::Asset;
use crate::db::models::reports::{AssetReport, DashboardStats, RequestReport, TopRequestedItem};
use crate::db::models::requests::AssetRequest;
use crate::db::models::user::User;
use crate::db::store::{DocumentStore, ASSETS, REQUESTS, USERS};
use crate::domain::read_models::{self, TOP_REQUESTED_LIMIT};
use crate::domain::DomainResult;
use crate::middleware::auth::Session;
use crate::utils::api_response::ApiResponse;

async fn company_requests(store: &dyn DocumentStore, company: &str) -> DomainResult<Vec<AssetRequest>> {
    let records = store
        .get_data_by_field(REQUESTS, "requester_company", &json!(company))
        .await?;
    Ok(read_models::decoded(REQUESTS, records))
}

async fn company_assets(store: &dyn DocumentStore, company: &str) -> DomainResult<Vec<Asset>> {
    let records = store.get_data_by_company(ASSETS, company).await?;
    Ok(read_models::decoded(ASSETS, records))
}

#[utoipa::path(
    get,
    path = "/reports/dashboard",
    responses(
        (status = 200, description = "Headline numbers of the company", body = DashboardStats),
        (status = 403, description = "Caller is not an HR manager")
    ),
    tag = "Reports",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<DashboardStats>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let store = state.store.as_ref();

    let records = store.get_data_by_company(USERS, company).await?;
    let users: Vec<User> = read_models::decoded(USERS, records);
    let assets = company_assets(store, company).await?;
    let requests = company_requests(store, company).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Dashboard stats retrieved successfully",
        read_models::dashboard_stats(&users, &assets, &requests, company, Utc::now()),
    ))
}

#[utoipa::path(
    get,
    path = "/reports/assets",
    responses(
        (status = 200, description = "Inventory report", body = AssetReport)
    ),
    tag = "Reports",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_asset_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<AssetReport>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let assets = company_assets(state.store.as_ref(), company).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Asset report generated",
        read_models::asset_report(&assets, company),
    ))
}

#[utoipa::path(
    get,
    path = "/reports/requests",
    responses(
        (status = 200, description = "Request report", body = RequestReport)
    ),
    tag = "Reports",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_request_report(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<RequestReport>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let requests = company_requests(state.store.as_ref(), company).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Request report generated",
        read_models::request_report(&requests, company),
    ))
}

#[utoipa::path(
    get,
    path = "/reports/top-requested",
    responses(
        (status = 200, description = "Most requested asset names", body = [TopRequestedItem])
    ),
    tag = "Reports",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_top_requested(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<Vec<TopRequestedItem>>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let requests = company_requests(state.store.as_ref(), company).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Top requested items retrieved successfully",
        read_models::top_requested_items(&requests, company, TOP_REQUESTED_LIMIT),
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_dashboard_stats,
        get_asset_report,
        get_request_report,
        get_top_requested,
    ),
    components(
        schemas(DashboardStats, AssetReport, RequestReport, TopRequestedItem)
    ),
    tags(
        (name = "Reports", description = "Company analytics")
    )
)]
pub struct ReportDoc;
