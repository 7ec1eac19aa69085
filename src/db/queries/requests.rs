use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::requests::{
    AssetRequest, NewAssetRequest, RequestDecision, RequestFilterParams, RequestStatus,
};
use crate::db::models::user_assets::{AssignmentStatus, UserAsset};
use crate::db::store::REQUESTS;
use crate::domain::approval::{self, DecisionOutcome};
use crate::domain::read_models;
use crate::middleware::auth::Session;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    post,
    path = "/requests",
    request_body = NewAssetRequest,
    responses(
        (status = 201, description = "Asset request created", body = AssetRequest),
        (status = 403, description = "Caller is unaffiliated or the asset belongs to another company"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset out of stock or duplicate request already pending")
    ),
    tag = "Requests",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_asset_request(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<NewAssetRequest>,
) -> Result<ApiResponse<AssetRequest>, ApiResponse<()>> {
    let request =
        approval::create_request(state.store.as_ref(), &session, payload, Utc::now()).await?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Asset request submitted",
        request,
    ))
}

/// Every request of the HR manager's company, newest first.
#[utoipa::path(
    get,
    path = "/requests",
    params(
        RequestFilterParams
    ),
    responses(
        (status = 200, description = "Company requests", body = [AssetRequest]),
        (status = 403, description = "Caller is not an HR manager")
    ),
    tag = "Requests",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_company_requests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(filter): Query<RequestFilterParams>,
) -> Result<ApiResponse<Vec<AssetRequest>>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let records = state
        .store
        .get_data_by_field(REQUESTS, "requester_company", &json!(company))
        .await?;
    let list: Vec<AssetRequest> = read_models::decoded(REQUESTS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Requests retrieved successfully",
        read_models::company_requests(&list, company, &filter),
    ))
}

#[utoipa::path(
    get,
    path = "/requests/pending",
    responses(
        (status = 200, description = "Pending company requests", body = [AssetRequest]),
        (status = 403, description = "Caller is not an HR manager")
    ),
    tag = "Requests",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_pending_requests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<Vec<AssetRequest>>, ApiResponse<()>> {
    let company = session.hr_company()?;
    let records = state
        .store
        .get_data_by_field(REQUESTS, "requester_company", &json!(company))
        .await?;
    let list: Vec<AssetRequest> = read_models::decoded(REQUESTS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Pending requests retrieved successfully",
        read_models::pending_requests(&list, company),
    ))
}

#[utoipa::path(
    get,
    path = "/requests/mine",
    params(
        RequestFilterParams
    ),
    responses(
        (status = 200, description = "Requests filed by the caller", body = [AssetRequest])
    ),
    tag = "Requests",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_my_requests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(filter): Query<RequestFilterParams>,
) -> Result<ApiResponse<Vec<AssetRequest>>, ApiResponse<()>> {
    let records = state
        .store
        .get_data_by_field(REQUESTS, "requester_email", &json!(session.email()))
        .await?;
    let list: Vec<AssetRequest> = read_models::decoded(REQUESTS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Requests retrieved successfully",
        read_models::requests_by_requester(&list, session.email(), &filter),
    ))
}

#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(
        ("request_id" = String, Path, description = "Request key")
    ),
    responses(
        (status = 200, description = "Request found", body = AssetRequest),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(request_id): Path<String>,
) -> Result<ApiResponse<AssetRequest>, ApiResponse<()>> {
    let request = approval::load_visible_request(state.store.as_ref(), &session, &request_id).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Request retrieved successfully",
        request,
    ))
}

/// Approve or reject a pending request.
///
/// Approval decrements stock and creates the assignment record atomically.
#[utoipa::path(
    patch,
    path = "/requests/{request_id}",
    params(
        ("request_id" = String, Path, description = "Request key")
    ),
    request_body = RequestDecision,
    responses(
        (status = 200, description = "Decision applied", body = DecisionOutcome),
        (status = 400, description = "Request already resolved or invalid status"),
        (status = 403, description = "Caller is not HR of the requester's company"),
        (status = 404, description = "Request or asset not found"),
        (status = 409, description = "Asset out of stock")
    ),
    tag = "Requests",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn decide_request(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(request_id): Path<String>,
    Json(payload): Json<RequestDecision>,
) -> Result<ApiResponse<DecisionOutcome>, ApiResponse<()>> {
    let outcome = approval::decide_request(
        state.store.as_ref(),
        &session,
        &request_id,
        payload.status,
        Utc::now(),
    )
    .await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        format!("Request {}", outcome.request.status.as_str().to_lowercase()),
        outcome,
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_asset_request,
        get_company_requests,
        get_pending_requests,
        get_my_requests,
        get_request,
        decide_request,
    ),
    components(
        schemas(
            AssetRequest,
            NewAssetRequest,
            RequestDecision,
            RequestStatus,
            DecisionOutcome,
            UserAsset,
            AssignmentStatus
        )
    ),
    tags(
        (name = "Requests", description = "Asset requests and HR decisions")
    )
)]
pub struct RequestDoc;
