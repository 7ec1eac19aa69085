//! Asset request lifecycle: creation, the HR decision and returns.
//!
//! A request moves `Pending -> Approved | Rejected` exactly once. Approval
//! decrements stock, creates the assignment record and resolves the request
//! in a single atomic commit guarded by the observed stock level and status,
//! so concurrent approvals cannot oversell an asset or approve twice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::error::{DomainError, DomainResult};
use crate::db::models::{
    Asset, AssetRequest, AssignmentStatus, NewAssetRequest, RequestStatus, User, UserAsset,
};
use crate::db::store::{
    decode_all, fields_of, new_id, to_fields, Batch, DocumentStore, Record, StoreError, ASSETS,
    REQUESTS, USERS, USER_ASSETS,
};
use crate::middleware::auth::Session;

/// Attempts made when an approval loses a race on its preconditions.
pub const MAX_APPROVAL_ATTEMPTS: usize = 3;

/// Result of an HR decision.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DecisionOutcome {
    pub request: AssetRequest,
    /// Assignment created by an approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<UserAsset>,
    /// Stock left after an approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_stock: Option<i64>,
}

/// File a request for one unit of an asset of the requester's company.
pub async fn create_request(
    store: &dyn DocumentStore,
    session: &Session,
    payload: NewAssetRequest,
    now: DateTime<Utc>,
) -> DomainResult<AssetRequest> {
    let company = session.company()?;
    if session.is_hr() {
        return Err(DomainError::forbidden("HR managers cannot request assets"));
    }

    let asset_id = payload.asset_id.trim();
    if asset_id.is_empty() {
        return Err(DomainError::validation("asset_id is required"));
    }

    let asset: Asset = store
        .get_data_by_id(ASSETS, asset_id)
        .await?
        .ok_or(DomainError::NotFound("Asset"))?
        .decode(ASSETS)?;
    if asset.company_name.as_deref() != Some(company) {
        return Err(DomainError::forbidden("Asset belongs to another company"));
    }
    if !asset.in_stock() {
        return Err(DomainError::OutOfStock {
            asset_id: asset.id,
        });
    }

    let mine = store
        .get_data_by_field(REQUESTS, "requester_email", &json!(session.email()))
        .await?;
    let duplicate = decode_all::<AssetRequest>(REQUESTS, &mine)
        .iter()
        .any(|r| r.asset_id.as_deref() == Some(asset_id) && r.status == RequestStatus::Pending);
    if duplicate {
        return Err(DomainError::DuplicatePendingRequest);
    }

    let request = AssetRequest {
        id: String::new(),
        asset_id: Some(asset.id.clone()),
        asset_name: asset.product_name.clone(),
        asset_type: asset.product_type.label().to_string(),
        asset_quantity: asset.product_quantity,
        requester_name: session.name().to_string(),
        requester_email: session.email().to_string(),
        requester_company: Some(company.to_string()),
        request_date: Some(now),
        status: RequestStatus::Pending,
        note: payload.note.trim().to_string(),
        approval_date: None,
        approved_by: None,
    };

    let created = store.create_data(REQUESTS, to_fields(&request)?).await?;
    info!("{} requested {} ({})", session.email(), asset.product_name, created.id);
    Ok(created.decode(REQUESTS)?)
}

/// Apply the HR decision carried by `status`.
pub async fn decide_request(
    store: &dyn DocumentStore,
    session: &Session,
    request_id: &str,
    status: RequestStatus,
    now: DateTime<Utc>,
) -> DomainResult<DecisionOutcome> {
    match status {
        RequestStatus::Approved => approve_request(store, session, request_id, now).await,
        RequestStatus::Rejected => {
            let request = reject_request(store, session, request_id).await?;
            Ok(DecisionOutcome {
                request,
                assignment: None,
                remaining_stock: None,
            })
        }
        RequestStatus::Pending => Err(DomainError::validation(
            "status must be Approved or Rejected",
        )),
    }
}

/// Approve a pending request, retrying when a concurrent write invalidated
/// what was read. Each retry re-validates from scratch.
pub async fn approve_request(
    store: &dyn DocumentStore,
    session: &Session,
    request_id: &str,
    now: DateTime<Utc>,
) -> DomainResult<DecisionOutcome> {
    let mut attempt = 1;
    loop {
        match try_approve(store, session, request_id, now).await {
            Err(DomainError::Store(StoreError::Conflict { collection, id, field }))
                if attempt < MAX_APPROVAL_ATTEMPTS =>
            {
                warn!(
                    "Approval of {} lost a race on {}/{}.{} (attempt {})",
                    request_id, collection, id, field, attempt
                );
                attempt += 1;
            }
            Err(DomainError::Store(StoreError::Conflict { .. })) => {
                return Err(DomainError::Conflict(
                    "The request or its asset keeps changing, try again".to_string(),
                ))
            }
            other => return other,
        }
    }
}

async fn try_approve(
    store: &dyn DocumentStore,
    session: &Session,
    request_id: &str,
    now: DateTime<Utc>,
) -> DomainResult<DecisionOutcome> {
    let (record, mut request) = load_pending(store, request_id).await?;
    let company = authorize_decision(store, session, &request).await?;

    let asset_id = request
        .asset_id
        .clone()
        .ok_or(DomainError::NotFound("Asset"))?;
    let asset_record = store
        .get_data_by_id(ASSETS, &asset_id)
        .await?
        .ok_or(DomainError::NotFound("Asset"))?;
    let asset: Asset = asset_record.decode(ASSETS)?;
    if !asset.in_stock() {
        return Err(DomainError::OutOfStock { asset_id });
    }
    let remaining = (asset.product_quantity - 1).max(0);

    let assignment = UserAsset {
        id: new_id(),
        user_id: request.requester_email.clone(),
        user_name: request.requester_name.clone(),
        asset_id: asset_id.clone(),
        asset_name: asset.product_name.clone(),
        asset_type: asset.product_type.label().to_string(),
        request_id: request_id.to_string(),
        assigned_date: Some(now),
        status: AssignmentStatus::Active,
        return_date: None,
        company_name: Some(company),
    };

    let batch = Batch::new()
        .require(ASSETS, &asset_id, "product_quantity", asset_record.field("product_quantity").clone())
        .require(REQUESTS, request_id, "status", record.field("status").clone())
        .update(ASSETS, &asset_id, fields_of(json!({ "product_quantity": remaining })))
        .set(USER_ASSETS, &assignment.id, to_fields(&assignment)?)
        .update(
            REQUESTS,
            request_id,
            fields_of(json!({
                "status": RequestStatus::Approved.as_str(),
                "approval_date": now,
                "approvedBy": session.email(),
            })),
        );
    store.commit(batch).await?;

    info!(
        "{} approved request {} for {}, {} left of {}",
        session.email(),
        request_id,
        request.requester_email,
        remaining,
        asset.product_name
    );

    request.status = RequestStatus::Approved;
    request.approval_date = Some(now);
    request.approved_by = Some(session.email().to_string());
    Ok(DecisionOutcome {
        request,
        assignment: Some(assignment),
        remaining_stock: Some(remaining),
    })
}

/// Reject a pending request. No stock or assignment side effects.
pub async fn reject_request(
    store: &dyn DocumentStore,
    session: &Session,
    request_id: &str,
) -> DomainResult<AssetRequest> {
    let (record, mut request) = load_pending(store, request_id).await?;
    authorize_decision(store, session, &request).await?;

    let batch = Batch::new()
        .require(REQUESTS, request_id, "status", record.field("status").clone())
        .update(
            REQUESTS,
            request_id,
            fields_of(json!({ "status": RequestStatus::Rejected.as_str() })),
        );
    store.commit(batch).await.map_err(|err| match err {
        StoreError::Conflict { .. } => DomainError::Conflict(
            "Request was resolved concurrently".to_string(),
        ),
        other => other.into(),
    })?;

    info!("{} rejected request {}", session.email(), request_id);
    request.status = RequestStatus::Rejected;
    Ok(request)
}

/// Mark one of the principal's active assignments as returned.
///
/// Stock is left untouched.
pub async fn return_asset(
    store: &dyn DocumentStore,
    session: &Session,
    assignment_id: &str,
    now: DateTime<Utc>,
) -> DomainResult<UserAsset> {
    let record = store
        .get_data_by_id(USER_ASSETS, assignment_id)
        .await?
        .ok_or(DomainError::NotFound("Assigned asset"))?;
    let mut assignment: UserAsset = record.decode(USER_ASSETS)?;

    if assignment.user_id != session.email() {
        return Err(DomainError::forbidden("You can only return your own assets"));
    }
    if assignment.status != AssignmentStatus::Active {
        return Err(DomainError::InvalidTransition {
            from: assignment.status.as_str(),
        });
    }

    let batch = Batch::new()
        .require(USER_ASSETS, assignment_id, "status", record.field("status").clone())
        .update(
            USER_ASSETS,
            assignment_id,
            fields_of(json!({
                "status": AssignmentStatus::Returned.as_str(),
                "return_date": now,
            })),
        );
    store.commit(batch).await.map_err(|err| match err {
        StoreError::Conflict { .. } => DomainError::InvalidTransition {
            from: AssignmentStatus::Returned.as_str(),
        },
        other => other.into(),
    })?;

    info!("{} returned {} ({})", session.email(), assignment.asset_name, assignment_id);
    assignment.status = AssignmentStatus::Returned;
    assignment.return_date = Some(now);
    Ok(assignment)
}

async fn load_pending(
    store: &dyn DocumentStore,
    request_id: &str,
) -> DomainResult<(Record, AssetRequest)> {
    let record = store
        .get_data_by_id(REQUESTS, request_id)
        .await?
        .ok_or(DomainError::NotFound("Request"))?;
    let request: AssetRequest = record.decode(REQUESTS)?;
    if request.status.is_terminal() {
        return Err(DomainError::InvalidTransition {
            from: request.status.as_str(),
        });
    }
    Ok((record, request))
}

/// Company the request belongs to: the snapshot taken at creation, else the
/// requester's current company.
async fn requester_company(
    store: &dyn DocumentStore,
    request: &AssetRequest,
) -> DomainResult<Option<String>> {
    if let Some(company) = &request.requester_company {
        return Ok(Some(company.clone()));
    }
    match store.get_data_by_email(USERS, &request.requester_email).await? {
        Some(record) => Ok(record.decode::<User>(USERS)?.company_name),
        None => Ok(None),
    }
}

/// A request as seen by `session`: its requester and HR of the company that
/// may decide it. Anyone else gets `NotFound`.
pub async fn load_visible_request(
    store: &dyn DocumentStore,
    session: &Session,
    request_id: &str,
) -> DomainResult<AssetRequest> {
    let request: AssetRequest = store
        .get_data_by_id(REQUESTS, request_id)
        .await?
        .ok_or(DomainError::NotFound("Request"))?
        .decode(REQUESTS)?;

    if request.requester_email == session.email() {
        return Ok(request);
    }
    if let (true, Some(company)) = (session.is_hr(), session.user.company()) {
        if requester_company(store, &request).await?.as_deref() == Some(company) {
            return Ok(request);
        }
    }
    Err(DomainError::NotFound("Request"))
}

/// Company on whose behalf the principal decides; it must own the request.
async fn authorize_decision(
    store: &dyn DocumentStore,
    session: &Session,
    request: &AssetRequest,
) -> DomainResult<String> {
    let company = session.hr_company()?;

    if requester_company(store, request).await?.as_deref() != Some(company) {
        return Err(DomainError::forbidden(
            "Only HR of the requester's company can decide this request",
        ));
    }
    Ok(company.to_string())
}
