use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::models::Package;
use crate::db::store::StoreError;
use crate::utils::api_response::ApiResponse;

pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by workflows and views before or while touching the store.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Asset is out of stock")]
    OutOfStock { asset_id: String },

    #[error("Seat limit exceeded: {current} of {limit} seats in use, {requested} requested")]
    SeatLimitExceeded {
        limit: usize,
        current: usize,
        requested: usize,
    },

    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error("A pending request for this asset already exists")]
    DuplicatePendingRequest,

    #[error("Company {0} is already registered")]
    DuplicateCompany(String),

    #[error("Transaction {0} was already recorded")]
    DuplicateTransaction(String),

    #[error("Cannot move from the {current:?} package to the smaller {requested:?} package")]
    PackageDowngrade { current: Package, requested: Package },

    #[error("Cannot change a {from} record")]
    InvalidTransition { from: &'static str },

    #[error("User {0} already belongs to a company")]
    AlreadyAffiliated(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) | DomainError::InvalidTransition { .. } => {
                StatusCode::BAD_REQUEST
            }
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::OutOfStock { .. }
            | DomainError::SeatLimitExceeded { .. }
            | DomainError::DuplicateEmail
            | DomainError::DuplicatePendingRequest
            | DomainError::DuplicateCompany(_)
            | DomainError::DuplicateTransaction(_)
            | DomainError::PackageDowngrade { .. }
            | DomainError::AlreadyAffiliated(_)
            | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiResponse<()> {
    fn from(err: DomainError) -> Self {
        let status = err.status();
        match &err {
            DomainError::Store(e) => {
                error!("Store operation failed: {}", e);
                ApiResponse::error(status, "Store operation failed", None)
            }
            DomainError::SeatLimitExceeded { limit, current, requested } => {
                warn!("{}", err);
                ApiResponse::error(
                    status,
                    format!("You can only have up to {} members with this package", limit),
                    Some(json!({ "limit": limit, "current": current, "requested": requested })),
                )
            }
            DomainError::OutOfStock { asset_id } => {
                warn!("Out of stock: asset {}", asset_id);
                ApiResponse::error(status, err.to_string(), Some(json!({ "asset_id": asset_id })))
            }
            _ => {
                warn!("Request rejected: {}", err);
                ApiResponse::error(status, err.to_string(), None)
            }
        }
    }
}

impl From<StoreError> for ApiResponse<()> {
    fn from(err: StoreError) -> Self {
        DomainError::from(err).into()
    }
}
