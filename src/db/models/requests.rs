// src/db/models/requests.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::utils::lenient;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum RequestStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    /// Approved and Rejected accept no further transition.
    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }
}

/// An employee's request for one unit of an asset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct AssetRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub asset_name: String,
    #[serde(default)]
    pub asset_type: String,
    /// Stock observed when the request was made.
    #[serde(default, deserialize_with = "lenient::int")]
    pub asset_quantity: i64,
    #[serde(default)]
    pub requester_name: String,
    #[serde(default)]
    pub requester_email: String,
    #[serde(default, deserialize_with = "lenient::non_empty", skip_serializing_if = "Option::is_none")]
    pub requester_company: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub request_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    #[serde(default)]
    pub note: String,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    #[serde(rename = "approvedBy", default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewAssetRequest {
    pub asset_id: String,
    #[serde(default)]
    pub note: String,
}

/// Body of the HR decision endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestDecision {
    pub status: RequestStatus,
}

#[derive(Debug, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestFilterParams {
    /// Matches requester name or email for company lists, asset name for personal lists
    pub search: Option<String>,
    pub status: Option<RequestStatus>,
}
