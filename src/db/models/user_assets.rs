use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::utils::lenient;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum AssignmentStatus {
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "returned")]
    Returned,
}

impl AssignmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Active => "Active",
            AssignmentStatus::Returned => "Returned",
        }
    }
}

/// An asset currently (or formerly) held by a user, created on approval.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct UserAsset {
    pub id: String,
    /// Holder's email.
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub asset_id: String,
    #[serde(default)]
    pub asset_name: String,
    #[serde(default)]
    pub asset_type: String,
    pub request_id: String,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::non_empty", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserAssetFilterParams {
    /// Case-insensitive asset name search
    pub search: Option<String>,
    /// Matches either the asset type or the assignment status
    pub filter: Option<String>,
}
