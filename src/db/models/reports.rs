use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::asset::Asset;
use super::requests::AssetRequest;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct DashboardStats {
    pub total_employees: usize,
    pub total_assets: usize,
    pub pending_requests: usize,
    pub approved_this_month: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct AssetReport {
    pub total_assets: usize,
    pub low_stock_assets: usize,
    pub asset_list: Vec<Asset>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct RequestReport {
    pub total_requests: usize,
    pub pending_requests: usize,
    pub approved_requests: usize,
    pub rejected_requests: usize,
    pub request_list: Vec<AssetRequest>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, ToSchema)]
pub struct TopRequestedItem {
    pub asset_name: String,
    pub count: usize,
}
