use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::Package;

/// Payment metadata recorded after the provider confirmed a charge.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Payment {
    pub id: String,
    pub hr_email: String,
    pub price: u32,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub package: Package,
    pub date: DateTime<Utc>,
    pub payment_status: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewPayment {
    pub transaction_id: String,
    pub package: Package,
}
