use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::utils::lenient;

/// Stock level under which an asset counts as limited.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
pub enum AssetType {
    Laptop,
    Desktop,
    Monitor,
    Keyboard,
    Mouse,
    Headset,
    Phone,
    Tablet,
    Printer,
    Scanner,
    Projector,
    Camera,
    #[serde(rename = "Office Chair")]
    OfficeChair,
    Desk,
    #[serde(rename = "Software License")]
    SoftwareLicense,
    #[serde(rename = "Server Equipment")]
    ServerEquipment,
    #[serde(other)]
    Other,
}

impl AssetType {
    pub fn label(self) -> &'static str {
        match self {
            AssetType::Laptop => "Laptop",
            AssetType::Desktop => "Desktop",
            AssetType::Monitor => "Monitor",
            AssetType::Keyboard => "Keyboard",
            AssetType::Mouse => "Mouse",
            AssetType::Headset => "Headset",
            AssetType::Phone => "Phone",
            AssetType::Tablet => "Tablet",
            AssetType::Printer => "Printer",
            AssetType::Scanner => "Scanner",
            AssetType::Projector => "Projector",
            AssetType::Camera => "Camera",
            AssetType::OfficeChair => "Office Chair",
            AssetType::Desk => "Desk",
            AssetType::SoftwareLicense => "Software License",
            AssetType::ServerEquipment => "Server Equipment",
            AssetType::Other => "Other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub product_name: String,
    pub product_type: AssetType,
    /// Available stock.
    #[serde(default, deserialize_with = "lenient::int")]
    pub product_quantity: i64,
    #[serde(default)]
    pub creator_name: String,
    #[serde(default)]
    pub creator_email: String,
    #[serde(default, deserialize_with = "lenient::non_empty", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn in_stock(&self) -> bool {
        self.product_quantity > 0
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewAsset {
    pub product_name: String,
    pub product_type: AssetType,
    pub product_quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateAsset {
    pub product_name: Option<String>,
    pub product_type: Option<AssetType>,
    pub product_quantity: Option<i64>,
}

impl UpdateAsset {
    /// Checks if all fields are `None`, indicating no updates were provided.
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none() && self.product_type.is_none() && self.product_quantity.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum Availability {
    Available,
    #[serde(rename = "Out Of Stock", alias = "OutOfStock")]
    OutOfStock,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Serialize, Deserialize, Default, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AssetFilterParams {
    /// Case-insensitive product name search
    pub search: Option<String>,
    pub availability: Option<Availability>,
    pub product_type: Option<AssetType>,
    /// Sort by quantity
    pub sort: Option<SortOrder>,
}
