use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::lenient;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hr,
    #[default]
    Employee,
}

/// Subscription package of an HR account.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Package {
    Basic,
    Standard,
    Premium,
}

impl Package {
    /// Maximum number of seats the package allows.
    pub fn seat_limit(self) -> usize {
        match self {
            Package::Basic => 5,
            Package::Standard => 10,
            Package::Premium => 20,
        }
    }

    /// Price charged for the package.
    pub fn price(self) -> u32 {
        match self {
            Package::Basic => 5,
            Package::Standard => 8,
            Package::Premium => 15,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient::non_empty", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Package>,
    #[serde(default)]
    pub payment_status: bool,
    #[serde(default, deserialize_with = "lenient::datetime", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_hr(&self) -> bool {
        self.role == Role::Hr
    }

    /// Company the user belongs to; `None` means unaffiliated.
    pub fn company(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn is_affiliated(&self) -> bool {
        self.company().is_some()
    }
}

/// Signup payload. The email always comes from the verified token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub company_name: Option<String>,
    /// Public URL returned by the image host.
    pub company_logo: Option<String>,
    pub packages: Option<Package>,
    pub dob: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub photo_url: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.dob.is_none() && self.photo_url.is_none()
    }
}

/// HR batch (or single) add of unaffiliated users.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddEmployees {
    pub user_ids: Vec<String>,
}
