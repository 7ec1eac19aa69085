use chrono::{DateTime, Utc};
use tracing::info;

use super::error::{DomainError, DomainResult};
use crate::api::auth::Claims;
use crate::db::models::{NewUser, Role, UpdateProfile, User};
use crate::db::store::{to_fields, DocumentStore, USERS};
use crate::middleware::auth::Session;

/// Company names are stored without whitespace and lowercased.
pub fn normalize_company_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create the User record of a freshly authenticated principal.
///
/// HR accounts bring their company, logo and package; employees start
/// unaffiliated and wait for an HR manager to add them.
pub async fn signup(
    store: &dyn DocumentStore,
    claims: &Claims,
    payload: NewUser,
    now: DateTime<Utc>,
) -> DomainResult<User> {
    let email = claims.email().trim();
    if email.is_empty() {
        return Err(DomainError::validation("Token carries no email"));
    }
    if store.get_data_by_email(USERS, email).await?.is_some() {
        return Err(DomainError::DuplicateEmail);
    }

    let name = non_blank(Some(payload.name))
        .or_else(|| non_blank(claims.name.clone()))
        .ok_or_else(|| DomainError::validation("Name is required"))?;

    let mut user = User {
        id: String::new(),
        name,
        email: email.to_string(),
        role: payload.role,
        company_name: None,
        company_logo: None,
        photo_url: non_blank(payload.photo_url).or_else(|| claims.picture.clone()),
        dob: non_blank(payload.dob),
        packages: None,
        payment_status: false,
        created_at: Some(now),
    };

    if payload.role == Role::Hr {
        let company = non_blank(payload.company_name)
            .map(|c| normalize_company_name(&c))
            .ok_or_else(|| DomainError::validation("Company name is required"))?;
        let logo = non_blank(payload.company_logo)
            .ok_or_else(|| DomainError::validation("Company logo is required"))?;
        let package = payload
            .packages
            .ok_or_else(|| DomainError::validation("Select a package"))?;
        ensure_company_unclaimed(store, &company).await?;
        user.company_name = Some(company);
        user.company_logo = Some(logo);
        user.packages = Some(package);
    }

    let created = store.create_data(USERS, to_fields(&user)?).await?;
    info!("New {:?} account {} ({})", user.role, user.email, created.id);
    Ok(created.decode(USERS)?)
}

/// A company belongs to the HR account that registered it.
async fn ensure_company_unclaimed(store: &dyn DocumentStore, company: &str) -> DomainResult<()> {
    let members = store.get_data_by_company(USERS, company).await?;
    let claimed = members
        .iter()
        .any(|record| record.decode::<User>(USERS).is_ok_and(|user| user.is_hr()));
    if claimed {
        return Err(DomainError::DuplicateCompany(company.to_string()));
    }
    Ok(())
}

pub async fn update_profile(
    store: &dyn DocumentStore,
    session: &Session,
    patch: UpdateProfile,
) -> DomainResult<User> {
    if patch.is_empty() {
        return Err(DomainError::validation("No fields to update"));
    }
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(DomainError::validation("Name cannot be empty"));
    }

    let patch = UpdateProfile {
        name: patch.name.map(|n| n.trim().to_string()),
        ..patch
    };
    store
        .update_data(USERS, &session.user.id, to_fields(&patch)?)
        .await?;

    let record = store
        .get_data_by_id(USERS, &session.user.id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;
    Ok(record.decode(USERS)?)
}
