use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use super::error::{DomainError, DomainResult};
use crate::db::models::{Asset, AssetType, NewAsset, UpdateAsset};
use crate::db::store::{fields_of, to_fields, DocumentStore, ASSETS};
use crate::middleware::auth::Session;

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Product name is required"));
    }
    Ok(name.to_string())
}

fn validate_type(product_type: AssetType) -> DomainResult<AssetType> {
    if product_type == AssetType::Other {
        return Err(DomainError::validation("Unknown product type"));
    }
    Ok(product_type)
}

/// Asset `id` of `company`; assets of other companies read as missing.
pub async fn load_company_asset(
    store: &dyn DocumentStore,
    company: &str,
    id: &str,
) -> DomainResult<Asset> {
    let asset: Asset = store
        .get_data_by_id(ASSETS, id)
        .await?
        .ok_or(DomainError::NotFound("Asset"))?
        .decode(ASSETS)?;
    if asset.company_name.as_deref() != Some(company) {
        return Err(DomainError::NotFound("Asset"));
    }
    Ok(asset)
}

pub async fn add_asset(
    store: &dyn DocumentStore,
    session: &Session,
    payload: NewAsset,
    now: DateTime<Utc>,
) -> DomainResult<Asset> {
    let company = session.hr_company()?;
    if payload.product_quantity <= 0 {
        return Err(DomainError::validation("Quantity must be greater than zero"));
    }

    let asset = Asset {
        id: String::new(),
        product_name: validate_name(&payload.product_name)?,
        product_type: validate_type(payload.product_type)?,
        product_quantity: payload.product_quantity,
        creator_name: session.name().to_string(),
        creator_email: session.email().to_string(),
        company_name: Some(company.to_string()),
        created_date: Some(now),
        updated_date: None,
    };

    let created = store.create_data(ASSETS, to_fields(&asset)?).await?;
    info!("{} added {} x{} ({})", session.email(), asset.product_name, asset.product_quantity, created.id);
    Ok(created.decode(ASSETS)?)
}

pub async fn update_asset(
    store: &dyn DocumentStore,
    session: &Session,
    id: &str,
    patch: UpdateAsset,
    now: DateTime<Utc>,
) -> DomainResult<Asset> {
    let company = session.hr_company()?;
    if patch.is_empty() {
        return Err(DomainError::validation("No fields to update"));
    }

    let mut fields = fields_of(json!({ "updated_date": now }));
    if let Some(name) = &patch.product_name {
        let name = validate_name(name)?;
        fields.insert("product_name".to_string(), json!(name));
    }
    if let Some(product_type) = patch.product_type {
        let product_type = validate_type(product_type)?;
        fields.insert("product_type".to_string(), json!(product_type));
    }
    if let Some(quantity) = patch.product_quantity {
        if quantity < 0 {
            return Err(DomainError::validation("Quantity cannot be negative"));
        }
        fields.insert("product_quantity".to_string(), json!(quantity));
    }

    load_company_asset(store, company, id).await?;
    store.update_data(ASSETS, id, fields).await?;
    info!("{} updated asset {}", session.email(), id);
    load_company_asset(store, company, id).await
}

/// Delete an asset. Requests and assignments referencing it are kept.
pub async fn delete_asset(store: &dyn DocumentStore, session: &Session, id: &str) -> DomainResult<Asset> {
    let company = session.hr_company()?;
    let asset = load_company_asset(store, company, id).await?;
    store.delete_data(ASSETS, id).await?;
    info!("{} deleted asset {} ({})", session.email(), asset.product_name, id);
    Ok(asset)
}
