//! Derived views. Each one is a pure function over a decoded snapshot of a
//! collection; callers fetch the snapshot with [`load`] or a field scan.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::error::DomainResult;
use crate::db::models::{
    Asset, AssetFilterParams, AssetReport, AssetRequest, Availability, DashboardStats,
    RequestFilterParams, RequestReport, RequestStatus, Role, SortOrder, TopRequestedItem, User,
    UserAsset, UserAssetFilterParams, LOW_STOCK_THRESHOLD,
};
use crate::db::store::{decode_all, DocumentStore, Record};
use crate::utils::dates::{sort_by_latest, start_of_month};

/// Number of entries in the most-requested ranking.
pub const TOP_REQUESTED_LIMIT: usize = 5;

/// Fetch and decode a whole collection.
pub async fn load<T: DeserializeOwned>(store: &dyn DocumentStore, collection: &str) -> DomainResult<Vec<T>> {
    let records = store.get_all_data(collection).await?;
    Ok(decode_all(collection, &records))
}

/// Decode the records a field scan returned.
pub fn decoded<T: DeserializeOwned>(collection: &str, records: Vec<Record>) -> Vec<T> {
    decode_all(collection, &records)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Trimmed, non-empty search term.
fn term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

pub fn assets_for_company(assets: &[Asset], company: &str, filter: &AssetFilterParams) -> Vec<Asset> {
    let search = term(&filter.search);
    let mut list: Vec<Asset> = assets
        .iter()
        .filter(|asset| asset.company_name.as_deref() == Some(company))
        .filter(|asset| search.map_or(true, |s| contains_ci(&asset.product_name, s)))
        .filter(|asset| match filter.availability {
            Some(Availability::Available) => asset.in_stock(),
            Some(Availability::OutOfStock) => !asset.in_stock(),
            None => true,
        })
        .filter(|asset| filter.product_type.map_or(true, |t| asset.product_type == t))
        .cloned()
        .collect();

    match filter.sort {
        Some(SortOrder::Asc) => list.sort_by_key(|asset| asset.product_quantity),
        Some(SortOrder::Desc) => list.sort_by_key(|asset| std::cmp::Reverse(asset.product_quantity)),
        None => {}
    }
    list
}

/// Assets under the low-stock threshold, most recently touched first.
pub fn low_stock_assets(assets: &[Asset], company: &str) -> Vec<Asset> {
    let mut list: Vec<Asset> = assets
        .iter()
        .filter(|asset| asset.company_name.as_deref() == Some(company))
        .filter(|asset| asset.product_quantity < LOW_STOCK_THRESHOLD)
        .cloned()
        .collect();
    sort_by_latest(&mut list, |asset| [asset.updated_date, asset.created_date]);
    list
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// All requests filed by members of `company`. Search matches the requester.
pub fn company_requests(requests: &[AssetRequest], company: &str, filter: &RequestFilterParams) -> Vec<AssetRequest> {
    let search = term(&filter.search);
    let mut list: Vec<AssetRequest> = requests
        .iter()
        .filter(|r| r.requester_company.as_deref() == Some(company))
        .filter(|r| {
            search.map_or(true, |s| contains_ci(&r.requester_name, s) || contains_ci(&r.requester_email, s))
        })
        .filter(|r| filter.status.map_or(true, |status| r.status == status))
        .cloned()
        .collect();
    sort_by_latest(&mut list, |r| [r.approval_date, r.request_date]);
    list
}

pub fn pending_requests(requests: &[AssetRequest], company: &str) -> Vec<AssetRequest> {
    let mut list: Vec<AssetRequest> = requests
        .iter()
        .filter(|r| r.requester_company.as_deref() == Some(company) && r.status == RequestStatus::Pending)
        .cloned()
        .collect();
    sort_by_latest(&mut list, |r| [r.request_date]);
    list
}

/// Requests filed by `email`. Search matches the asset name.
pub fn requests_by_requester(requests: &[AssetRequest], email: &str, filter: &RequestFilterParams) -> Vec<AssetRequest> {
    let search = term(&filter.search);
    let mut list: Vec<AssetRequest> = requests
        .iter()
        .filter(|r| r.requester_email == email)
        .filter(|r| search.map_or(true, |s| contains_ci(&r.asset_name, s)))
        .filter(|r| filter.status.map_or(true, |status| r.status == status))
        .cloned()
        .collect();
    sort_by_latest(&mut list, |r| [r.approval_date, r.request_date]);
    list
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// Assets held (or formerly held) by `email`, newest assignment first.
///
/// `filter` matches either the asset type or the assignment status.
pub fn user_assets_for(assignments: &[UserAsset], email: &str, filter: &UserAssetFilterParams) -> Vec<UserAsset> {
    let search = term(&filter.search);
    let kind = term(&filter.filter);
    let mut list: Vec<UserAsset> = assignments
        .iter()
        .filter(|a| a.user_id == email)
        .filter(|a| search.map_or(true, |s| contains_ci(&a.asset_name, s)))
        .filter(|a| {
            kind.map_or(true, |k| {
                a.asset_type.eq_ignore_ascii_case(k) || a.status.as_str().eq_ignore_ascii_case(k)
            })
        })
        .cloned()
        .collect();
    sort_by_latest(&mut list, |a| [a.assigned_date]);
    list
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Employees not affiliated with any company.
pub fn unaffiliated_users(users: &[User]) -> Vec<User> {
    users
        .iter()
        .filter(|user| !user.is_affiliated() && user.role == Role::Employee)
        .cloned()
        .collect()
}

pub fn users_by_company(users: &[User], company: &str) -> Vec<User> {
    users
        .iter()
        .filter(|user| user.company() == Some(company))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

pub fn dashboard_stats(
    users: &[User],
    assets: &[Asset],
    requests: &[AssetRequest],
    company: &str,
    now: DateTime<Utc>,
) -> DashboardStats {
    let month_start = start_of_month(now);
    let company_requests = requests
        .iter()
        .filter(|r| r.requester_company.as_deref() == Some(company));

    let (mut pending, mut approved_this_month) = (0, 0);
    for request in company_requests {
        match request.status {
            RequestStatus::Pending => pending += 1,
            RequestStatus::Approved if request.approval_date.is_some_and(|at| at >= month_start) => {
                approved_this_month += 1
            }
            _ => {}
        }
    }

    DashboardStats {
        total_employees: users
            .iter()
            .filter(|u| u.company() == Some(company) && u.role == Role::Employee)
            .count(),
        total_assets: assets
            .iter()
            .filter(|a| a.company_name.as_deref() == Some(company))
            .count(),
        pending_requests: pending,
        approved_this_month,
    }
}

pub fn asset_report(assets: &[Asset], company: &str) -> AssetReport {
    let asset_list = assets_for_company(assets, company, &AssetFilterParams::default());
    AssetReport {
        total_assets: asset_list.len(),
        low_stock_assets: asset_list
            .iter()
            .filter(|a| a.product_quantity < LOW_STOCK_THRESHOLD)
            .count(),
        asset_list,
    }
}

pub fn request_report(requests: &[AssetRequest], company: &str) -> RequestReport {
    let request_list = company_requests(requests, company, &RequestFilterParams::default());
    let count = |status: RequestStatus| request_list.iter().filter(|r| r.status == status).count();
    RequestReport {
        total_requests: request_list.len(),
        pending_requests: count(RequestStatus::Pending),
        approved_requests: count(RequestStatus::Approved),
        rejected_requests: count(RequestStatus::Rejected),
        request_list,
    }
}

/// Asset names ranked by how often the company requested them.
/// Ties are broken alphabetically.
pub fn top_requested_items(requests: &[AssetRequest], company: &str, limit: usize) -> Vec<TopRequestedItem> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for request in requests
        .iter()
        .filter(|r| r.requester_company.as_deref() == Some(company) && !r.asset_name.is_empty())
    {
        *counts.entry(request.asset_name.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<TopRequestedItem> = counts
        .into_iter()
        .map(|(asset_name, count)| TopRequestedItem {
            asset_name: asset_name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.asset_name.cmp(&b.asset_name)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::AssetType;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn parse<T: DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn asset(id: &str, company: &str, quantity: i64, kind: &str, updated: Option<&str>) -> Asset {
        parse(json!({
            "id": id,
            "product_name": format!("{} {}", kind, id),
            "product_type": kind,
            "product_quantity": quantity,
            "company_name": company,
            "created_date": "2024-01-01T00:00:00Z",
            "updated_date": updated,
        }))
    }

    fn request(id: &str, company: &str, email: &str, asset_name: &str, status: &str, approved: Option<&str>) -> AssetRequest {
        parse(json!({
            "id": id,
            "asset_id": "a1",
            "asset_name": asset_name,
            "asset_type": "Laptop",
            "requester_name": email.split('@').next().unwrap(),
            "requester_email": email,
            "requester_company": company,
            "request_date": format!("2024-05-0{}T08:00:00Z", id.len()),
            "status": status,
            "approval_date": approved,
        }))
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|item| id(item).to_string()).collect()
    }

    #[test]
    fn company_asset_filters() {
        let assets = vec![
            asset("a1", "acme", 0, "Laptop", None),
            asset("a2", "acme", 12, "Monitor", None),
            asset("a3", "globex", 3, "Laptop", None),
            asset("a4", "acme", 4, "Laptop", None),
        ];

        let all = assets_for_company(&assets, "acme", &AssetFilterParams::default());
        assert_eq!(ids(&all, |a| &a.id), vec!["a1", "a2", "a4"]);

        let filter = AssetFilterParams {
            search: Some("LAPTOP".to_string()),
            availability: Some(Availability::Available),
            ..Default::default()
        };
        assert_eq!(ids(&assets_for_company(&assets, "acme", &filter), |a| &a.id), vec!["a4"]);

        let filter = AssetFilterParams {
            availability: Some(Availability::OutOfStock),
            ..Default::default()
        };
        assert_eq!(ids(&assets_for_company(&assets, "acme", &filter), |a| &a.id), vec!["a1"]);

        let filter = AssetFilterParams {
            product_type: Some(AssetType::Monitor),
            ..Default::default()
        };
        assert_eq!(ids(&assets_for_company(&assets, "acme", &filter), |a| &a.id), vec!["a2"]);

        let filter = AssetFilterParams {
            sort: Some(SortOrder::Desc),
            ..Default::default()
        };
        assert_eq!(ids(&assets_for_company(&assets, "acme", &filter), |a| &a.id), vec!["a2", "a4", "a1"]);
    }

    #[test]
    fn low_stock_is_newest_first() {
        let assets = vec![
            asset("a1", "acme", 4, "Laptop", None),
            asset("a2", "acme", 1, "Mouse", Some("2024-06-01T00:00:00Z")),
            asset("a3", "acme", 5, "Desk", Some("2024-07-01T00:00:00Z")),
            asset("a4", "acme", 0, "Phone", Some("2024-03-01T00:00:00Z")),
        ];
        let low = low_stock_assets(&assets, "acme");
        assert_eq!(ids(&low, |a| &a.id), vec!["a2", "a4", "a1"]);
    }

    #[test]
    fn request_views() {
        let requests = vec![
            request("r", "acme", "ann@acme.io", "Laptop", "Pending", None),
            request("rr", "acme", "bob@acme.io", "Monitor", "Approved", Some("2024-06-10T00:00:00Z")),
            request("rrr", "acme", "ann@acme.io", "Monitor", "Rejected", None),
            request("rrrr", "globex", "gil@globex.io", "Laptop", "Pending", None),
        ];

        let all = company_requests(&requests, "acme", &RequestFilterParams::default());
        assert_eq!(ids(&all, |r| &r.id), vec!["rr", "rrr", "r"]);

        let filter = RequestFilterParams {
            search: Some("ANN".to_string()),
            status: None,
        };
        assert_eq!(ids(&company_requests(&requests, "acme", &filter), |r| &r.id), vec!["rrr", "r"]);

        assert_eq!(ids(&pending_requests(&requests, "acme"), |r| &r.id), vec!["r"]);

        let filter = RequestFilterParams {
            search: Some("monitor".to_string()),
            status: Some(RequestStatus::Rejected),
        };
        assert_eq!(ids(&requests_by_requester(&requests, "ann@acme.io", &filter), |r| &r.id), vec!["rrr"]);
    }

    #[test]
    fn assignment_filter_matches_type_or_status() {
        let assignment = |id: &str, kind: &str, status: &str, day: u32| -> UserAsset {
            parse(json!({
                "id": id,
                "user_id": "ann@acme.io",
                "asset_id": "a1",
                "asset_name": format!("{} {}", kind, id),
                "asset_type": kind,
                "request_id": format!("req-{}", id),
                "assigned_date": format!("2024-05-{:02}T00:00:00Z", day),
                "status": status,
            }))
        };
        let assignments = vec![
            assignment("u1", "Laptop", "Active", 1),
            assignment("u2", "Mouse", "Returned", 9),
            assignment("u3", "Laptop", "Returned", 5),
        ];

        let all = user_assets_for(&assignments, "ann@acme.io", &UserAssetFilterParams::default());
        assert_eq!(ids(&all, |a| &a.id), vec!["u2", "u3", "u1"]);

        let by_type = UserAssetFilterParams {
            search: None,
            filter: Some("laptop".to_string()),
        };
        assert_eq!(ids(&user_assets_for(&assignments, "ann@acme.io", &by_type), |a| &a.id), vec!["u3", "u1"]);

        let by_status = UserAssetFilterParams {
            search: None,
            filter: Some("Returned".to_string()),
        };
        assert_eq!(ids(&user_assets_for(&assignments, "ann@acme.io", &by_status), |a| &a.id), vec!["u2", "u3"]);

        assert!(user_assets_for(&assignments, "bob@acme.io", &UserAssetFilterParams::default()).is_empty());
    }

    #[test]
    fn team_views() {
        let users: Vec<User> = vec![
            parse(json!({ "id": "h", "email": "hr@acme.io", "role": "hr", "company_name": "acme" })),
            parse(json!({ "id": "e1", "email": "e1@acme.io", "company_name": "acme" })),
            parse(json!({ "id": "e2", "email": "e2@mail.io", "company_name": "" })),
            parse(json!({ "id": "e3", "email": "e3@mail.io" })),
            parse(json!({ "id": "h2", "email": "hr@new.io", "role": "hr" })),
        ];
        assert_eq!(ids(&unaffiliated_users(&users), |u| &u.id), vec!["e2", "e3"]);
        assert_eq!(ids(&users_by_company(&users, "acme"), |u| &u.id), vec!["h", "e1"]);
    }

    #[test]
    fn reports() {
        let users: Vec<User> = vec![
            parse(json!({ "id": "h", "email": "hr@acme.io", "role": "hr", "company_name": "acme" })),
            parse(json!({ "id": "e1", "email": "ann@acme.io", "company_name": "acme" })),
            parse(json!({ "id": "e2", "email": "bob@acme.io", "company_name": "acme" })),
        ];
        let assets = vec![
            asset("a1", "acme", 2, "Laptop", None),
            asset("a2", "acme", 30, "Desk", None),
            asset("a3", "globex", 1, "Desk", None),
        ];
        let requests = vec![
            request("r", "acme", "ann@acme.io", "Laptop", "Pending", None),
            request("rr", "acme", "bob@acme.io", "Laptop", "Approved", Some("2024-06-10T00:00:00Z")),
            request("rrr", "acme", "ann@acme.io", "Desk", "Approved", Some("2024-05-31T23:59:59Z")),
            request("rrrr", "acme", "bob@acme.io", "Monitor", "Rejected", None),
            request("rrrrr", "globex", "gil@globex.io", "Laptop", "Pending", None),
        ];
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        assert_eq!(
            dashboard_stats(&users, &assets, &requests, "acme", now),
            DashboardStats {
                total_employees: 2,
                total_assets: 2,
                pending_requests: 1,
                approved_this_month: 1,
            }
        );

        let report = asset_report(&assets, "acme");
        assert_eq!((report.total_assets, report.low_stock_assets), (2, 1));

        let report = request_report(&requests, "acme");
        assert_eq!(
            (report.total_requests, report.pending_requests, report.approved_requests, report.rejected_requests),
            (4, 1, 2, 1)
        );

        assert_eq!(
            top_requested_items(&requests, "acme", 2),
            vec![
                TopRequestedItem { asset_name: "Laptop".to_string(), count: 2 },
                TopRequestedItem { asset_name: "Desk".to_string(), count: 1 },
            ]
        );
    }
}
