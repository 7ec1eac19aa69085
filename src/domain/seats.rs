//! Seat allocation: affiliating unaffiliated users with an HR company
//! within the limit of its package.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::error::{DomainError, DomainResult};
use crate::db::models::{Role, User};
use crate::db::store::{decode_all, fields_of, Batch, DocumentStore, Record, StoreError, USERS};
use crate::middleware::auth::Session;

/// Which members of a company occupy a package seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeatPolicy {
    /// Every user of the company, the HR owner included.
    #[default]
    OwnerOccupiesSeat,
    /// Only `employee`-role users.
    EmployeesOnly,
}

impl SeatPolicy {
    pub fn occupies_seat(self, user: &User) -> bool {
        match self {
            SeatPolicy::OwnerOccupiesSeat => true,
            SeatPolicy::EmployeesOnly => user.role == Role::Employee,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeatPolicy::OwnerOccupiesSeat => "owner_counts",
            SeatPolicy::EmployeesOnly => "employees_only",
        }
    }
}

impl fmt::Display for SeatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner_counts" | "owner_occupies_seat" => Ok(SeatPolicy::OwnerOccupiesSeat),
            "employees_only" => Ok(SeatPolicy::EmployeesOnly),
            _ => Err(()),
        }
    }
}

/// Seats of `company` currently taken under `policy`.
pub fn count_occupied_seats(policy: SeatPolicy, company: &str, users: &[User]) -> usize {
    users
        .iter()
        .filter(|user| user.company() == Some(company) && policy.occupies_seat(user))
        .count()
}

/// Refuse when `current + requested` would exceed `limit`.
pub fn check_seat_capacity(limit: usize, current: usize, requested: usize) -> DomainResult<()> {
    if current + requested > limit {
        return Err(DomainError::SeatLimitExceeded {
            limit,
            current,
            requested,
        });
    }
    Ok(())
}

/// Affiliate the given users with the HR principal's company.
///
/// Candidates must exist, be unaffiliated and hold the `employee` role. Either
/// every candidate is added or none is. The capacity check runs against a
/// snapshot, so two concurrent adds can still jointly exceed the limit.
pub async fn add_employees(
    store: &dyn DocumentStore,
    session: &Session,
    policy: SeatPolicy,
    user_ids: &[String],
) -> DomainResult<Vec<User>> {
    let company = session.hr_company()?;

    let mut seen = HashSet::new();
    let ids: Vec<&str> = user_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .collect();
    if ids.is_empty() {
        return Err(DomainError::validation("Select at least one user to add"));
    }

    let records = store.get_all_data(USERS).await?;
    let users: Vec<User> = decode_all(USERS, &records);

    // The cached session may predate a package upgrade.
    let owner = users
        .iter()
        .find(|user| user.id == session.user.id)
        .unwrap_or(&session.user);
    let package = owner.packages.ok_or_else(|| {
        DomainError::forbidden("Purchase a package before adding employees")
    })?;

    let mut candidates: Vec<(&Record, User)> = Vec::with_capacity(ids.len());
    for id in ids {
        let record = records
            .iter()
            .find(|record| record.id == id)
            .ok_or(DomainError::NotFound("User"))?;
        let user: User = record.decode(USERS)?;
        if user.is_hr() {
            return Err(DomainError::validation(format!(
                "{} is an HR account and cannot be added as an employee",
                user.email
            )));
        }
        if user.is_affiliated() {
            return Err(DomainError::AlreadyAffiliated(user.email));
        }
        candidates.push((record, user));
    }

    let current = count_occupied_seats(policy, company, &users);
    check_seat_capacity(package.seat_limit(), current, candidates.len())?;

    let logo = owner.company_logo.clone();
    let mut batch = Batch::new();
    for (record, _) in &candidates {
        batch = batch
            .require(USERS, &record.id, "company_name", record.field("company_name").clone())
            .update(
                USERS,
                &record.id,
                fields_of(json!({ "company_name": company, "company_logo": logo })),
            );
    }

    store.commit(batch).await.map_err(|err| match err {
        StoreError::Conflict { id, .. } => {
            warn!("User {} was affiliated concurrently", id);
            DomainError::Conflict("A selected user has just joined a company, reload and try again".to_string())
        }
        other => other.into(),
    })?;

    info!(
        "{} added {} employee(s) to {} ({} of {} seats used)",
        session.email(),
        candidates.len(),
        company,
        current + candidates.len(),
        package.seat_limit()
    );

    Ok(candidates
        .into_iter()
        .map(|(_, mut user)| {
            user.company_name = Some(company.to_string());
            user.company_logo = logo.clone();
            user
        })
        .collect())
}

/// Detach a member from the HR principal's company.
pub async fn remove_employee(
    store: &dyn DocumentStore,
    session: &Session,
    user_id: &str,
) -> DomainResult<User> {
    let company = session.hr_company()?;

    let record = store
        .get_data_by_id(USERS, user_id)
        .await?
        .ok_or(DomainError::NotFound("User"))?;
    let mut user: User = record.decode(USERS)?;

    if user.id == session.user.id || user.email == session.email() {
        return Err(DomainError::validation("You cannot remove yourself from your company"));
    }
    if user.company() != Some(company) {
        return Err(DomainError::forbidden("User is not a member of your company"));
    }

    let batch = Batch::new()
        .require(USERS, user_id, "company_name", record.field("company_name").clone())
        .update(
            USERS,
            user_id,
            fields_of(json!({ "company_name": Value::Null, "company_logo": Value::Null })),
        );
    store.commit(batch).await.map_err(|err| match err {
        StoreError::Conflict { .. } => {
            DomainError::Conflict("User was changed concurrently, reload and try again".to_string())
        }
        other => other.into(),
    })?;

    info!("{} removed {} from {}", session.email(), user.email, company);
    user.company_name = None;
    user.company_logo = None;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::InMemoryStore;
    use crate::domain::testing::{employee, hr_session};
    use pretty_assertions::assert_eq;

    async fn members(store: &InMemoryStore, company: &str) -> usize {
        let records = store.get_data_by_company(USERS, company).await.unwrap();
        records.len()
    }

    #[test]
    fn policy_names() {
        assert_eq!("owner_counts".parse(), Ok(SeatPolicy::OwnerOccupiesSeat));
        assert_eq!("EMPLOYEES_ONLY".parse(), Ok(SeatPolicy::EmployeesOnly));
        assert!("everyone".parse::<SeatPolicy>().is_err());
        assert_eq!(SeatPolicy::default(), SeatPolicy::OwnerOccupiesSeat);
    }

    #[test]
    fn capacity_boundary() {
        assert!(check_seat_capacity(5, 4, 1).is_ok());
        assert!(check_seat_capacity(5, 5, 0).is_ok());
        assert!(matches!(
            check_seat_capacity(5, 5, 1),
            Err(DomainError::SeatLimitExceeded { limit: 5, current: 5, requested: 1 })
        ));
        assert!(check_seat_capacity(10, 3, 8).is_err());
    }

    #[tokio::test]
    async fn full_basic_company_rejects_one_more() {
        let store = InMemoryStore::new();
        let session = hr_session(&store, "acme", "basic").await;
        for i in 0..4 {
            employee(&store, &format!("e{}@acme.io", i), Some("acme")).await;
        }
        let newcomer = employee(&store, "new@mail.io", None).await;

        let err = add_employees(&store, &session, SeatPolicy::OwnerOccupiesSeat, &[newcomer.id.clone()])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::SeatLimitExceeded { limit: 5, current: 5, requested: 1 }));
        assert_eq!(members(&store, "acme").await, 5);
        let stored = store.get_data_by_id(USERS, &newcomer.id).await.unwrap().unwrap();
        assert_eq!(stored.field("company_name"), &Value::Null);
    }

    #[tokio::test]
    async fn employees_only_policy_leaves_owner_out() {
        let store = InMemoryStore::new();
        let session = hr_session(&store, "acme", "basic").await;
        for i in 0..4 {
            employee(&store, &format!("e{}@acme.io", i), Some("acme")).await;
        }
        let fifth = employee(&store, "fifth@mail.io", None).await;
        let sixth = employee(&store, "sixth@mail.io", None).await;

        let added = add_employees(&store, &session, SeatPolicy::EmployeesOnly, &[fifth.id.clone()])
            .await
            .unwrap();
        assert_eq!(added[0].company(), Some("acme"));

        let err = add_employees(&store, &session, SeatPolicy::EmployeesOnly, &[sixth.id.clone()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SeatLimitExceeded { current: 5, .. }));
        assert_eq!(members(&store, "acme").await, 6);
    }

    #[tokio::test]
    async fn batch_add_up_to_the_limit_applies_every_write() {
        let store = InMemoryStore::new();
        let session = hr_session(&store, "acme", "basic").await;
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(employee(&store, &format!("c{}@mail.io", i), None).await.id);
        }
        // Duplicates count once.
        ids.push(ids[0].clone());

        let added = add_employees(&store, &session, SeatPolicy::OwnerOccupiesSeat, &ids)
            .await
            .unwrap();

        assert_eq!(added.len(), 4);
        assert_eq!(members(&store, "acme").await, 5);
        let stored = store.get_data_by_id(USERS, &ids[1]).await.unwrap().unwrap();
        assert_eq!(stored.field("company_logo"), &json!("https://img.example/logo.png"));
    }

    #[tokio::test]
    async fn affiliated_candidate_aborts_the_whole_batch() {
        let store = InMemoryStore::new();
        let session = hr_session(&store, "acme", "premium").await;
        let free = employee(&store, "free@mail.io", None).await;
        let taken = employee(&store, "taken@globex.io", Some("globex")).await;

        let err = add_employees(&store, &session, SeatPolicy::OwnerOccupiesSeat, &[free.id.clone(), taken.id])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::AlreadyAffiliated(email) if email == "taken@globex.io"));
        assert_eq!(members(&store, "acme").await, 1);
    }

    #[tokio::test]
    async fn only_hr_can_add_and_the_list_must_not_be_empty() {
        let store = InMemoryStore::new();
        let session = hr_session(&store, "acme", "standard").await;
        let worker = employee(&store, "w@acme.io", Some("acme")).await;

        let err = add_employees(&store, &session, SeatPolicy::default(), &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = add_employees(&store, &Session::new(worker), SeatPolicy::default(), &["x".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn remove_detaches_member_only() {
        let store = InMemoryStore::new();
        let session = hr_session(&store, "acme", "basic").await;
        let worker = employee(&store, "w@acme.io", Some("acme")).await;
        let outsider = employee(&store, "o@globex.io", Some("globex")).await;

        let removed = remove_employee(&store, &session, &worker.id).await.unwrap();
        assert_eq!(removed.company(), None);
        let stored = store.get_data_by_id(USERS, &worker.id).await.unwrap().unwrap();
        assert_eq!(stored.field("company_name"), &Value::Null);
        assert_eq!(stored.field("email"), &json!("w@acme.io"));

        assert!(matches!(
            remove_employee(&store, &session, &outsider.id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            remove_employee(&store, &session, &session.user.id).await,
            Err(DomainError::Validation(_))
        ));
    }
}
