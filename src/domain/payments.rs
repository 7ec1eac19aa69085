use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use super::error::{DomainError, DomainResult};
use super::seats::{check_seat_capacity, count_occupied_seats, SeatPolicy};
use crate::db::models::{NewPayment, Payment, User};
use crate::db::store::{
    decode_all, fields_of, new_id, to_fields, Batch, DocumentStore, StoreError, PAYMENTS, USERS,
};
use crate::middleware::auth::Session;

/// Record a charge the payment provider confirmed and activate its package.
///
/// Used both for the first purchase and for raising the seat limit. A package
/// never replaces a larger one, and a transaction is recorded once.
pub async fn record_payment(
    store: &dyn DocumentStore,
    session: &Session,
    policy: SeatPolicy,
    payload: NewPayment,
    now: DateTime<Utc>,
) -> DomainResult<Payment> {
    if !session.is_hr() {
        return Err(DomainError::forbidden("Only HR managers can buy packages"));
    }
    let transaction_id = payload.transaction_id.trim();
    if transaction_id.is_empty() {
        return Err(DomainError::validation("transaction_id is required"));
    }
    let seen = store
        .get_data_by_field(PAYMENTS, "transaction_id", &json!(transaction_id))
        .await?;
    if !seen.is_empty() {
        return Err(DomainError::DuplicateTransaction(transaction_id.to_string()));
    }

    let members: Vec<User> = match session.user.company() {
        Some(company) => decode_all(USERS, &store.get_data_by_company(USERS, company).await?),
        None => Vec::new(),
    };
    // The cached session may predate another payment.
    let owner = members
        .iter()
        .find(|user| user.id == session.user.id)
        .unwrap_or(&session.user);
    if let Some(current) = owner.packages {
        if payload.package.seat_limit() < current.seat_limit() {
            return Err(DomainError::PackageDowngrade {
                current,
                requested: payload.package,
            });
        }
    }
    if let Some(company) = owner.company() {
        let occupied = count_occupied_seats(policy, company, &members);
        check_seat_capacity(payload.package.seat_limit(), occupied, 0)?;
    }

    let payment = Payment {
        id: new_id(),
        hr_email: session.email().to_string(),
        price: payload.package.price(),
        transaction_id: transaction_id.to_string(),
        company_name: owner.company_name.clone(),
        package: payload.package,
        date: now,
        payment_status: true,
    };

    let batch = Batch::new()
        .require(USERS, &owner.id, "packages", json!(owner.packages))
        .set(PAYMENTS, &payment.id, to_fields(&payment)?)
        .update(
            USERS,
            &owner.id,
            fields_of(json!({ "packages": payment.package, "payment_status": true })),
        );
    store.commit(batch).await.map_err(|err| match err {
        StoreError::Conflict { .. } => {
            DomainError::Conflict("The package changed concurrently, try again".to_string())
        }
        other => other.into(),
    })?;

    info!(
        "{} paid {} for {:?} ({})",
        payment.hr_email, payment.price, payment.package, payment.transaction_id
    );
    Ok(payment)
}
