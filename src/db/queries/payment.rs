use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::db::models::payment::{NewPayment, Payment};
use crate::domain::payments;
use crate::middleware::auth::Session;
use crate::utils::api_response::ApiResponse;

/// Record a payment the provider already confirmed and activate the package.
#[utoipa::path(
    post,
    path = "/payments",
    request_body = NewPayment,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 400, description = "Missing transaction id"),
        (status = 403, description = "Caller is not an HR manager"),
        (status = 409, description = "Transaction already recorded, or the package is smaller than the current one or the headcount")
    ),
    tag = "Payments",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<NewPayment>,
) -> Result<ApiResponse<Payment>, ApiResponse<()>> {
    let payment = payments::record_payment(
        state.store.as_ref(),
        &session,
        state.config.seat_policy,
        payload,
        Utc::now(),
    )
    .await?;
    state.invalidate_profiles([session.email()]);

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Payment recorded successfully",
        payment,
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(create_payment),
    components(
        schemas(Payment, NewPayment)
    ),
    tags(
        (name = "Payments", description = "Package purchases")
    )
)]
pub struct PaymentDoc;
