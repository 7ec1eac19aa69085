use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use utoipa::OpenApi;

use crate::api::auth::Claims;
use crate::app_state::AppState;
use crate::db::models::user::{AddEmployees, NewUser, Package, Role, UpdateProfile, User};
use crate::db::store::USERS;
use crate::domain::{read_models, seats, users};
use crate::middleware::auth::Session;
use crate::utils::api_response::ApiResponse;

/// Signup runs behind the JWT layer only: the profile does not exist yet.
#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "Profile created", body = User),
        (status = 400, description = "Missing or invalid signup fields"),
        (status = 409, description = "Email already registered, or the company already has an HR account")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewUser>,
) -> Result<ApiResponse<User>, ApiResponse<()>> {
    let user = users::signup(state.store.as_ref(), &claims, payload, Utc::now()).await?;
    state.invalidate_profiles([user.email.as_str()]);

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Profile created successfully",
        user,
    ))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = User),
        (status = 403, description = "Profile not found")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_me(
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<User>, ApiResponse<()>> {
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Profile retrieved successfully",
        session.user,
    ))
}

#[utoipa::path(
    patch,
    path = "/users/me",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "No fields to update")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<UpdateProfile>,
) -> Result<ApiResponse<User>, ApiResponse<()>> {
    let user = users::update_profile(state.store.as_ref(), &session, payload).await?;
    state.invalidate_profiles([session.email()]);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Profile updated successfully",
        user,
    ))
}

/// Employees who can still be added to a company (HR only).
#[utoipa::path(
    get,
    path = "/users/unaffiliated",
    responses(
        (status = 200, description = "Unaffiliated employees", body = [User]),
        (status = 403, description = "Caller is not an HR manager")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_unaffiliated_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<Vec<User>>, ApiResponse<()>> {
    session.hr_company()?;
    let all: Vec<User> = read_models::load(state.store.as_ref(), USERS).await?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Unaffiliated users retrieved successfully",
        read_models::unaffiliated_users(&all),
    ))
}

#[utoipa::path(
    get,
    path = "/users/company",
    responses(
        (status = 200, description = "Members of the caller's company", body = [User]),
        (status = 403, description = "Caller is not affiliated")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn get_company_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<ApiResponse<Vec<User>>, ApiResponse<()>> {
    let company = session.company()?;
    let records = state
        .store
        .get_data_by_company(USERS, company)
        .await?;
    let members: Vec<User> = read_models::decoded(USERS, records);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Company members retrieved successfully",
        read_models::users_by_company(&members, company),
    ))
}

#[utoipa::path(
    post,
    path = "/users/company/employees",
    request_body = AddEmployees,
    responses(
        (status = 200, description = "Employees added", body = [User]),
        (status = 404, description = "User not found"),
        (status = 409, description = "Seat limit exceeded or user already affiliated")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn add_employees(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<AddEmployees>,
) -> Result<ApiResponse<Vec<User>>, ApiResponse<()>> {
    let added = seats::add_employees(
        state.store.as_ref(),
        &session,
        state.config.seat_policy,
        &payload.user_ids,
    )
    .await?;
    state.invalidate_profiles(added.iter().map(|user| user.email.as_str()));

    Ok(ApiResponse::success(
        StatusCode::OK,
        format!("{} employee(s) added to the team", added.len()),
        added,
    ))
}

#[utoipa::path(
    delete,
    path = "/users/company/employees/{user_id}",
    params(
        ("user_id" = String, Path, description = "Key of the user to remove")
    ),
    responses(
        (status = 200, description = "Employee removed from the company", body = User),
        (status = 403, description = "User is not a member of the caller's company"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn remove_employee(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<User>, ApiResponse<()>> {
    let user = seats::remove_employee(state.store.as_ref(), &session, &user_id).await?;
    state.invalidate_profiles([user.email.as_str()]);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Employee removed from the team",
        user,
    ))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        signup,
        get_me,
        update_me,
        get_unaffiliated_users,
        get_company_users,
        add_employees,
        remove_employee,
    ),
    components(
        schemas(User, NewUser, UpdateProfile, AddEmployees, Role, Package)
    ),
    tags(
        (name = "Users", description = "Profiles and company membership")
    )
)]
pub struct UserDoc;
