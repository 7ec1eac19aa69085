use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::sync::Cache; // ✅ High-performance TTL Cache
use serde_json::json;
use tracing::error;

use crate::api::auth::{decode_token, Claims};
use crate::app_state::AppState;
use crate::db::models::User;
use crate::db::store::{DocumentStore, USERS};
use crate::domain::error::{DomainError, DomainResult};
use crate::utils::api_response::ApiResponse;

/// ✅ **Session profile cache** (email -> User record)
pub type ProfileCache = Arc<Cache<String, User>>;

/// ✅ **Initialize the `moka` Cache**
pub fn create_profile_cache(ttl: Duration) -> ProfileCache {
    Arc::new(Cache::builder().time_to_live(ttl).max_capacity(10_000).build())
}

/// ✅ **JWT Middleware** (Handles Token Authentication)
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    // Step 1: Extract Authorization header
    let auth_header = req.headers().get("Authorization").ok_or_else(|| {
        error!("Missing Authorization header");
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Missing Authorization header", None).into_response()
    })?;

    // Step 2: Convert header to string
    let token_str = auth_header.to_str().map_err(|_| {
        error!("Invalid Authorization header format");
        ApiResponse::<()>::error(StatusCode::BAD_REQUEST, "Invalid Authorization header format", None).into_response()
    })?;

    // Step 3: Strip "Bearer " prefix
    let token = token_str.strip_prefix("Bearer ").ok_or_else(|| {
        error!("Invalid token format (missing 'Bearer ' prefix)");
        ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Invalid token format (missing 'Bearer ' prefix)",
            None,
        )
        .into_response()
    })?;

    // Step 4: Decode the JWT token
    let claims = decode_token(token, &state.config.jwt_secret).map_err(|e| {
        error!("JWT decoding failed: {:?}", e);
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Invalid token", Some(json!({ "error": e.to_string() })))
            .into_response()
    })?;

    // Step 5: Insert claims into request extensions
    tracing::debug!("JWT decoded for {}", claims.sub);
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// ✅ **Authenticated principal and its User record**
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn name(&self) -> &str {
        &self.user.name
    }

    pub fn is_hr(&self) -> bool {
        self.user.is_hr()
    }

    /// Company of the principal, or Forbidden when unaffiliated.
    pub fn company(&self) -> DomainResult<&str> {
        self.user
            .company()
            .ok_or_else(|| DomainError::forbidden("You are not affiliated with any company"))
    }

    /// Company of an HR principal, or Forbidden for everyone else.
    pub fn hr_company(&self) -> DomainResult<&str> {
        if !self.is_hr() {
            return Err(DomainError::forbidden("Only HR managers can perform this action"));
        }
        self.company()
    }
}

/// Look up a profile by email, going through the cache first.
pub async fn load_profile(
    store: &dyn DocumentStore,
    cache: &ProfileCache,
    email: &str,
) -> DomainResult<Option<User>> {
    if let Some(user) = cache.get(email) {
        return Ok(Some(user));
    }

    let Some(record) = store.get_data_by_email(USERS, email).await? else {
        return Ok(None);
    };
    let user: User = record.decode(USERS)?;
    cache.insert(email.to_string(), user.clone());
    Ok(Some(user))
}

/// ✅ **Session Middleware** (resolves the principal's profile, cached with `moka`)
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let claims = req.extensions().get::<Claims>().cloned().ok_or_else(|| {
        error!("Missing JWT claims in request");
        ApiResponse::<()>::error(StatusCode::UNAUTHORIZED, "Missing JWT claims in request", None).into_response()
    })?;

    let user = match load_profile(state.store.as_ref(), &state.profiles, claims.email()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err(ApiResponse::<()>::error(
                StatusCode::FORBIDDEN,
                "Profile not found. Complete signup first.",
                None,
            )
            .into_response())
        }
        Err(err) => return Err(ApiResponse::<()>::from(err).into_response()),
    };

    req.extensions_mut().insert(Session::new(user));
    Ok(next.run(req).await)
}
