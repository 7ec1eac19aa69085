use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::{Modify, OpenApi};

/// JWT claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject - the principal's email address
    pub sub: String,
    /// Display name of the principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Profile photo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Expiration timestamp (UNIX TIME)
    pub exp: usize,
}

impl Claims {
    pub fn new(email: impl Into<String>, name: Option<String>, ttl_secs: i64) -> Self {
        Self {
            sub: email.into(),
            name,
            picture: None,
            exp: (chrono::Utc::now().timestamp() + ttl_secs).max(0) as usize,
        }
    }

    pub fn email(&self) -> &str {
        &self.sub
    }
}

/// Sign claims with the shared HS256 secret.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Registers the `bearerAuth` scheme the route docs reference.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.clone().unwrap_or(Components::default());

        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );

        openapi.components = Some(components);
    }
}

/// Root document: API info plus the bearer scheme every route relies on.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Manager API",
        description = "Employee asset requests, HR approvals and inventory"
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks")
    ),
    modifiers(&SecurityAddon)
)]
pub struct AuthDoc;
