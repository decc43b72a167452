/// Access token verification
///
/// Tokens are issued by the CrateDrop auth service; this side only checks
/// signature, expiry and issuer, and turns the claims into a `Principal`.
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use cratedrop_core::{Role, UserId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const TOKEN_ISSUER: &str = "cratedrop";

#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
    pub iss: String,
}

/// The verified caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify an access token and return the caller it names
    pub fn verify_access_token(&self, token: &str) -> Result<Principal> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.sub.is_empty() {
            return Err(ServerError::Auth("Token has no subject".to_string()));
        }
        Ok(Principal::new(UserId::new(claims.sub), claims.role))
    }

    /// Mint an access token in the issuer's format (tooling and tests)
    pub fn create_access_token(&self, principal: &Principal, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.user_id.as_str().to_string(),
            email: String::new(),
            role: principal.role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(ServerError::from)
    }
}
