use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{RoleType, TokenResponse},
};

/// Allow-list for back-of-house operations.
pub const STAFF: &[RoleType] = &[RoleType::Admin, RoleType::Employee];
pub const ADMIN_ONLY: &[RoleType] = &[RoleType::Admin];

const TOKEN_TYPE: &str = "bearer";

/// Claims
///
/// The payload signed into every access token issued by `/users/login` and
/// `/users/signup`. The `roles` claim carries role types as plain strings so
/// tokens stay readable by other services.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the authenticated user (`users.id`).
    pub user_id: i64,
    /// Role types held by the user when the token was issued.
    pub roles: Vec<String>,
    /// Always "bearer".
    pub token_type: String,
    /// Expiration Time: the token is rejected once this timestamp has passed.
    pub exp: usize,
    /// Issued At.
    pub iat: usize,
    /// Unique token id, useful for correlating log lines.
    pub jti: Uuid,
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers use it to enforce
/// their role allow-list and owner checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub roles: Vec<RoleType>,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.user_id,
            // Unknown role strings grant nothing.
            roles: claims.roles.iter().filter_map(|r| r.parse().ok()).collect(),
        }
    }

    pub fn has_any_role(&self, allowed: &[RoleType]) -> bool {
        roles_permitted(&self.roles, allowed)
    }

    /// Fails with 403 unless the caller holds at least one role of `allowed`.
    pub fn require_any(&self, allowed: &[RoleType]) -> Result<(), AppError> {
        if self.has_any_role(allowed) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.id, roles = ?self.roles, "role check denied");
            Err(AppError::Forbidden(
                "You do not have permission to access this resource.".to_string(),
            ))
        }
    }

    /// Owner access: passes when the caller is `user_id` or holds a role of `allowed`.
    pub fn require_self_or_any(&self, user_id: i64, allowed: &[RoleType]) -> Result<(), AppError> {
        if self.id == user_id {
            return Ok(());
        }
        self.require_any(allowed)
    }
}

/// Set intersection between the claimed roles and an operation's allow-list.
pub fn roles_permitted(claimed: &[RoleType], allowed: &[RoleType]) -> bool {
    let claimed: HashSet<&RoleType> = claimed.iter().collect();
    allowed.iter().any(|role| claimed.contains(role))
}

/// issue_token
///
/// Signs a fresh access token for `user_id`. Expiry is `token_ttl_minutes` from now
/// and the algorithm is the configured HMAC variant.
pub fn issue_token(
    config: &AppConfig,
    user_id: i64,
    roles: &[RoleType],
) -> Result<TokenResponse, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::minutes(config.token_ttl_minutes);

    let claims = Claims {
        user_id,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        token_type: TOKEN_TYPE.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4(),
    };

    let token = encode(
        &Header::new(config.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;

    tracing::debug!(user_id, jti = %claims.jti, "access token issued");

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE.to_string(),
    })
}

/// decode_token
///
/// Verifies signature, algorithm and expiry. Every failure is an authentication
/// error (401); the detail only distinguishes expiry.
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token has expired.".to_string())
            }
            _ => {
                tracing::debug!(error = %e, "token rejected");
                AppError::Unauthorized("Invalid token.".to_string())
            }
        }
    })?;

    if token_data.claims.token_type != TOKEN_TYPE {
        return Err(AppError::Unauthorized("Invalid token type.".to_string()));
    }

    Ok(token_data.claims)
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument and as the argument of the
/// authentication middleware. The process is:
/// 1. Dependency Resolution: pull `AppConfig` (secret, algorithm) from the state.
/// 2. Token Extraction: `Authorization: Bearer <token>`.
/// 3. Token Validation: signature and expiry through `decode_token`.
/// 4. Claim Extraction: user id and role types.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Not authenticated.".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid authentication scheme.".to_string()))?;

        let claims = decode_token(&config, token)?;

        Ok(AuthUser::from_claims(&claims))
    }
}

// --- Password Hashing (Argon2) ---

/// Hashes a password with Argon2 and a random 16-byte salt (PHC string output).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("failed to encode salt: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

/// Checks `password` against a stored PHC hash using Argon2's own verifier.
/// A malformed stored hash never verifies.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}
