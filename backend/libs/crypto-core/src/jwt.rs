//! Shared JWT module for LandSure services
//!
//! Tokens are HS256-signed with two independent secrets: one for access
//! tokens presented as `Authorization: Bearer` headers, one for refresh
//! tokens carried in the `jwt` cookie. A refresh token can never be used as
//! an access token because it is signed with a different key and carries a
//! different `token_type`.
//!
//! ## Usage
//!
//! ```rust
//! use crypto_core::jwt::JwtKeys;
//! use uuid::Uuid;
//!
//! let keys = JwtKeys::new("access-secret", "refresh-secret").unwrap();
//! let token = keys.generate_access_token(Uuid::new_v4()).unwrap();
//! assert!(keys.validate_access_token(&token).is_ok());
//! ```

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Lifetime of tokens issued at register/login.
pub const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 12;
/// Lifetime of access tokens minted from a refresh cookie.
pub const REFRESHED_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 10;
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

// ============================================================================
// Data Structures
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

impl Claims {
    fn new(user_id: Uuid, token_type: &str, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            token_type: token_type.to_string(),
        }
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

// ============================================================================
// Key Storage
// ============================================================================

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signing and verification keys for access and refresh tokens.
///
/// Built once at startup and shared behind `Arc`/`web::Data`.
pub struct JwtKeys {
    access: KeyPair,
    refresh: KeyPair,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

impl JwtKeys {
    /// Build keys from the two HMAC secrets.
    ///
    /// ## Errors
    ///
    /// Returns error if either secret is empty or both secrets are equal.
    pub fn new(access_secret: &str, refresh_secret: &str) -> Result<Self> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(anyhow!("JWT secrets must not be empty"));
        }
        if access_secret == refresh_secret {
            return Err(anyhow!("Access and refresh secrets must differ"));
        }

        Ok(Self {
            access: KeyPair::from_secret(access_secret),
            refresh: KeyPair::from_secret(refresh_secret),
        })
    }

    // ========================================================================
    // Token Generation
    // ========================================================================

    /// Generate an access token valid for [`ACCESS_TOKEN_EXPIRY_HOURS`].
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        self.sign_access(user_id, Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS))
    }

    /// Generate the short-lived access token handed out by the refresh endpoint.
    pub fn generate_refreshed_access_token(&self, user_id: Uuid) -> Result<String> {
        self.sign_access(
            user_id,
            Duration::minutes(REFRESHED_ACCESS_TOKEN_EXPIRY_MINUTES),
        )
    }

    /// Generate a refresh token valid for [`REFRESH_TOKEN_EXPIRY_DAYS`].
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        let claims = Claims::new(user_id, REFRESH, Duration::days(REFRESH_TOKEN_EXPIRY_DAYS));
        encode(&Header::new(JWT_ALGORITHM), &claims, &self.refresh.encoding)
            .map_err(|e| anyhow!("Failed to generate refresh token: {e}"))
    }

    fn sign_access(&self, user_id: Uuid, lifetime: Duration) -> Result<String> {
        let claims = Claims::new(user_id, ACCESS, lifetime);
        encode(&Header::new(JWT_ALGORITHM), &claims, &self.access.encoding)
            .map_err(|e| anyhow!("Failed to generate access token: {e}"))
    }

    // ========================================================================
    // Token Validation
    // ========================================================================

    /// Validate an access token (signature, expiry, token type).
    pub fn validate_access_token(&self, token: &str) -> Result<TokenData<Claims>> {
        validate_with(token, &self.access.decoding, ACCESS)
    }

    /// Validate a refresh token (signature, expiry, token type).
    pub fn validate_refresh_token(&self, token: &str) -> Result<TokenData<Claims>> {
        validate_with(token, &self.refresh.decoding, REFRESH)
    }

    /// Extract the user ID from a validated access token
    pub fn user_id_from_access_token(&self, token: &str) -> Result<Uuid> {
        self.validate_access_token(token)?.claims.user_id()
    }
}

fn validate_with(token: &str, key: &DecodingKey, expected_type: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, key, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))?;

    if data.claims.token_type != expected_type {
        return Err(anyhow!(
            "Unexpected token type: expected {expected_type}, got {}",
            data.claims.token_type
        ));
    }

    Ok(data)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> JwtKeys {
        JwtKeys::new("test-access-secret", "test-refresh-secret")
            .expect("Failed to build test keys")
    }

    #[test]
    fn test_generate_access_token() {
        let keys = test_keys();
        let token = keys.generate_access_token(Uuid::new_v4());

        assert!(token.is_ok());
        assert_eq!(token.unwrap().matches('.').count(), 2); // JWT has 3 parts
    }

    #[test]
    fn test_validate_valid_token() {
        let keys = test_keys();
        let user_id = Uuid::new_v4();
        let token = keys
            .generate_access_token(user_id)
            .expect("Failed to generate token");

        let token_data = keys.validate_access_token(&token).unwrap();
        assert_eq!(token_data.claims.sub, user_id.to_string());
        assert_eq!(token_data.claims.token_type, "access");
    }

    #[test]
    fn test_validate_invalid_token() {
        let keys = test_keys();
        assert!(keys.validate_access_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_validate_token_signed_with_other_secret() {
        let keys = test_keys();
        let other = JwtKeys::new("another-access", "another-refresh").unwrap();
        let token = other.generate_access_token(Uuid::new_v4()).unwrap();

        assert!(keys.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let keys = test_keys();
        let refresh = keys.generate_refresh_token(Uuid::new_v4()).unwrap();

        assert!(keys.validate_access_token(&refresh).is_err());
        assert!(keys.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_extract_user_id() {
        let keys = test_keys();
        let user_id = Uuid::new_v4();
        let token = keys.generate_access_token(user_id).unwrap();

        assert_eq!(keys.user_id_from_access_token(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expiry_ordering() {
        let keys = test_keys();
        let user_id = Uuid::new_v4();

        let short = keys.generate_refreshed_access_token(user_id).unwrap();
        let access = keys.generate_access_token(user_id).unwrap();
        let refresh = keys.generate_refresh_token(user_id).unwrap();

        let short_exp = keys.validate_access_token(&short).unwrap().claims.exp;
        let access_exp = keys.validate_access_token(&access).unwrap().claims.exp;
        let refresh_exp = keys.validate_refresh_token(&refresh).unwrap().claims.exp;

        assert!(short_exp < access_exp);
        assert!(access_exp < refresh_exp);
    }

    #[test]
    fn test_rejects_bad_secrets() {
        assert!(JwtKeys::new("", "refresh").is_err());
        assert!(JwtKeys::new("same", "same").is_err());
    }
}
