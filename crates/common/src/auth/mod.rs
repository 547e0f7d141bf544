//! Authentication and authorization utilities
//!
//! Provides:
//! - Password hashing and verification (argon2)
//! - JWT access/refresh token generation and validation
//! - Authenticated user extraction for handlers

use crate::errors::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated caller, available to handlers as an extractor
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID
    pub user_id: i32,

    /// Username at the time the token was issued
    pub username: String,
}

/// Kind of JWT issued by the service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Username
    pub username: String,

    /// Access or refresh
    pub token_type: TokenType,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Token ID
    pub jti: String,
}

impl JwtClaims {
    /// Parse the subject back into a user ID
    pub fn user_id(&self) -> Result<i32> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// Pair returned by a successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiration_secs: i64,
    refresh_expiration_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager with the given secret
    pub fn new(secret: &str, access_expiration_secs: u64, refresh_expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_expiration_secs: access_expiration_secs as i64,
            refresh_expiration_secs: refresh_expiration_secs as i64,
        }
    }

    /// Generate a token of the given type
    pub fn generate_token(
        &self,
        user_id: i32,
        username: &str,
        token_type: TokenType,
    ) -> Result<String> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_expiration_secs,
            TokenType::Refresh => self.refresh_expiration_secs,
        };
        let exp = now + Duration::seconds(lifetime);

        let claims = JwtClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal {
                message: format!("Failed to generate token: {}", e)
            })
    }

    /// Generate an access/refresh pair for a login
    pub fn generate_pair(&self, user_id: i32, username: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access: self.generate_token(user_id, username, TokenType::Access)?,
            refresh: self.generate_token(user_id, username, TokenType::Refresh)?,
        })
    }

    /// Validate and decode a JWT token of the expected type
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<JwtClaims> {
        let claims = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::ExpiredToken
                    }
                    _ => AppError::InvalidToken,
                }
            })?;

        if claims.token_type != expected {
            return Err(AppError::InvalidToken);
        }

        Ok(claims)
    }

    /// Exchange a refresh token for a new access token
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.validate_token(refresh_token, TokenType::Refresh)?;
        self.generate_token(claims.user_id()?, &claims.username, TokenType::Access)
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal {
            message: format!("Failed to hash password: {}", e),
        })
}

/// Verify a password against a stored argon2 hash
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Extract bearer token from Authorization header
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// Axum extractor for AuthUser
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication credentials were not provided".to_string(),
            })?;

        let token = extract_bearer(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Authorization header must use the Bearer scheme".to_string(),
        })?;

        let jwt = Arc::<JwtManager>::from_ref(state);
        let claims = jwt.validate_token(token, TokenType::Access)?;

        Ok(AuthUser {
            user_id: claims.user_id()?,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("abc.def"), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test_secret", 300, 3600);

        let token = manager.generate_token(42, "alice", TokenType::Access).unwrap();
        let claims = manager.validate_token(&token, TokenType::Access).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let manager = JwtManager::new("test_secret", 300, 3600);
        let pair = manager.generate_pair(1, "bob").unwrap();

        assert!(matches!(
            manager.validate_token(&pair.refresh, TokenType::Access),
            Err(AppError::InvalidToken)
        ));

        let access = manager.refresh_access(&pair.refresh).unwrap();
        let claims = manager.validate_token(&access, TokenType::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), 1);
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new("test_secret", 300, 3600);
        let past = Utc::now() - Duration::hours(2);
        let claims = JwtClaims {
            sub: "1".to_string(),
            username: "carol".to_string(),
            token_type: TokenType::Access,
            exp: past.timestamp(),
            iat: (past - Duration::minutes(5)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();

        assert!(matches!(
            manager.validate_token(&token, TokenType::Access),
            Err(AppError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret_a", 300, 3600);
        let verifier = JwtManager::new("secret_b", 300, 3600);
        let token = issuer.generate_token(1, "dave", TokenType::Access).unwrap();

        assert!(matches!(
            verifier.validate_token(&token, TokenType::Access),
            Err(AppError::InvalidToken)
        ));
    }
}
