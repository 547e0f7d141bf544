//! Account handlers: registration, tokens and the current user

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::AppState;
use precis_common::{
    auth::{hash_password, verify_password, AuthUser, TokenPair},
    db::models::User,
    errors::{AppError, Result},
};

/// Request to register a new account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,

    pub password2: String,

    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

/// Public view of an account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

fn first_field_error(errors: &ValidationErrors) -> AppError {
    let field = errors.field_errors().keys().next().map(|f| f.to_string());
    AppError::Validation {
        message: errors.to_string(),
        field,
    }
}

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Blocking task failed: {}", e),
        })
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = payload?;
    request.validate().map_err(|e| first_field_error(&e))?;

    if !valid_username(&request.username) {
        return Err(AppError::Validation {
            message: "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".to_string(),
            field: Some("username".to_string()),
        });
    }

    if !request.email.is_empty() && !request.email.validate_email() {
        return Err(AppError::Validation {
            message: "Enter a valid email address.".to_string(),
            field: Some("email".to_string()),
        });
    }

    if request.password != request.password2 {
        return Err(AppError::Validation {
            message: "Passwords must match.".to_string(),
            field: Some("password".to_string()),
        });
    }

    let password = request.password;
    let hash = blocking(move || hash_password(&password)).await??;

    let user = state
        .repo
        .create_user(request.username, request.email, hash)
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for an access/refresh token pair
pub async fn token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenPair>> {
    let Json(request) = payload?;
    let user = state
        .repo
        .find_user_by_username(&request.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let password = request.password;
    let stored = user.password_hash.clone();
    let valid = blocking(move || verify_password(&password, &stored)).await?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    let pair = state.jwt.generate_pair(user.id, &user.username)?;
    Ok(Json(pair))
}

/// Issue a fresh access token from a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AccessResponse>> {
    let Json(request) = payload?;
    let access = state.jwt.refresh_access(&request.refresh)?;
    Ok(Json(AccessResponse { access }))
}

/// The authenticated account
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>> {
    let user = state
        .repo
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or(AppError::UserNotFound { id: auth.user_id })?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_username() {
        assert!(valid_username("alice.smith+test@example-1_2"));
        assert!(!valid_username("alice smith"));
        assert!(!valid_username("alice/smith"));
    }

    #[test]
    fn test_register_validation_field() {
        let request = RegisterRequest {
            username: String::new(),
            password: "pw".into(),
            password2: "pw".into(),
            email: String::new(),
        };
        let err = first_field_error(&request.validate().unwrap_err());
        assert!(matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "username"));
    }
}
