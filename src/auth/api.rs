//! Authentication API Endpoints
//! Mission: Login, register, token refresh, and logout over the signer and blacklist

use crate::auth::{
    jwt::{TokenKind, TokenSigner, REFRESH_TOKEN_TTL_SECS},
    models::{CredentialsRequest, RefreshRequest, TokenPair},
    user_store::{CredentialCheck, UserStore},
    RevocationStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub signer: Arc<TokenSigner>,
    pub blacklist: RevocationStore,
}

fn issue_pair(signer: &TokenSigner, user_id: &str) -> Result<TokenPair, AuthApiError> {
    let access_token = signer
        .issue(TokenKind::Access, user_id)
        .map_err(|_| AuthApiError::TokenGeneration)?;
    let refresh_token = signer
        .issue(TokenKind::Refresh, user_id)
        .map_err(|_| AuthApiError::TokenGeneration)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<TokenPair>, AuthApiError> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AuthApiError::MissingCredentials);
    };

    let user = match state
        .user_store
        .verify_credentials(&username, &password)
        .map_err(|e| {
            error!("Credential lookup failed: {}", e);
            AuthApiError::Internal
        })? {
        CredentialCheck::Valid(user) => user,
        CredentialCheck::UnknownUser => {
            warn!("❌ Login attempt for unknown user: {}", username);
            return Err(AuthApiError::UnknownUser);
        }
        CredentialCheck::WrongPassword => {
            warn!("❌ Failed login attempt: {}", username);
            return Err(AuthApiError::WrongPassword);
        }
    };

    let user_id = user.id.to_string();
    let pair = issue_pair(&state.signer, &user_id)?;

    // A fresh login reinstates the subject's refresh capability
    state.blacklist.clear_revoked(&user_id).await.map_err(|e| {
        error!("Blacklist clear failed for {}: {}", user_id, e);
        AuthApiError::Internal
    })?;

    info!("🔐 Login successful: {}", user.username);

    Ok(Json(pair))
}

/// Register endpoint - POST /auth/register
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<TokenPair>, AuthApiError> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AuthApiError::MissingCredentials);
    };

    let existing = state.user_store.find_by_username(&username).map_err(|e| {
        error!("User lookup failed: {}", e);
        AuthApiError::Internal
    })?;
    if existing.is_some() {
        return Err(AuthApiError::UserExists);
    }

    let user = state
        .user_store
        .create_user(&username, &password)
        .map_err(|e| {
            error!("Failed to create user {}: {}", username, e);
            AuthApiError::RegistrationFailed
        })?;

    let pair = issue_pair(&state.signer, &user.id.to_string())?;

    Ok(Json(pair))
}

/// Token refresh endpoint - POST /auth/token
///
/// Returns a freshly signed access token alongside the unchanged refresh
/// token. Refresh tokens are not rotated.
pub async fn refresh(
    State(state): State<AuthState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthApiError> {
    let refresh_token = payload.refresh_token.ok_or(AuthApiError::MissingToken)?;

    let claims = state
        .signer
        .verify(TokenKind::Refresh, &refresh_token)
        .map_err(|e| AuthApiError::InvalidToken(e.to_string()))?;

    let revoked = state.blacklist.is_revoked(&claims.user_id).await.map_err(|e| {
        error!("Blacklist lookup failed for {}: {}", claims.user_id, e);
        AuthApiError::Internal
    })?;
    if revoked {
        return Err(AuthApiError::LoggedOut);
    }

    let access_token = state
        .signer
        .issue(TokenKind::Access, &claims.user_id)
        .map_err(|_| AuthApiError::TokenGeneration)?;

    Ok(Json(TokenPair {
        access_token,
        refresh_token,
    }))
}

/// Logout endpoint - DELETE /auth/logout
///
/// Blacklists the presented refresh token under its subject for the full
/// refresh lifetime. Access tokens cannot be revoked and simply expire.
pub async fn logout(
    State(state): State<AuthState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, AuthApiError> {
    let refresh_token = payload.refresh_token.ok_or(AuthApiError::MissingToken)?;

    let claims = state
        .signer
        .verify(TokenKind::Refresh, &refresh_token)
        .map_err(|e| AuthApiError::InvalidToken(e.to_string()))?;

    state
        .blacklist
        .mark_revoked(&claims.user_id, &refresh_token, REFRESH_TOKEN_TTL_SECS)
        .await
        .map_err(|e| {
            error!("Blacklist write failed for {}: {}", claims.user_id, e);
            AuthApiError::Internal
        })?;

    info!("👋 Logout: subject {}", claims.user_id);

    Ok(Json(json!({ "message": "Successfully logged out manually" })))
}

/// Protected ping - GET /auth/test
pub async fn auth_check() -> Json<serde_json::Value> {
    Json(json!({ "message": "Authorized" }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    MissingCredentials,
    UnknownUser,
    WrongPassword,
    UserExists,
    RegistrationFailed,
    MissingToken,
    InvalidToken(String),
    LoggedOut,
    TokenGeneration,
    Internal,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::MissingCredentials => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Username and password must be provided".to_string(),
            ),
            AuthApiError::UnknownUser => (
                StatusCode::FORBIDDEN,
                "Error: user doesn't exist".to_string(),
            ),
            AuthApiError::WrongPassword => (
                StatusCode::FORBIDDEN,
                "Error: incorrect password".to_string(),
            ),
            AuthApiError::UserExists => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "User already exists".to_string(),
            ),
            AuthApiError::RegistrationFailed => {
                (StatusCode::BAD_REQUEST, "Error creating user".to_string())
            }
            AuthApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Refresh token must be provided".to_string(),
            ),
            AuthApiError::InvalidToken(msg) => (StatusCode::FORBIDDEN, msg),
            AuthApiError::LoggedOut => (
                StatusCode::FORBIDDEN,
                "Error: please log in again".to_string(),
            ),
            AuthApiError::TokenGeneration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error: could not generate tokens".to_string(),
            ),
            AuthApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}
