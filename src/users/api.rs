//! User API Endpoints
//!
//! Both routes sit behind the authorization gate. The current-user route
//! takes its subject identifier from the gate's decoded claims.

use crate::auth::models::Claims;
use crate::auth::UserStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Shared users state
#[derive(Clone)]
pub struct UsersState {
    pub user_store: Arc<UserStore>,
}

/// Current user - GET /user (protected)
pub async fn current_user(
    State(state): State<UsersState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, UserApiError> {
    let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| UserApiError::NotFound)?;

    let user = state
        .user_store
        .find_by_id(&user_id)?
        .ok_or(UserApiError::NotFound)?;

    Ok(Json(json!({ "user": user })))
}

/// Lookup by username - GET /user/by-username/:username (protected)
pub async fn user_by_username(
    State(state): State<UsersState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, UserApiError> {
    let user = state
        .user_store
        .find_by_username(&username)?
        .ok_or(UserApiError::NotFound)?;

    Ok(Json(json!({ "user": user })))
}

/// User API errors
#[derive(Debug)]
pub enum UserApiError {
    Storage(anyhow::Error),
    NotFound,
}

impl From<anyhow::Error> for UserApiError {
    fn from(err: anyhow::Error) -> Self {
        UserApiError::Storage(err)
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            UserApiError::Storage(err) => {
                error!("User storage error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            UserApiError::NotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}
