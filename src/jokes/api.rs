//! Joke API Endpoints
//!
//! Reads are public; create and delete sit behind the authorization gate,
//! which hands the subject's claims down through request extensions.

use crate::auth::models::Claims;
use crate::jokes::store::JokeStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Shared jokes state
#[derive(Clone)]
pub struct JokesState {
    pub jokes: Arc<JokeStore>,
}

/// Latest five jokes - GET /jokes
pub async fn list_jokes(
    State(state): State<JokesState>,
) -> Result<Json<serde_json::Value>, JokeApiError> {
    let joke_list_items = state.jokes.list_latest(5)?;
    Ok(Json(json!({ "jokeListItems": joke_list_items })))
}

/// Random joke - GET /jokes/random
pub async fn random_joke(
    State(state): State<JokesState>,
) -> Result<Json<serde_json::Value>, JokeApiError> {
    let random_joke = state.jokes.random()?;
    Ok(Json(json!({ "randomJoke": random_joke })))
}

/// Single joke - GET /jokes/:id
pub async fn get_joke(
    State(state): State<JokesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JokeApiError> {
    let joke = state.jokes.get(&id)?;
    Ok(Json(json!({ "joke": joke })))
}

#[derive(Debug, Deserialize)]
pub struct NewJokeRequest {
    pub name: String,
    pub content: String,
}

/// Create joke - POST /jokes/new (protected)
pub async fn create_joke(
    State(state): State<JokesState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewJokeRequest>,
) -> Result<Json<serde_json::Value>, JokeApiError> {
    let jokester_id =
        Uuid::parse_str(&claims.user_id).map_err(|_| JokeApiError::CreateFailed)?;

    let joke = state
        .jokes
        .create(&payload.name, &payload.content, &jokester_id)
        .map_err(|e| {
            error!("Failed to create joke: {}", e);
            JokeApiError::CreateFailed
        })?;

    Ok(Json(json!({ "joke": joke })))
}

/// Delete joke - DELETE /jokes/:id/ (protected, owner only)
pub async fn delete_joke(
    State(state): State<JokesState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JokeApiError> {
    let joke = state
        .jokes
        .get(&id)?
        .ok_or(JokeApiError::NotFound)?;

    if joke.jokester_id.to_string() != claims.user_id {
        return Err(JokeApiError::NotOwner);
    }

    state.jokes.delete(&id).map_err(|e| {
        error!("Failed to delete joke {}: {}", id, e);
        JokeApiError::DeleteFailed
    })?;

    Ok(Json(json!({ "joke": joke })))
}

/// Joke API errors
#[derive(Debug)]
pub enum JokeApiError {
    Storage(anyhow::Error),
    NotFound,
    NotOwner,
    CreateFailed,
    DeleteFailed,
}

impl From<anyhow::Error> for JokeApiError {
    fn from(err: anyhow::Error) -> Self {
        JokeApiError::Storage(err)
    }
}

impl IntoResponse for JokeApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            JokeApiError::Storage(err) => {
                error!("Joke storage error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            JokeApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "Can't delete what does not exist".to_string(),
            ),
            JokeApiError::NotOwner => (
                StatusCode::UNAUTHORIZED,
                "Pssh, nice try. That's not your joke".to_string(),
            ),
            JokeApiError::CreateFailed => {
                (StatusCode::BAD_REQUEST, "Error creating joke".to_string())
            }
            JokeApiError::DeleteFailed => {
                (StatusCode::BAD_REQUEST, "Error deleting joke".to_string())
            }
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}
