//! API Router Assembly
//!
//! Kept out of main.rs so integration tests can drive the real router.

use crate::auth::{self, AuthState, RevocationStore, TokenSigner, UserStore};
use crate::jokes::{self, JokeStore, JokesState};
use crate::users::{self, UsersState};
use axum::{
    extract::Path,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Build the API router over the shared stores and signer
pub fn api_router(
    user_store: Arc<UserStore>,
    joke_store: Arc<JokeStore>,
    signer: Arc<TokenSigner>,
    blacklist: RevocationStore,
) -> Router {
    let auth_state = AuthState {
        user_store: user_store.clone(),
        signer: signer.clone(),
        blacklist,
    };
    let jokes_state = JokesState { jokes: joke_store };
    let users_state = UsersState { user_store };

    let gate = middleware::from_fn_with_state(signer, auth::require_authorization);

    let auth_routes = Router::new()
        .route("/auth/login", post(auth::api::login))
        .route("/auth/register", post(auth::api::register))
        .route("/auth/token", post(auth::api::refresh))
        .route("/auth/logout", delete(auth::api::logout))
        .with_state(auth_state);

    let public_jokes = Router::new()
        .route("/jokes", get(jokes::api::list_jokes))
        .route("/jokes/random", get(jokes::api::random_joke))
        .route("/jokes/:id", get(jokes::api::get_joke))
        .with_state(jokes_state.clone());

    // Delete keeps the original trailing-slash path, which also keeps it
    // disjoint from the public GET /jokes/:id route
    let protected_jokes = Router::new()
        .route("/jokes/new", post(jokes::api::create_joke))
        .route("/jokes/:id/", delete(jokes::api::delete_joke))
        .with_state(jokes_state)
        .route_layer(gate.clone());

    let protected_users = Router::new()
        .route("/user", get(users::api::current_user))
        .route("/user/by-username/:username", get(users::api::user_by_username))
        .with_state(users_state)
        .route_layer(gate.clone());

    let protected_ping = Router::new()
        .route("/auth/test", get(auth::api::auth_check))
        .route_layer(gate);

    Router::new()
        .route("/", get(root))
        .route("/message/:name", get(greet))
        .merge(auth_routes)
        .merge(public_jokes)
        .merge(protected_jokes)
        .merge(protected_users)
        .merge(protected_ping)
}

/// Liveness probe
async fn root() -> &'static str {
    "OK"
}

async fn greet(Path(name): Path<String>) -> Json<serde_json::Value> {
    Json(json!({ "message": format!("Hi {}", name) }))
}
