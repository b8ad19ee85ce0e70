//! Front-End Pages
//!
//! Markup is deliberately bare - the interesting part is the session
//! handoff around each handler, not the rendering.

use crate::web::authenticated::{force_logout, redirect_with_cookie, require_session};
use crate::web::WebState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

/// Build the front-end router
pub fn web_router(state: WebState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(login_submit))
        .route("/register", get(register_page).post(register_submit))
        .route("/logout", post(logout))
        .route("/jokes", get(jokes_index))
        .route("/jokes/new", get(new_joke_page).post(new_joke_submit))
        .route("/jokes/random", get(random_joke_page))
        .route("/jokes/:id", get(joke_page))
        .route("/jokes/:id/delete", post(delete_joke))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct JokeForm {
    pub name: String,
    pub content: String,
}

async fn home() -> Redirect {
    Redirect::to("/jokes")
}

async fn login_page() -> Html<String> {
    Html(credentials_form("Login", "/login", None))
}

async fn login_submit(
    State(state): State<WebState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.api.login(&form.username, &form.password).await {
        Ok(pair) => commit_and_redirect(&state, pair.access_token, pair.refresh_token),
        Err(err) => Html(credentials_form("Login", "/login", Some(&err.to_string())))
            .into_response(),
    }
}

async fn register_page() -> Html<String> {
    Html(credentials_form("Register", "/register", None))
}

async fn register_submit(
    State(state): State<WebState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.api.register(&form.username, &form.password).await {
        Ok(pair) => commit_and_redirect(&state, pair.access_token, pair.refresh_token),
        Err(err) => Html(credentials_form("Register", "/register", Some(&err.to_string())))
            .into_response(),
    }
}

/// Destroy the session and blacklist the refresh token at the API
async fn logout(State(state): State<WebState>, headers: HeaderMap) -> Response {
    if let Some(session) = state.sessions.read(&headers) {
        // Best effort: the cookie dies regardless of what the API says
        if let Err(err) = state.api.logout(&session.refresh_token).await {
            warn!("Logout call failed: {}", err);
        }
    }
    force_logout(&state)
}

async fn jokes_index(State(state): State<WebState>, headers: HeaderMap) -> Html<String> {
    let jokes = state.api.list_jokes().await.unwrap_or_default();
    let logged_in = state.sessions.read(&headers).is_some();

    let items: String = jokes
        .iter()
        .map(|j| format!(r#"<li><a href="/jokes/{}">{}</a></li>"#, j.id, escape(&j.name)))
        .collect();

    let nav = if logged_in {
        r#"<a href="/jokes/new">Add a joke</a> <form method="post" action="/logout"><button>Logout</button></form>"#
    } else {
        r#"<a href="/login">Login</a> <a href="/register">Register</a>"#
    };

    Html(format!(
        r#"<h1>Jokes</h1>{}<ul>{}</ul><a href="/jokes/random">Random joke</a>"#,
        nav, items
    ))
}

async fn random_joke_page(State(state): State<WebState>) -> Html<String> {
    match state.api.random_joke().await {
        Ok(Some(joke)) => Html(format!(
            r#"<h1>{}</h1><p>{}</p><a href="/jokes">Back</a>"#,
            escape(&joke.name),
            escape(&joke.content)
        )),
        _ => Html(r#"<p>No jokes yet.</p><a href="/jokes">Back</a>"#.to_string()),
    }
}

async fn joke_page(State(state): State<WebState>, Path(id): Path<Uuid>) -> Response {
    match state.api.get_joke(&id).await {
        Ok(Some(joke)) => Html(format!(
            r#"<h1>{}</h1><p>{}</p>
<form method="post" action="/jokes/{}/delete"><button>Delete</button></form>
<a href="/jokes">Back</a>"#,
            escape(&joke.name),
            escape(&joke.content),
            joke.id
        ))
        .into_response(),
        Ok(None) => (axum::http::StatusCode::NOT_FOUND, "Joke not found").into_response(),
        Err(err) => {
            warn!("Joke fetch failed: {}", err);
            Redirect::to("/jokes").into_response()
        }
    }
}

/// Protected page: runs behind the silent-refresh orchestrator
async fn new_joke_page(State(state): State<WebState>, headers: HeaderMap) -> Response {
    match require_session(&state, &headers, "/jokes/new").await {
        Ok(_session) => Html(
            r#"<h1>Add a joke</h1>
<form method="post" action="/jokes/new">
<input name="name" placeholder="Name"><br>
<textarea name="content" placeholder="Content"></textarea><br>
<button>Add</button>
</form>"#
                .to_string(),
        )
        .into_response(),
        Err(response) => response,
    }
}

async fn new_joke_submit(
    State(state): State<WebState>,
    headers: HeaderMap,
    Form(form): Form<JokeForm>,
) -> Response {
    let session = match require_session(&state, &headers, "/jokes/new").await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state
        .api
        .create_joke(&session.access_token, &form.name, &form.content)
        .await
    {
        Ok(joke) => Redirect::to(&format!("/jokes/{}", joke.id)).into_response(),
        Err(err) => Html(format!("<p>Error: {}</p>", escape(&err.to_string()))).into_response(),
    }
}

async fn delete_joke(
    State(state): State<WebState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Response {
    let session = match require_session(&state, &headers, "/jokes").await {
        Ok(session) => session,
        Err(response) => return response,
    };

    match state.api.delete_joke(&session.access_token, &id).await {
        Ok(()) => Redirect::to("/jokes").into_response(),
        Err(err) => Html(format!("<p>Error: {}</p>", escape(&err.to_string()))).into_response(),
    }
}

fn commit_and_redirect(state: &WebState, access_token: String, refresh_token: String) -> Response {
    let session = crate::web::SessionData {
        access_token,
        refresh_token,
    };
    match state.sessions.commit_cookie(&session) {
        Ok(cookie) => redirect_with_cookie("/jokes", &cookie),
        Err(err) => {
            warn!("Session commit failed: {}", err);
            force_logout(state)
        }
    }
}

fn credentials_form(title: &str, action: &str, error: Option<&str>) -> String {
    let error_line = error
        .map(|e| format!("<p>{}</p>", escape(e)))
        .unwrap_or_default();
    format!(
        r#"<h1>{}</h1>{}
<form method="post" action="{}">
<input name="username" placeholder="Username"><br>
<input name="password" type="password" placeholder="Password"><br>
<button>{}</button>
</form>"#,
        title, error_line, action, title
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
