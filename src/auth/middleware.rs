//! Authorization Gate
//! Mission: Protect API endpoints by validating the bearer access token

use crate::auth::jwt::{TokenKind, TokenSigner};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Middleware that validates the access token on protected routes.
///
/// A 401 from here tells the client to refresh via /auth/token and retry.
/// Only a 403 from the refresh route itself means "log in again".
pub async fn require_authorization(
    State(signer): State<Arc<TokenSigner>>,
    mut req: Request,
    next: Next,
) -> Result<Response, GateError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(GateError::MissingToken)?;

    let claims = signer
        .verify(TokenKind::Access, token)
        .map_err(|_| GateError::InvalidToken)?;

    // Hand the decoded subject to downstream handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Gate error types
#[derive(Debug)]
pub enum GateError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            GateError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authorization token"),
            GateError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };

        (status, message).into_response()
    }
}
