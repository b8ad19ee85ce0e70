//! Silent-Refresh Orchestrator
//! Mission: Page handlers only ever run with a proven-valid access token in hand

use crate::web::{SessionData, WebState};
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

/// Outcome of the pre-handler authentication protocol.
///
/// Two paths lead somewhere: a locally-verified access token runs the
/// handler, and a successful remote refresh redirects back to the original
/// URL so the next pass verifies locally. Everything else - no cookie, no
/// refresh token, a revoked token, a network failure - collapses into
/// `LoggedOut` with no detail leaked to the browser.
#[derive(Debug)]
pub enum AuthFlow {
    /// Access token verified locally; proceed with the handler
    Authorized { session: SessionData },
    /// Access token was stale; the refreshed session must be committed and
    /// the original request replayed
    Refreshed {
        session: SessionData,
        redirect_to: String,
    },
    /// Terminate the session: destroy the cookie, redirect to login
    LoggedOut,
}

/// Run the silent-refresh protocol for one inbound page request.
///
/// The blacklist is never consulted here: a valid signature plus an
/// unexpired timestamp is all the success path needs, with no network call.
pub async fn authenticate(state: &WebState, headers: &HeaderMap, original_url: &str) -> AuthFlow {
    let Some(session) = state.sessions.read(headers) else {
        return AuthFlow::LoggedOut;
    };

    if state.access_keys.verify(&session.access_token).is_ok() {
        return AuthFlow::Authorized { session };
    }

    // Signatures never change before expiry, so an invalid token here means
    // an expired one. Renew it over the network with the carried refresh
    // token; the refresh token itself is not rotated.
    debug!("Access token expired, refreshing against the API");
    match state.api.refresh(&session.refresh_token).await {
        Ok(pair) => AuthFlow::Refreshed {
            session: SessionData {
                access_token: pair.access_token,
                refresh_token: session.refresh_token,
            },
            redirect_to: original_url.to_string(),
        },
        Err(err) => {
            warn!("Silent refresh failed: {}", err);
            AuthFlow::LoggedOut
        }
    }
}

/// Resolve the protocol for a page handler: either a session whose access
/// token is proven valid, or the response that ends this request.
pub async fn require_session(
    state: &WebState,
    headers: &HeaderMap,
    original_url: &str,
) -> Result<SessionData, Response> {
    match authenticate(state, headers, original_url).await {
        AuthFlow::Authorized { session } => Ok(session),
        AuthFlow::Refreshed {
            session,
            redirect_to,
        } => match state.sessions.commit_cookie(&session) {
            Ok(cookie) => Err(redirect_with_cookie(&redirect_to, &cookie)),
            Err(_) => Err(force_logout(state)),
        },
        AuthFlow::LoggedOut => Err(force_logout(state)),
    }
}

/// Destroy the session cookie and send the browser to the login surface
pub fn force_logout(state: &WebState) -> Response {
    redirect_with_cookie("/login", &state.sessions.destroy_cookie())
}

pub fn redirect_with_cookie(to: &str, cookie: &str) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}
