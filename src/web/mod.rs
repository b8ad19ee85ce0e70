//! Front-End Service
//! Mission: Server-rendered pages carrying the token pair in an encrypted session cookie

pub mod authenticated;
pub mod client;
pub mod pages;
pub mod session;

pub use authenticated::{authenticate, AuthFlow};
pub use client::ApiClient;
pub use session::{SessionCodec, SessionData};

use crate::auth::TokenKeys;

/// Shared front-end state
#[derive(Clone)]
pub struct WebState {
    pub api: ApiClient,
    pub sessions: SessionCodec,
    /// Verifies access tokens locally, signed with the API's access secret
    pub access_keys: TokenKeys,
}
