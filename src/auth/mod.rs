//! Authentication Module
//! Mission: Issue and verify the two token classes, guard the API, and track revoked refresh tokens

pub mod api;
pub mod blacklist;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use blacklist::RevocationStore;
pub use jwt::{TokenKeys, TokenKind, TokenSigner};
pub use middleware::require_authorization;
pub use user_store::UserStore;
