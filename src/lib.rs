//! Jokebox Library
//!
//! Exposes core modules for use by the service binaries and tests.
//! The API service lives in main.rs, the front end in bin/web.rs.

pub mod auth;
pub mod config;
pub mod jokes;
pub mod routes;
pub mod users;
pub mod web;
