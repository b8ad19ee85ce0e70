//! Users Module

pub mod api;

pub use api::UsersState;
