//! Jokes Module
//! Mission: Store and serve the jokes themselves

pub mod api;
pub mod store;

pub use api::JokesState;
pub use store::{Joke, JokeListItem, JokeStore};
