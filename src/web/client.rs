//! API Client
//! Mission: Typed access to the jokebox API from the front end

use crate::auth::models::{TokenPair, User};
use crate::jokes::{Joke, JokeListItem};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// HTTP client for the API service.
///
/// Calls carry no retry or timeout layer: a network failure surfaces as a
/// plain error and the caller decides what a failed call means.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JokeListBody {
    joke_list_items: Vec<JokeListItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomJokeBody {
    random_joke: Option<Joke>,
}

#[derive(Deserialize)]
struct JokeBody {
    joke: Option<Joke>,
}

#[derive(Deserialize)]
struct UserBody {
    user: User,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Pull the server's error message out of a failed response
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<MessageBody>().await {
            Ok(body) => body.message.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Login request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        response.json().await.context("Malformed login response")
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<TokenPair> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Register request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        response.json().await.context("Malformed register response")
    }

    /// Exchange a refresh token for a fresh access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let response = self
            .http
            .post(self.url("/auth/token"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .context("Refresh request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        response.json().await.context("Malformed refresh response")
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url("/auth/logout"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .context("Logout request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        Ok(())
    }

    pub async fn list_jokes(&self) -> Result<Vec<JokeListItem>> {
        let body: JokeListBody = self
            .http
            .get(self.url("/jokes"))
            .send()
            .await?
            .json()
            .await
            .context("Malformed joke list response")?;

        Ok(body.joke_list_items)
    }

    pub async fn random_joke(&self) -> Result<Option<Joke>> {
        let body: RandomJokeBody = self
            .http
            .get(self.url("/jokes/random"))
            .send()
            .await?
            .json()
            .await
            .context("Malformed random joke response")?;

        Ok(body.random_joke)
    }

    pub async fn get_joke(&self, id: &Uuid) -> Result<Option<Joke>> {
        let body: JokeBody = self
            .http
            .get(self.url(&format!("/jokes/{}", id)))
            .send()
            .await?
            .json()
            .await
            .context("Malformed joke response")?;

        Ok(body.joke)
    }

    pub async fn create_joke(
        &self,
        access_token: &str,
        name: &str,
        content: &str,
    ) -> Result<Joke> {
        let response = self
            .http
            .post(self.url("/jokes/new"))
            .bearer_auth(access_token)
            .json(&json!({ "name": name, "content": content }))
            .send()
            .await
            .context("Create joke request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        let body: JokeBody = response.json().await.context("Malformed joke response")?;
        body.joke.context("No joke returned from server")
    }

    pub async fn delete_joke(&self, access_token: &str, id: &Uuid) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/jokes/{}/", id)))
            .bearer_auth(access_token)
            .send()
            .await
            .context("Delete joke request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        Ok(())
    }

    /// The logged-in user, from the subject id inside the access token
    pub async fn current_user(&self, access_token: &str) -> Result<User> {
        let response = self
            .http
            .get(self.url("/user"))
            .bearer_auth(access_token)
            .send()
            .await
            .context("User request failed")?;

        if !response.status().is_success() {
            bail!(Self::error_message(response).await);
        }

        let body: UserBody = response.json().await.context("Malformed user response")?;
        Ok(body.user)
    }
}
