//! # Items Client SDK
//!
//! A typed Rust client for the Items API.

use items_types::{Item, ItemId, ItemParams, MessageResponse, TokenResponse};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Items API client.
pub struct ItemsClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl ItemsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Exchanges credentials for a token and keeps it for later calls.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ClientError> {
        let req = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)]);
        let token: TokenResponse = self.send(req).await?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }

    /// Creates a new item.
    pub async fn create_item(&self, name: &str, description: &str) -> Result<Item, ClientError> {
        let req = self
            .http
            .post(self.url("/items/"))
            .json(&ItemParams::new(name, description));
        self.send(self.authorize(req)).await
    }

    /// Lists all items.
    pub async fn list_items(&self) -> Result<Vec<Item>, ClientError> {
        let req = self.http.get(self.url("/items/"));
        self.send(self.authorize(req)).await
    }

    /// Gets an item by ID.
    pub async fn get_item(&self, id: ItemId) -> Result<Item, ClientError> {
        let req = self.http.get(self.url(&format!("/items/{}", id)));
        self.send(self.authorize(req)).await
    }

    /// Replaces an item's name and description.
    pub async fn update_item(
        &self,
        id: ItemId,
        name: &str,
        description: &str,
    ) -> Result<Item, ClientError> {
        let req = self
            .http
            .put(self.url(&format!("/items/{}", id)))
            .json(&ItemParams::new(name, description));
        self.send(self.authorize(req)).await
    }

    /// Deletes an item.
    pub async fn delete_item(&self, id: ItemId) -> Result<MessageResponse, ClientError> {
        let req = self.http.delete(self.url(&format!("/items/{}", id)));
        self.send(self.authorize(req)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
