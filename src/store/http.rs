//! REST key-value store backend (Upstash-style command paths).

use super::{Store, StoreError};
use async_trait::async_trait;
use serde::Deserialize;

/// Client for a Redis-compatible REST endpoint: commands are path segments
/// (`/get/<key>`, `/set/<key>`), auth is a bearer token, and every response
/// wraps its payload in a `result` field.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct RestResponse<T> {
    result: T,
}

impl HttpStore {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn command(&self, path: &str, body: Option<String>) -> Result<reqwest::Response, StoreError> {
        let url = format!("{}/{}", self.base_url, path);
        let request = match body {
            Some(body) => self.client.post(&url).body(body),
            None => self.client.get(&url),
        };
        let response = request.bearer_auth(&self.token).send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Backend {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let response = self.command(&format!("get/{key}"), None).await?;
        let payload: RestResponse<Option<String>> = response.json().await?;
        Ok(payload.result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.command(&format!("set/{key}"), Some(value.to_string()))
            .await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let response = self.command(&format!("exists/{key}"), None).await?;
        let payload: RestResponse<u64> = response.json().await?;
        Ok(payload.result == 1)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.command(&format!("del/{key}"), None).await?;
        Ok(())
    }
}
