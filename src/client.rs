// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound client for the FuelSync REST backend.
//!
//! Every request carries the session token and the tenant header. A 401 is
//! answered by one single-flight token refresh and one retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::auth::refresh::{api_root, HttpTokenSource, RefreshError, TokenRefresher, TokenSource};

/// Header carrying the caller's tenant.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Request timeout for backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Unwrap the backend's `{ success, data }` envelope when present.
pub fn extract_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub struct BackendClient<S = HttpTokenSource> {
    http: reqwest::Client,
    base: Url,
    tenant_id: Option<Uuid>,
    tokens: Arc<TokenRefresher<S>>,
}

impl BackendClient<HttpTokenSource> {
    /// Client refreshing tokens through the backend itself.
    pub fn connect(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base = Url::parse(base_url)?;
        let source = HttpTokenSource::new(http.clone(), &base)?;
        Ok(Self::new(http, &base, Arc::new(TokenRefresher::new(source, token))))
    }
}

impl<S: TokenSource> BackendClient<S> {
    pub fn new(http: reqwest::Client, base: &Url, tokens: Arc<TokenRefresher<S>>) -> Self {
        Self {
            http,
            base: api_root(base),
            tenant_id: None,
            tokens,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn tokens(&self) -> &Arc<TokenRefresher<S>> {
        &self.tokens
    }

    /// Call the backend's `health` endpoint.
    pub async fn health(&self) -> Result<(), ClientError> {
        self.get_json::<Value>("health").await.map(|_| ())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request_json(Method::GET, path, None).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, ClientError> {
        self.request_json(Method::POST, path, Some(body)).await
    }

    /// Send a request, refreshing the token and retrying once on 401.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let url = self.base.join(path.trim_start_matches('/'))?;

        let snapshot = self.tokens.snapshot().await;
        let response = self
            .send(method.clone(), &url, snapshot.token.as_deref(), body)
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(%url, "Backend returned 401, refreshing token");
            let token = self
                .tokens
                .refresh_after_unauthorized(snapshot.generation)
                .await?;
            self.send(method, &url, Some(&token), body).await?
        } else {
            response
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "Backend request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        Ok(serde_json::from_value(extract_data(body))?)
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method, url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(tenant_id) = self.tenant_id {
            request = request.header(TENANT_HEADER, tenant_id.to_string());
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}
