// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-flight session token refresh.
//!
//! Outbound calls to the FuelSync backend carry the session token. When a
//! call comes back 401 the token is refreshed, but only once: every caller
//! that saw the 401 while a refresh is outstanding waits for that refresh and
//! shares its outcome instead of starting another.
//!
//! Callers identify the token they used by its generation. A caller whose
//! generation is older than the current one knows someone already refreshed
//! and simply takes the result.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Errors from refreshing a session token.
///
/// Cloneable so one failed refresh can be reported to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no session token to refresh")]
    NoSession,

    #[error("token refresh request failed: {0}")]
    Http(String),

    #[error("token refresh rejected with HTTP {0}")]
    Status(u16),

    #[error("token refresh response carried no token")]
    MissingToken,
}

/// Something that can exchange a session token for a fresh one.
pub trait TokenSource: Send + Sync {
    fn refresh(&self, current: &str) -> impl Future<Output = Result<String, RefreshError>> + Send;
}

/// Token in use and the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub token: Option<String>,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    generation: u64,
    last_failure: Option<RefreshError>,
}

/// Holds the session token and refreshes it at most once at a time.
pub struct TokenRefresher<S> {
    source: S,
    state: Mutex<TokenState>,
}

impl<S: TokenSource> TokenRefresher<S> {
    pub fn new(source: S, token: Option<String>) -> Self {
        Self {
            source,
            state: Mutex::new(TokenState {
                token,
                ..TokenState::default()
            }),
        }
    }

    /// Current token and generation. Waits while a refresh is in flight.
    pub async fn snapshot(&self) -> TokenSnapshot {
        let state = self.state.lock().await;
        TokenSnapshot {
            token: state.token.clone(),
            generation: state.generation,
        }
    }

    /// Install a token obtained from a fresh login.
    pub async fn set_token(&self, token: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.token = Some(token.into());
        state.generation += 1;
        state.last_failure = None;
    }

    /// Drop the session token (logout).
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.token = None;
        state.generation += 1;
        state.last_failure = None;
    }

    /// Refresh after a 401 on a request sent with `observed_generation`'s token.
    ///
    /// The state lock is held for the whole refresh, so concurrent callers
    /// queue behind it and then find the generation already advanced.
    pub async fn refresh_after_unauthorized(
        &self,
        observed_generation: u64,
    ) -> Result<String, RefreshError> {
        let mut state = self.state.lock().await;

        if state.generation != observed_generation {
            tracing::debug!(
                observed_generation,
                generation = state.generation,
                "Token already refreshed, reusing outcome"
            );
            if let Some(err) = &state.last_failure {
                return Err(err.clone());
            }
            return state.token.clone().ok_or(RefreshError::NoSession);
        }

        let current = state.token.clone().ok_or(RefreshError::NoSession)?;
        let outcome = self.source.refresh(&current).await;
        state.generation += 1;

        match outcome {
            Ok(token) => {
                tracing::info!(generation = state.generation, "Session token refreshed");
                state.token = Some(token.clone());
                state.last_failure = None;
                Ok(token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Session token refresh failed, clearing session");
                state.token = None;
                state.last_failure = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Refresh response: either `{ "token": ... }` or `{ "data": { "token": ... } }`.
#[derive(Debug, Deserialize)]
struct RefreshEnvelope {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    data: Option<RefreshData>,
}

#[derive(Debug, Deserialize)]
struct RefreshData {
    #[serde(default)]
    token: Option<String>,
}

impl RefreshEnvelope {
    fn into_token(self) -> Option<String> {
        self.data.and_then(|d| d.token).or(self.token)
    }
}

/// Refreshes tokens through the backend's `POST auth/refresh` endpoint.
#[derive(Clone)]
pub struct HttpTokenSource {
    client: reqwest::Client,
    refresh_url: Url,
}

impl HttpTokenSource {
    /// `base_url` is the API root, e.g. `https://host/api/v1`.
    pub fn new(client: reqwest::Client, base_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            refresh_url: api_root(base_url).join("auth/refresh")?,
        })
    }

    pub fn refresh_url(&self) -> &Url {
        &self.refresh_url
    }
}

impl TokenSource for HttpTokenSource {
    async fn refresh(&self, current: &str) -> Result<String, RefreshError> {
        let response = self
            .client
            .post(self.refresh_url.clone())
            .bearer_auth(current)
            .send()
            .await
            .map_err(|e| RefreshError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RefreshError::Status(response.status().as_u16()));
        }

        let envelope: RefreshEnvelope = response
            .json()
            .await
            .map_err(|e| RefreshError::Http(e.to_string()))?;

        envelope.into_token().ok_or(RefreshError::MissingToken)
    }
}

/// `base` with a trailing slash, so relative joins append instead of replacing
/// the last path segment.
pub(crate) fn api_root(base: &Url) -> Url {
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root
}
