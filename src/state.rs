// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use crate::access::AccessMatrix;
use crate::client::BackendClient;

/// Token verification settings.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// HS256 key; `None` means tokens cannot be verified
    pub decoding_key: Option<DecodingKey>,
    /// Expected issuer (optional)
    pub issuer: Option<String>,
}

impl AuthConfig {
    pub fn with_secret(secret: &str) -> Self {
        Self {
            decoding_key: Some(DecodingKey::from_secret(secret.as_bytes())),
            issuer: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }
}

#[derive(Clone)]
pub struct AppState {
    pub matrix: Arc<AccessMatrix>,
    pub auth_config: AuthConfig,
    /// FuelSync backend; readiness is checked against it when set
    pub backend: Option<Arc<BackendClient>>,
}

impl AppState {
    pub fn new(matrix: AccessMatrix) -> Self {
        Self {
            matrix: Arc::new(matrix),
            auth_config: AuthConfig::default(),
            backend: None,
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    pub fn with_backend(mut self, backend: BackendClient) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AccessMatrix::builtin())
    }
}
