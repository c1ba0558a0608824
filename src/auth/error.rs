// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Rendered through [`ApiError`], so a rejected token and a denied feature
//! share one body shape: `{ "error", "errorCode" }`.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use thiserror::Error;

use super::roles::UserRole;
use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingAuthHeader,

    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    #[error("Session token is malformed")]
    MalformedToken,

    #[error("Session token signature is invalid")]
    InvalidSignature,

    #[error("Session has expired")]
    TokenExpired,

    #[error("Session token was not issued by the FuelSync backend")]
    InvalidIssuer,

    #[error("Session token is not yet valid")]
    TokenNotYetValid,

    /// No JWT secret, and not a `dev` build
    #[error("Session verification is not configured")]
    NotConfigured,

    #[error("This operation requires the {required} role")]
    RoleRequired { required: UserRole },
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "session_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::NotConfigured => "auth_not_configured",
            AuthError::RoleRequired { .. } => "role_required",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::RoleRequired { .. } => StatusCode::FORBIDDEN,
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
            ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            _ => AuthError::MalformedToken,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status_code(), err.to_string()).with_code(err.error_code())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let challenge = self.status_code() == StatusCode::UNAUTHORIZED;
        let mut response = ApiError::from(self).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_auth_is_a_bearer_challenge() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");

        let body = body_of(response).await;
        assert_eq!(body["errorCode"], "missing_auth_header");
        assert_eq!(body["error"], "Authorization header is required");
    }

    #[tokio::test]
    async fn role_required_names_the_role() {
        let response = AuthError::RoleRequired {
            required: UserRole::SuperAdmin,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(WWW_AUTHENTICATE));

        let body = body_of(response).await;
        assert_eq!(body["errorCode"], "role_required");
        assert_eq!(body["error"], "This operation requires the superadmin role");
    }

    #[test]
    fn not_configured_is_a_server_error() {
        assert_eq!(
            AuthError::NotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn jwt_errors_map_to_session_failures() {
        assert_eq!(
            AuthError::from(JwtError::from(ErrorKind::ExpiredSignature)),
            AuthError::TokenExpired
        );
        assert_eq!(
            AuthError::from(JwtError::from(ErrorKind::InvalidIssuer)),
            AuthError::InvalidIssuer
        );
        assert_eq!(
            AuthError::from(JwtError::from(ErrorKind::InvalidToken)),
            AuthError::MalformedToken
        );
    }
}
