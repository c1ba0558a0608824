// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users and their permissions.
//!
//! ```rust,ignore
//! async fn my_handler(Permissions(view): Permissions) -> impl IntoResponse {
//!     if view.can_create(FeatureArea::Creditors) { /* ... */ }
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, Validation};

use super::{claims::SessionClaims, AuthError, AuthenticatedUser, UserRole};
use crate::access::AccessView;
use crate::state::{AppState, AuthConfig};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor for authenticated users.
///
/// Validates the HS256 session token from the Authorization header.
///
/// ## Authentication Modes
///
/// - **Production** (`JWT_SECRET` set): signature, expiry and issuer are verified
/// - **Development** (`dev` feature, no secret): structure and expiry only
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if a layer already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_token(token, &state.auth_config)?;
        tracing::debug!(user_id = %user.user_id, role = ?user.role, "Authenticated request");

        Ok(Auth(user))
    }
}

/// Verify a session token and extract the user.
pub fn verify_token(token: &str, auth_config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    match auth_config.decoding_key {
        Some(ref key) => {
            let mut validation = Validation::new(Algorithm::HS256);
            validation.leeway = CLOCK_SKEW_LEEWAY;
            validation.validate_aud = false;
            if let Some(ref issuer) = auth_config.issuer {
                validation.set_issuer(&[issuer]);
            }

            let token_data = decode::<SessionClaims>(token, key, &validation)?;

            Ok(AuthenticatedUser::from_claims(token_data.claims))
        }
        None => verify_token_development(token),
    }
}

/// Development verification (no signature check).
///
/// WARNING: only compiled with the `dev` feature.
#[cfg(feature = "dev")]
fn verify_token_development(token: &str) -> Result<AuthenticatedUser, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<SessionClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;
    let claims = token_data.claims;

    let now = chrono::Utc::now().timestamp();
    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    Ok(AuthenticatedUser::from_claims(claims))
}

#[cfg(not(feature = "dev"))]
fn verify_token_development(_token: &str) -> Result<AuthenticatedUser, AuthError> {
    tracing::error!("Rejecting token: JWT_SECRET is not configured");
    Err(AuthError::NotConfigured)
}

/// Extractor that requires the superadmin role.
pub struct SuperAdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for SuperAdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_superadmin() {
            return Err(AuthError::RoleRequired {
                required: UserRole::SuperAdmin,
            });
        }

        Ok(SuperAdminOnly(user))
    }
}

/// The authenticated user's resolved permissions.
///
/// Rejects unauthenticated requests; an authenticated user whose plan/role
/// has no matrix row gets an empty (deny-all) view.
pub struct Permissions(pub AccessView);

impl FromRequestParts<AppState> for Permissions {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        Ok(Permissions(AccessView::for_user(&state.matrix, Some(&user))))
    }
}
