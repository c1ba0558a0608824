// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::UserRole;

/// Claims carried by a FuelSync session token.
///
/// The backend signs `userId`, `tenantId` and `role`; `planName` is present
/// when the session was issued for a tenant with an active subscription.
/// Superadmin tokens carry no tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// User ID (`userId`, or the standard `sub` claim)
    #[serde(alias = "sub")]
    pub user_id: String,

    /// Tenant the user belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,

    /// Role name as issued; parsed leniently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Subscription plan name ("Regular", "Premium", "Enterprise")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issuer (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Authenticated user information extracted from the session token.
///
/// This is the primary type used throughout the application to represent
/// the user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,

    /// `None` when the token carried no role or one this service does not know
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from session claims.
    ///
    /// An unknown role name is dropped (and logged); such a user resolves to
    /// no permissions at all.
    pub fn from_claims(claims: SessionClaims) -> Self {
        let role = claims.role.as_deref().and_then(|name| {
            let role = UserRole::from_str(name);
            if role.is_none() {
                tracing::warn!(role = name, user_id = %claims.user_id, "Unknown role in token");
            }
            role
        });

        Self {
            user_id: claims.user_id,
            tenant_id: claims.tenant_id,
            role,
            plan_name: claims.plan_name,
            expires_at: claims.exp,
        }
    }

    pub fn is_superadmin(&self) -> bool {
        self.role.is_some_and(|role| role.is_superadmin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> SessionClaims {
        SessionClaims {
            user_id: "user_123".to_string(),
            tenant_id: Some(Uuid::nil()),
            role: Some("manager".to_string()),
            plan_name: Some("Premium".to_string()),
            iat: 1700000000,
            exp: 1700003600,
            iss: None,
        }
    }

    #[test]
    fn from_claims_extracts_identity() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.tenant_id, Some(Uuid::nil()));
        assert_eq!(user.role, Some(UserRole::Manager));
        assert_eq!(user.plan_name.as_deref(), Some("Premium"));
        assert_eq!(user.expires_at, 1700003600);
    }

    #[test]
    fn from_claims_drops_missing_or_unknown_role() {
        let mut claims = sample_claims();
        claims.role = None;
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.role, None);
        assert!(!user.is_superadmin());

        let mut claims = sample_claims();
        claims.role = Some("cashier".to_string());
        assert_eq!(AuthenticatedUser::from_claims(claims).role, None);

        let mut claims = sample_claims();
        claims.role = Some("SuperAdmin".to_string());
        assert!(AuthenticatedUser::from_claims(claims).is_superadmin());
    }

    #[test]
    fn claims_accept_backend_field_names() {
        let json = r#"{
            "userId": "u1",
            "tenantId": "df9347c2-9f6c-4d32-942f-1208b91fbb2b",
            "role": "owner",
            "planName": "Enterprise",
            "iat": 1,
            "exp": 2
        }"#;
        let claims: SessionClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user_id, "u1");
        assert_eq!(claims.plan_name.as_deref(), Some("Enterprise"));
        assert!(claims.tenant_id.is_some());

        let claims: SessionClaims = serde_json::from_str(r#"{"sub":"u2"}"#).unwrap();
        assert_eq!(claims.user_id, "u2");
        assert!(claims.role.is_none());
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["userId"], "user_123");
        assert_eq!(json["role"], "manager");
        assert_eq!(json["planName"], "Premium");
        assert!(json.get("expiresAt").is_none());
    }
}
