// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-control endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    access::{
        gate::{permission_gate, plan_gate, Requires},
        AccessMatrix, Action, FeatureArea, GateDecision, PlanTier, ResolvedPermissions,
    },
    auth::{extractor::Permissions, SuperAdminOnly, UserRole},
    error::ApiError,
    state::AppState,
};

/// Response for GET /v1/me/permissions
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub plan_tier: PlanTier,
    pub role: UserRole,
    /// Resolved row; absent when the matrix has no row for the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<ResolvedPermissions>,
    /// Checklist features the user cannot view
    pub restricted_features: Vec<FeatureArea>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CheckQuery {
    /// Feature area wire name, e.g. `cashReports`
    pub feature: String,
    /// Action wire name, defaults to `view`
    #[serde(default)]
    pub action: Option<String>,
    /// Answer denials with an upgrade prompt when one applies
    #[serde(default)]
    pub upgrade_prompt: Option<bool>,
    /// Point upgrade prompts at the enterprise plan
    #[serde(default)]
    pub requires_enterprise: Option<bool>,
    /// Point upgrade prompts at the pro plan
    #[serde(default)]
    pub requires_pro: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub feature: FeatureArea,
    pub action: Action,
    pub allowed: bool,
    pub gate: GateDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_message: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PlanCheckQuery {
    /// Required tier: `starter`, `pro` or `enterprise`
    pub required: String,
    #[serde(default)]
    pub upgrade_prompt: Option<bool>,
}

fn parse_feature(raw: &str) -> Result<FeatureArea, ApiError> {
    FeatureArea::from_str(raw)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown feature area '{raw}'")))
}

fn parse_action(raw: Option<&str>) -> Result<Action, ApiError> {
    match raw {
        None => Ok(Action::View),
        Some(raw) => Action::ALL
            .into_iter()
            .find(|a| a.as_str() == raw)
            .ok_or_else(|| ApiError::bad_request(format!("Unknown action '{raw}'"))),
    }
}

/// Get the current user's resolved permissions.
#[utoipa::path(
    get,
    path = "/v1/me/permissions",
    tag = "Access",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Resolved permissions", body = PermissionsResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn my_permissions(Permissions(view): Permissions) -> Json<PermissionsResponse> {
    Json(PermissionsResponse {
        plan_tier: view.plan_tier(),
        role: view.role(),
        restricted_features: view.restricted_features(),
        permissions: view.permissions().cloned(),
    })
}

/// Check one feature/action for the current user.
///
/// Always answers 200; the decision is in the body.
#[utoipa::path(
    get,
    path = "/v1/access/check",
    tag = "Access",
    params(CheckQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Gate decision", body = CheckResponse),
        (status = 400, description = "Unknown feature or action"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn check_access(
    Permissions(view): Permissions,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, ApiError> {
    let feature = parse_feature(&query.feature)?;
    let action = parse_action(query.action.as_deref())?;
    let requires = Requires {
        enterprise: query.requires_enterprise.unwrap_or(false),
        pro: query.requires_pro.unwrap_or(false),
    };

    let gate = permission_gate(
        &view,
        feature,
        action,
        query.upgrade_prompt.unwrap_or(true),
        requires,
    );

    let upgrade_message = match &gate {
        GateDecision::Upgrade { message, .. } => Some(message.clone()),
        _ => None,
    };

    Ok(Json(CheckResponse {
        feature,
        action,
        allowed: gate.is_allowed(),
        upgrade_message,
        gate,
    }))
}

/// Guard endpoint for reverse proxies: 204 when allowed, 403 otherwise.
#[utoipa::path(
    get,
    path = "/v1/access/authorize",
    tag = "Access",
    params(CheckQuery),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Allowed"),
        (status = 400, description = "Unknown feature or action"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Denied, possibly with an upgrade hint"),
    )
)]
pub async fn authorize(
    Permissions(view): Permissions,
    Query(query): Query<CheckQuery>,
) -> Result<StatusCode, ApiError> {
    let feature = parse_feature(&query.feature)?;
    let action = parse_action(query.action.as_deref())?;
    let requires = Requires {
        enterprise: query.requires_enterprise.unwrap_or(false),
        pro: query.requires_pro.unwrap_or(false),
    };

    match permission_gate(&view, feature, action, query.upgrade_prompt.unwrap_or(true), requires) {
        GateDecision::Allow => Ok(StatusCode::NO_CONTENT),
        GateDecision::Upgrade { message, target_plan } => {
            tracing::debug!(%feature, %action, %target_plan, "Access denied, upgrade available");
            Err(ApiError::forbidden(format!("Not allowed to {action} {feature}"))
                .with_upgrade(message, target_plan))
        }
        GateDecision::Deny => {
            tracing::debug!(%feature, %action, role = %view.role(), "Access denied");
            Err(ApiError::forbidden(format!("Not allowed to {action} {feature}")))
        }
    }
}

/// Check the current user's plan tier against a required tier.
#[utoipa::path(
    get,
    path = "/v1/access/plan-check",
    tag = "Access",
    params(PlanCheckQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Gate decision", body = GateDecision),
        (status = 400, description = "Unknown tier"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn plan_check(
    Permissions(view): Permissions,
    Query(query): Query<PlanCheckQuery>,
) -> Result<Json<GateDecision>, ApiError> {
    let required = PlanTier::from_str(&query.required)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown plan tier '{}'", query.required)))?;
    Ok(Json(plan_gate(&view, required, query.upgrade_prompt.unwrap_or(true))))
}

/// The full access matrix (superadmin only).
#[utoipa::path(
    get,
    path = "/v1/access/matrix",
    tag = "Access",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Access matrix keyed by tier, role and feature"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Caller is not a superadmin"),
    )
)]
pub async fn access_matrix(
    SuperAdminOnly(user): SuperAdminOnly,
    State(state): State<AppState>,
) -> Json<AccessMatrix> {
    tracing::info!(user_id = %user.user_id, "Access matrix requested");
    Json(state.matrix.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::auth::extractor::tests::{test_state, test_token, token_with_role};
    use axum::{body::{to_bytes, Body}, http::Request};
    use tower::ServiceExt;

    async fn get(uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = router(test_state())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn permissions_require_authentication() {
        let (status, body) = get("/v1/me/permissions", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "missing_auth_header");
    }

    #[tokio::test]
    async fn permissions_for_starter_attendant() {
        let token = test_token("attendant", Some("Regular"));
        let (status, body) = get("/v1/me/permissions", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["planTier"], "starter");
        assert_eq!(body["role"], "attendant");
        assert_eq!(
            body["restrictedFeatures"],
            serde_json::json!(["reports", "analytics", "creditors", "users", "settings"])
        );
        assert_eq!(body["permissions"]["access"]["readings"]["create"], true);
    }

    #[tokio::test]
    async fn check_reports_owner_starter_scenario() {
        let token = test_token("owner", Some("Regular"));

        let (status, body) = get("/v1/access/check?feature=creditors&action=create", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allowed"], false);
        assert_eq!(body["gate"]["decision"], "upgrade");
        assert_eq!(body["gate"]["targetPlan"], "pro");
        assert_eq!(body["upgradeMessage"], "Upgrade to Pro or Enterprise to access this feature");

        let (_, body) = get("/v1/access/check?feature=stations", Some(&token)).await;
        assert_eq!(body["allowed"], true);
        assert_eq!(body["action"], "view");
        assert!(body.get("upgradeMessage").is_none());

        let (_, body) = get(
            "/v1/access/check?feature=stations&action=delete&upgradePrompt=false",
            Some(&token),
        )
        .await;
        assert_eq!(body["allowed"], false);
        assert_eq!(body["gate"]["decision"], "deny");
    }

    #[tokio::test]
    async fn check_rejects_unknown_feature_and_action() {
        let token = test_token("owner", Some("Regular"));
        let (status, body) = get("/v1/access/check?feature=payroll", Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown feature area 'payroll'");

        let (status, _) = get("/v1/access/check?feature=sales&action=refund", Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn authorize_answers_with_status_codes() {
        let manager = test_token("manager", Some("Enterprise"));
        let (status, _) = get("/v1/access/authorize?feature=stations&action=delete", Some(&manager)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let attendant = test_token("attendant", Some("Premium"));
        let (status, body) = get("/v1/access/authorize?feature=reports", Some(&attendant)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["upgradeMessage"], "Upgrade to Enterprise to access this feature");
        assert_eq!(body["targetPlan"], "enterprise");

        let enterprise_attendant = test_token("attendant", Some("Enterprise"));
        let (status, body) = get("/v1/access/authorize?feature=users", Some(&enterprise_attendant)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.get("upgradeMessage").is_none());
    }

    #[tokio::test]
    async fn unrecognized_role_is_denied_everything() {
        for role in [Some("cashier"), None] {
            let token = token_with_role(role, Some("Enterprise"));
            for uri in [
                "/v1/access/authorize?feature=creditors&action=edit",
                "/v1/access/authorize?feature=reports",
                "/v1/access/authorize?feature=dashboard",
            ] {
                let (status, body) = get(uri, Some(&token)).await;
                assert_eq!(status, StatusCode::FORBIDDEN, "{role:?} {uri}");
                assert!(body.get("upgradeMessage").is_none());
            }

            let (status, body) = get("/v1/me/permissions", Some(&token)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["role"], "attendant");
            assert!(body.get("permissions").is_none());
        }
    }

    #[tokio::test]
    async fn plan_check_compares_tiers() {
        let token = test_token("owner", Some("Premium"));
        let (status, body) = get("/v1/access/plan-check?required=pro", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decision"], "allow");

        let (_, body) = get("/v1/access/plan-check?required=enterprise", Some(&token)).await;
        assert_eq!(body["decision"], "upgrade");
        assert_eq!(body["message"], "This feature requires enterprise plan or higher");

        let (status, _) = get("/v1/access/plan-check?required=gold", Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn matrix_is_superadmin_only() {
        let owner = test_token("owner", Some("Enterprise"));
        let (status, body) = get("/v1/access/matrix", Some(&owner)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["errorCode"], "role_required");

        let admin = test_token("superadmin", None);
        let (status, body) = get("/v1/access/matrix", Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enterprise"]["manager"]["stations"]["delete"], true);
        assert_eq!(body["starter"]["owner"]["creditors"]["view"], false);
    }
}
