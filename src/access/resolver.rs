// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolution of a user's permission view from the access matrix.
//!
//! Nothing here fails: a missing user, a missing matrix row, or a missing
//! feature entry all resolve to "no access". The backend enforces the same
//! table independently, so this layer only decides what to offer.

use serde::Serialize;
use utoipa::ToSchema;

use super::feature::{Action, FeatureArea};
use super::matrix::{AccessMatrix, RoleAccess};
use super::tier::{normalize_tier, PlanTier, DEFAULT_PLAN_NAME};
use crate::auth::{AuthenticatedUser, UserRole};

/// Features checked when listing what the current plan keeps out of reach.
pub const UPGRADE_CHECKLIST: [FeatureArea; 5] = [
    FeatureArea::Reports,
    FeatureArea::Analytics,
    FeatureArea::Creditors,
    FeatureArea::Users,
    FeatureArea::Settings,
];

/// Prompt shown to starter users on any feature.
pub const UPGRADE_FROM_STARTER: &str = "Upgrade to Pro or Enterprise to access this feature";
/// Prompt shown to pro users on features pro cannot view.
pub const UPGRADE_FROM_PRO: &str = "Upgrade to Enterprise to access this feature";

/// Permissions resolved for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPermissions {
    pub plan_tier: PlanTier,
    pub plan_name: String,
    pub role: UserRole,
    #[schema(value_type = Object)]
    pub access: RoleAccess,
}

/// Look up the row for `role` on the tier named by `plan_name`.
///
/// Superadmins always get the full row. Returns `None` when the matrix has no
/// row for the pair.
pub fn resolve(
    matrix: &AccessMatrix,
    role: UserRole,
    plan_name: Option<&str>,
) -> Option<ResolvedPermissions> {
    let plan_name = plan_name.unwrap_or(DEFAULT_PLAN_NAME);
    let plan_tier = normalize_tier(Some(plan_name));

    let access = if role.is_superadmin() {
        RoleAccess::full()
    } else {
        match matrix.row(plan_tier, role) {
            Some(row) => row.clone(),
            None => {
                tracing::warn!(
                    tier = %plan_tier,
                    role = %role,
                    "No access matrix row for plan tier and role"
                );
                return None;
            }
        }
    };

    Some(ResolvedPermissions {
        plan_tier,
        plan_name: plan_name.to_string(),
        role,
        access,
    })
}

/// Resolve permissions for the (possibly absent) authenticated user.
///
/// A user without a recognized role gets no permissions.
pub fn resolve_permissions(
    matrix: &AccessMatrix,
    user: Option<&AuthenticatedUser>,
) -> Option<ResolvedPermissions> {
    let user = user?;
    let Some(role) = user.role else {
        tracing::warn!(user_id = %user.user_id, "User has no recognized role, denying all access");
        return None;
    };
    resolve(matrix, role, user.plan_name.as_deref())
}

/// Read-only permission queries for the current user.
///
/// An empty view (no user, or no matrix row) denies everything.
#[derive(Debug, Clone, Default)]
pub struct AccessView {
    permissions: Option<ResolvedPermissions>,
}

impl AccessView {
    pub fn new(permissions: Option<ResolvedPermissions>) -> Self {
        Self { permissions }
    }

    pub fn for_user(matrix: &AccessMatrix, user: Option<&AuthenticatedUser>) -> Self {
        Self::new(resolve_permissions(matrix, user))
    }

    pub fn permissions(&self) -> Option<&ResolvedPermissions> {
        self.permissions.as_ref()
    }

    /// Tier of the current user, starter when unresolved.
    pub fn plan_tier(&self) -> PlanTier {
        self.permissions
            .as_ref()
            .map(|p| p.plan_tier)
            .unwrap_or_default()
    }

    /// Role of the current user, attendant when unresolved.
    pub fn role(&self) -> UserRole {
        self.permissions.as_ref().map(|p| p.role).unwrap_or_default()
    }

    /// Whether `action` is granted on `feature`.
    pub fn has_access(&self, feature: FeatureArea, action: Action) -> bool {
        self.permissions
            .as_ref()
            .and_then(|p| p.access.get(feature))
            .is_some_and(|access| access.allows(action))
    }

    pub fn can_view(&self, feature: FeatureArea) -> bool {
        self.has_access(feature, Action::View)
    }

    pub fn can_create(&self, feature: FeatureArea) -> bool {
        self.has_access(feature, Action::Create)
    }

    pub fn can_edit(&self, feature: FeatureArea) -> bool {
        self.has_access(feature, Action::Edit)
    }

    pub fn can_delete(&self, feature: FeatureArea) -> bool {
        self.has_access(feature, Action::Delete)
    }

    pub fn is_feature_available(&self, feature: FeatureArea) -> bool {
        self.can_view(feature)
    }

    /// Upgrade prompt for `feature`, if an upgrade is worth suggesting.
    ///
    /// Starter always gets the generic prompt. Pro gets the enterprise prompt
    /// only when it cannot view the feature; this assumes enterprise grants
    /// whatever pro lacks, which holds only while the matrix is monotonic
    /// (see [`AccessMatrix::check_monotonic`]). Enterprise never gets one.
    pub fn upgrade_message(&self, feature: FeatureArea) -> Option<&'static str> {
        let permissions = self.permissions.as_ref()?;
        match permissions.plan_tier {
            PlanTier::Starter => Some(UPGRADE_FROM_STARTER),
            PlanTier::Pro if !self.can_view(feature) => Some(UPGRADE_FROM_PRO),
            _ => None,
        }
    }

    /// Features from [`UPGRADE_CHECKLIST`] the current user cannot view.
    pub fn restricted_features(&self) -> Vec<FeatureArea> {
        if self.permissions.is_none() {
            return Vec::new();
        }
        UPGRADE_CHECKLIST
            .into_iter()
            .filter(|f| !self.can_view(*f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::feature::FeatureAccess;

    fn view(role: UserRole, plan_name: &str) -> AccessView {
        AccessView::new(resolve(&AccessMatrix::builtin(), role, Some(plan_name)))
    }

    #[test]
    fn no_user_resolves_to_nothing() {
        let matrix = AccessMatrix::builtin();
        assert!(resolve_permissions(&matrix, None).is_none());

        let empty = AccessView::for_user(&matrix, None);
        for feature in FeatureArea::ALL {
            for action in Action::ALL {
                assert!(!empty.has_access(feature, action));
            }
        }
        assert_eq!(empty.upgrade_message(FeatureArea::Reports), None);
        assert!(empty.restricted_features().is_empty());
        assert_eq!(empty.plan_tier(), PlanTier::Starter);
        assert_eq!(empty.role(), UserRole::Attendant);
    }

    #[test]
    fn superadmin_has_every_action_on_every_tier() {
        for plan in ["Regular", "Premium", "Enterprise", "unknown"] {
            let v = view(UserRole::SuperAdmin, plan);
            for feature in FeatureArea::ALL {
                for action in Action::ALL {
                    assert!(v.has_access(feature, action), "{plan}/{feature}/{action}");
                }
            }
        }
    }

    #[test]
    fn superadmin_ignores_restricted_override_rows() {
        let matrix = AccessMatrix::builtin().with_row(
            PlanTier::Starter,
            UserRole::SuperAdmin,
            RoleAccess::from_entries(&[(FeatureArea::Dashboard, FeatureAccess::NONE)]),
        );
        let v = AccessView::new(resolve(&matrix, UserRole::SuperAdmin, Some("Regular")));
        assert!(v.can_delete(FeatureArea::Stations));
        assert!(v.can_view(FeatureArea::Dashboard));
    }

    #[test]
    fn owner_on_starter_scenario() {
        let v = view(UserRole::Owner, "Regular");
        assert_eq!(v.plan_tier(), PlanTier::Starter);
        assert!(!v.can_create(FeatureArea::Creditors));
        assert!(v.can_view(FeatureArea::Stations));
        assert!(!v.can_delete(FeatureArea::Stations));
        assert!(v.can_create(FeatureArea::Stations));
        assert!(v.has_access(FeatureArea::Reconciliation, Action::CloseDay));
    }

    #[test]
    fn manager_on_enterprise_scenario() {
        let v = view(UserRole::Manager, "Enterprise");
        assert!(v.can_delete(FeatureArea::Stations));
        assert!(v.has_access(FeatureArea::Analytics, Action::Advanced));

        assert!(!view(UserRole::Manager, "Regular").can_delete(FeatureArea::Stations));
        assert!(!view(UserRole::Manager, "Premium").can_delete(FeatureArea::Stations));
    }

    #[test]
    fn unknown_plan_name_resolves_as_starter() {
        let v = view(UserRole::Owner, "Platinum");
        assert_eq!(v.plan_tier(), PlanTier::Starter);
        assert_eq!(v.permissions().unwrap().plan_name, "Platinum");
        assert!(!v.can_view(FeatureArea::Reports));
    }

    #[test]
    fn missing_plan_name_defaults_to_regular() {
        let resolved = resolve(&AccessMatrix::builtin(), UserRole::Manager, None).unwrap();
        assert_eq!(resolved.plan_name, "Regular");
        assert_eq!(resolved.plan_tier, PlanTier::Starter);
    }

    #[test]
    fn user_without_recognized_role_gets_no_access() {
        let matrix = AccessMatrix::builtin();
        let user = AuthenticatedUser {
            user_id: "user_123".to_string(),
            tenant_id: None,
            role: None,
            plan_name: Some("Enterprise".to_string()),
            expires_at: 0,
        };
        assert!(resolve_permissions(&matrix, Some(&user)).is_none());

        let v = AccessView::for_user(&matrix, Some(&user));
        assert!(!v.can_view(FeatureArea::Dashboard));
        assert!(!v.can_edit(FeatureArea::Creditors));
        assert_eq!(v.role(), UserRole::Attendant);
        assert_eq!(v.upgrade_message(FeatureArea::Reports), None);
    }

    #[test]
    fn missing_row_resolves_to_none() {
        let matrix = AccessMatrix::default();
        assert!(resolve(&matrix, UserRole::Owner, Some("Premium")).is_none());
        // Superadmin does not depend on the table.
        assert!(resolve(&matrix, UserRole::SuperAdmin, Some("Premium")).is_some());
    }

    #[test]
    fn missing_feature_entry_denies() {
        let matrix = AccessMatrix::builtin().with_row(
            PlanTier::Pro,
            UserRole::Owner,
            RoleAccess::from_entries(&[(FeatureArea::Dashboard, FeatureAccess::FULL)]),
        );
        let v = AccessView::new(resolve(&matrix, UserRole::Owner, Some("Premium")));
        assert!(v.can_view(FeatureArea::Dashboard));
        assert!(!v.can_view(FeatureArea::Stations));
    }

    #[test]
    fn starter_attendant_restricted_features() {
        let v = view(UserRole::Attendant, "Regular");
        let restricted = v.restricted_features();
        assert!(restricted.contains(&FeatureArea::Reports));
        assert!(restricted.contains(&FeatureArea::Analytics));
        assert!(restricted.contains(&FeatureArea::Users));
        for feature in &restricted {
            assert!(!v.can_view(*feature));
        }
    }

    #[test]
    fn restricted_features_never_include_viewable_features() {
        for role in UserRole::ALL {
            for plan in ["Regular", "Premium", "Enterprise"] {
                let v = view(role, plan);
                for feature in v.restricted_features() {
                    assert!(!v.can_view(feature), "{role}/{plan}/{feature}");
                }
            }
        }
        assert!(view(UserRole::Owner, "Enterprise").restricted_features().is_empty());
        assert_eq!(
            view(UserRole::Attendant, "Enterprise").restricted_features(),
            vec![FeatureArea::Analytics, FeatureArea::Users, FeatureArea::Settings]
        );
    }

    #[test]
    fn upgrade_message_follows_tier_heuristic() {
        let starter = view(UserRole::Owner, "Regular");
        assert_eq!(starter.upgrade_message(FeatureArea::Reports), Some(UPGRADE_FROM_STARTER));
        // Starter gets the prompt even for features it already has.
        assert_eq!(starter.upgrade_message(FeatureArea::Stations), Some(UPGRADE_FROM_STARTER));

        let pro = view(UserRole::Attendant, "Premium");
        assert_eq!(pro.upgrade_message(FeatureArea::Reports), Some(UPGRADE_FROM_PRO));
        assert_eq!(pro.upgrade_message(FeatureArea::Creditors), None);

        let enterprise = view(UserRole::Attendant, "Enterprise");
        assert_eq!(enterprise.upgrade_message(FeatureArea::Analytics), None);
    }

    #[test]
    fn resolved_permissions_serialize_camel_case() {
        let resolved = resolve(&AccessMatrix::builtin(), UserRole::Owner, Some("Premium")).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["planTier"], "pro");
        assert_eq!(json["planName"], "Premium");
        assert_eq!(json["role"], "owner");
        assert_eq!(json["access"]["cashReports"]["viewAll"], true);
    }
}
