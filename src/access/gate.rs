// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate decisions: whether to allow an operation, deny it, or answer with an
//! upgrade prompt.

use serde::Serialize;
use utoipa::ToSchema;

use super::feature::{Action, FeatureArea};
use super::resolver::AccessView;
use super::tier::PlanTier;
use crate::auth::UserRole;

/// Which tier a gated operation explicitly asks for, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requires {
    pub enterprise: bool,
    pub pro: bool,
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GateDecision {
    Allow,
    Upgrade {
        message: String,
        target_plan: PlanTier,
    },
    Deny,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// Tier an upgrade prompt should point at.
pub fn target_plan(current: PlanTier, requires: Requires) -> PlanTier {
    if requires.enterprise {
        PlanTier::Enterprise
    } else if requires.pro {
        PlanTier::Pro
    } else if current == PlanTier::Starter {
        PlanTier::Pro
    } else {
        PlanTier::Enterprise
    }
}

/// Gate on a single feature/action pair.
///
/// When denied and `show_upgrade_prompt` is set, the decision carries the
/// view's upgrade message, if it has one.
pub fn permission_gate(
    view: &AccessView,
    feature: FeatureArea,
    action: Action,
    show_upgrade_prompt: bool,
    requires: Requires,
) -> GateDecision {
    if view.has_access(feature, action) {
        return GateDecision::Allow;
    }
    if show_upgrade_prompt {
        if let Some(message) = view.upgrade_message(feature) {
            return GateDecision::Upgrade {
                message: message.to_string(),
                target_plan: target_plan(view.plan_tier(), requires),
            };
        }
    }
    GateDecision::Deny
}

/// Whether the view's role is one of `allowed`.
pub fn role_gate(view: &AccessView, allowed: &[UserRole]) -> bool {
    allowed.contains(&view.role())
}

/// Gate on the subscription tier alone.
pub fn plan_gate(view: &AccessView, required: PlanTier, show_upgrade_prompt: bool) -> GateDecision {
    let current = view.plan_tier();
    if current >= required {
        return GateDecision::Allow;
    }
    if !show_upgrade_prompt {
        return GateDecision::Deny;
    }
    let requires = Requires {
        enterprise: required == PlanTier::Enterprise,
        pro: required == PlanTier::Pro,
    };
    GateDecision::Upgrade {
        message: format!("This feature requires {required} plan or higher"),
        target_plan: target_plan(current, requires),
    }
}

/// Allows only when both the role and the feature/action pass.
///
/// A missing feature takes precedence over a wrong role: with the prompt on,
/// the caller still learns which plan would unlock it.
pub fn permission_role_gate(
    view: &AccessView,
    feature: FeatureArea,
    action: Action,
    allowed: &[UserRole],
    show_upgrade_prompt: bool,
) -> GateDecision {
    let has_feature = view.has_access(feature, action);
    if has_feature && role_gate(view, allowed) {
        return GateDecision::Allow;
    }
    if !has_feature && show_upgrade_prompt {
        return permission_gate(view, feature, action, true, Requires::default());
    }
    GateDecision::Deny
}
