// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subscription plan tiers and plan-name normalization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plan name assumed when the session carries none.
pub const DEFAULT_PLAN_NAME: &str = "Regular";

/// Subscription tier bounding the functionality a tenant can reach.
///
/// Tiers are ordered: `Starter < Pro < Enterprise`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Entry tier (plan "Regular")
    Starter,
    /// Middle tier (plan "Premium")
    Pro,
    /// Top tier (plan "Enterprise")
    Enterprise,
}

impl PlanTier {
    /// All tiers, lowest first.
    pub const ALL: [PlanTier; 3] = [PlanTier::Starter, PlanTier::Pro, PlanTier::Enterprise];

    /// Parse a canonical tier name (`starter`, `pro`, `enterprise`), case-insensitive.
    pub fn from_str(s: &str) -> Option<PlanTier> {
        match s.to_lowercase().as_str() {
            "starter" => Some(PlanTier::Starter),
            "pro" => Some(PlanTier::Pro),
            "enterprise" => Some(PlanTier::Enterprise),
            _ => None,
        }
    }

    /// Map a human-readable subscription plan name to its tier.
    ///
    /// Returns `None` for names that have no alias.
    pub fn from_plan_name(plan_name: &str) -> Option<PlanTier> {
        match plan_name {
            "Regular" => Some(PlanTier::Starter),
            "Premium" => Some(PlanTier::Pro),
            "Enterprise" => Some(PlanTier::Enterprise),
            _ => None,
        }
    }

    /// Display name used in upgrade prompts.
    pub fn label(&self) -> &'static str {
        match self {
            PlanTier::Starter => "Starter",
            PlanTier::Pro => "Pro",
            PlanTier::Enterprise => "Enterprise",
        }
    }

    /// The tier directly above this one, if any.
    pub fn next(&self) -> Option<PlanTier> {
        match self {
            PlanTier::Starter => Some(PlanTier::Pro),
            PlanTier::Pro => Some(PlanTier::Enterprise),
            PlanTier::Enterprise => None,
        }
    }
}

impl Default for PlanTier {
    /// Default tier is Starter (least privilege).
    fn default() -> Self {
        PlanTier::Starter
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanTier::Starter => write!(f, "starter"),
            PlanTier::Pro => write!(f, "pro"),
            PlanTier::Enterprise => write!(f, "enterprise"),
        }
    }
}

/// Normalize a subscription plan name to a tier.
///
/// Unrecognized, empty, or missing names fall back to [`PlanTier::Starter`].
/// This never fails; an unknown name is logged since it usually means the
/// backend introduced a plan this service has no alias for.
pub fn normalize_tier(plan_name: Option<&str>) -> PlanTier {
    let name = plan_name.unwrap_or(DEFAULT_PLAN_NAME);
    match PlanTier::from_plan_name(name) {
        Some(tier) => tier,
        None => {
            tracing::debug!(plan_name = name, "Unrecognized plan name, using starter tier");
            PlanTier::Starter
        }
    }
}
