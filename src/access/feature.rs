// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Feature areas, actions, and per-feature permission records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A functional module of the dashboard gated by the access matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FeatureArea {
    Dashboard,
    Stations,
    Pumps,
    Nozzles,
    Readings,
    Sales,
    CashReports,
    Reconciliation,
    Users,
    FuelPrices,
    Inventory,
    Creditors,
    Reports,
    Analytics,
    Settings,
}

impl FeatureArea {
    /// Every feature area, in dashboard navigation order.
    pub const ALL: [FeatureArea; 15] = [
        FeatureArea::Dashboard,
        FeatureArea::Stations,
        FeatureArea::Pumps,
        FeatureArea::Nozzles,
        FeatureArea::Readings,
        FeatureArea::Sales,
        FeatureArea::CashReports,
        FeatureArea::Reconciliation,
        FeatureArea::Users,
        FeatureArea::FuelPrices,
        FeatureArea::Inventory,
        FeatureArea::Creditors,
        FeatureArea::Reports,
        FeatureArea::Analytics,
        FeatureArea::Settings,
    ];

    /// Wire name of the feature area (`cashReports`, `fuelPrices`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureArea::Dashboard => "dashboard",
            FeatureArea::Stations => "stations",
            FeatureArea::Pumps => "pumps",
            FeatureArea::Nozzles => "nozzles",
            FeatureArea::Readings => "readings",
            FeatureArea::Sales => "sales",
            FeatureArea::CashReports => "cashReports",
            FeatureArea::Reconciliation => "reconciliation",
            FeatureArea::Users => "users",
            FeatureArea::FuelPrices => "fuelPrices",
            FeatureArea::Inventory => "inventory",
            FeatureArea::Creditors => "creditors",
            FeatureArea::Reports => "reports",
            FeatureArea::Analytics => "analytics",
            FeatureArea::Settings => "settings",
        }
    }

    /// Parse a wire name. Exact match only.
    pub fn from_str(s: &str) -> Option<FeatureArea> {
        FeatureArea::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl std::fmt::Display for FeatureArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation within a feature area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    ViewAll,
    Generate,
    Schedule,
    Export,
    Perform,
    CloseDay,
    ResetPassword,
    Advanced,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::ViewAll,
        Action::Generate,
        Action::Schedule,
        Action::Export,
        Action::Perform,
        Action::CloseDay,
        Action::ResetPassword,
        Action::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::ViewAll => "viewAll",
            Action::Generate => "generate",
            Action::Schedule => "schedule",
            Action::Export => "export",
            Action::Perform => "perform",
            Action::CloseDay => "closeDay",
            Action::ResetPassword => "resetPassword",
            Action::Advanced => "advanced",
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::View
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed actions on one feature area.
///
/// Flags absent from a serialized record deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureAccess {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub view_all: bool,
    pub generate: bool,
    pub schedule: bool,
    pub export: bool,
    pub perform: bool,
    pub close_day: bool,
    pub reset_password: bool,
    pub advanced: bool,
}

impl FeatureAccess {
    /// No action allowed.
    pub const NONE: FeatureAccess = FeatureAccess {
        view: false,
        create: false,
        edit: false,
        delete: false,
        view_all: false,
        generate: false,
        schedule: false,
        export: false,
        perform: false,
        close_day: false,
        reset_password: false,
        advanced: false,
    };

    /// Every action allowed.
    pub const FULL: FeatureAccess = FeatureAccess {
        view: true,
        create: true,
        edit: true,
        delete: true,
        view_all: true,
        generate: true,
        schedule: true,
        export: true,
        perform: true,
        close_day: true,
        reset_password: true,
        advanced: true,
    };

    /// Record granting exactly the listed actions.
    pub fn granting(actions: &[Action]) -> FeatureAccess {
        let mut access = FeatureAccess::NONE;
        for action in actions {
            access.set(*action, true);
        }
        access
    }

    /// Whether `action` is granted.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.view,
            Action::Create => self.create,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
            Action::ViewAll => self.view_all,
            Action::Generate => self.generate,
            Action::Schedule => self.schedule,
            Action::Export => self.export,
            Action::Perform => self.perform,
            Action::CloseDay => self.close_day,
            Action::ResetPassword => self.reset_password,
            Action::Advanced => self.advanced,
        }
    }

    pub fn set(&mut self, action: Action, allowed: bool) {
        let flag = match action {
            Action::View => &mut self.view,
            Action::Create => &mut self.create,
            Action::Edit => &mut self.edit,
            Action::Delete => &mut self.delete,
            Action::ViewAll => &mut self.view_all,
            Action::Generate => &mut self.generate,
            Action::Schedule => &mut self.schedule,
            Action::Export => &mut self.export,
            Action::Perform => &mut self.perform,
            Action::CloseDay => &mut self.close_day,
            Action::ResetPassword => &mut self.reset_password,
            Action::Advanced => &mut self.advanced,
        };
        *flag = allowed;
    }

    /// Granted actions, in [`Action::ALL`] order.
    pub fn granted(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.allows(*a))
    }

    /// Actions granted here that `other` does not grant.
    pub fn not_granted_by(&self, other: &FeatureAccess) -> Vec<Action> {
        self.granted().filter(|a| !other.allows(*a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granting_sets_only_listed_actions() {
        let access = FeatureAccess::granting(&[Action::View, Action::CloseDay]);
        assert!(access.allows(Action::View));
        assert!(access.allows(Action::CloseDay));
        assert!(!access.allows(Action::Delete));
        assert_eq!(access.granted().count(), 2);
    }

    #[test]
    fn full_allows_every_action() {
        assert!(Action::ALL.iter().all(|a| FeatureAccess::FULL.allows(*a)));
        assert!(Action::ALL.iter().all(|a| !FeatureAccess::NONE.allows(*a)));
    }

    #[test]
    fn missing_flags_deserialize_as_false() {
        let access: FeatureAccess =
            serde_json::from_str(r#"{"view":true,"closeDay":true}"#).unwrap();
        assert!(access.view);
        assert!(access.close_day);
        assert!(!access.edit);
        assert!(!access.reset_password);
    }

    #[test]
    fn not_granted_by_lists_revoked_actions() {
        let wide = FeatureAccess::granting(&[Action::View, Action::Edit, Action::Delete]);
        let narrow = FeatureAccess::granting(&[Action::View]);
        assert_eq!(wide.not_granted_by(&narrow), vec![Action::Edit, Action::Delete]);
        assert!(narrow.not_granted_by(&wide).is_empty());
    }

    #[test]
    fn feature_wire_names_round_trip() {
        for feature in FeatureArea::ALL {
            let json = serde_json::to_string(&feature).unwrap();
            assert_eq!(json, format!("\"{}\"", feature.as_str()));
            assert_eq!(FeatureArea::from_str(feature.as_str()), Some(feature));
        }
        assert_eq!(FeatureArea::from_str("cash_reports"), None);
    }

    #[test]
    fn action_wire_names_match_serde() {
        for action in Action::ALL {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }
}
