// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Matrix
//!
//! The hand-authored truth table mapping `(plan tier, role, feature area)` to
//! the actions a user may perform. The matrix is built once at startup, either
//! from the built-in table or from a JSON override file, and shared read-only.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "starter": {
//!     "owner": {
//!       "stations": { "view": true, "create": true, "edit": true },
//!       "creditors": {}
//!     }
//!   }
//! }
//! ```
//!
//! Flags left out of a feature record are `false`. A feature left out of a
//! row is a configuration error reported by [`AccessMatrix::validate_complete`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::feature::{Action, FeatureAccess, FeatureArea};
use super::tier::PlanTier;
use crate::auth::UserRole;

/// Permissions of one `(tier, role)` pair, keyed by feature area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleAccess(BTreeMap<FeatureArea, FeatureAccess>);

impl RoleAccess {
    /// Row granting every action on every feature area.
    pub fn full() -> Self {
        Self(
            FeatureArea::ALL
                .into_iter()
                .map(|f| (f, FeatureAccess::FULL))
                .collect(),
        )
    }

    pub fn from_entries(entries: &[(FeatureArea, FeatureAccess)]) -> Self {
        Self(entries.iter().copied().collect())
    }

    /// Permissions on `feature`, or `None` when the row has no entry for it.
    pub fn get(&self, feature: FeatureArea) -> Option<&FeatureAccess> {
        self.0.get(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureArea, &FeatureAccess)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A `(tier, role)` row, or a `(tier, role, feature)` entry, that the matrix lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    pub tier: PlanTier,
    pub role: UserRole,
    /// `None` when the whole row is missing.
    pub feature: Option<FeatureArea>,
}

impl std::fmt::Display for MissingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.feature {
            Some(feature) => write!(f, "{}/{}/{}", self.tier, self.role, feature),
            None => write!(f, "{}/{}", self.tier, self.role),
        }
    }
}

/// Actions a lower tier grants that a higher tier revokes for the same role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierRegression {
    pub role: UserRole,
    pub feature: FeatureArea,
    pub lower: PlanTier,
    pub higher: PlanTier,
    pub revoked: Vec<Action>,
}

impl std::fmt::Display for TierRegression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let revoked: Vec<&str> = self.revoked.iter().map(Action::as_str).collect();
        write!(
            f,
            "{} on {}: {} grants [{}] but {} does not",
            self.role,
            self.feature,
            self.lower,
            revoked.join(", "),
            self.higher
        )
    }
}

/// Errors raised while loading or validating a matrix.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("access matrix is incomplete ({} missing entries)", .missing.len())]
    Incomplete { missing: Vec<MissingEntry> },

    #[error("access matrix revokes permissions on higher tiers ({} regressions)", .regressions.len())]
    NotMonotonic { regressions: Vec<TierRegression> },

    #[error("failed to read access matrix file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse access matrix: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable `(PlanTier, UserRole, FeatureArea) -> FeatureAccess` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessMatrix {
    rows: BTreeMap<PlanTier, BTreeMap<UserRole, RoleAccess>>,
}

impl AccessMatrix {
    /// Parse a matrix from its JSON form. Does not validate completeness.
    pub fn from_json(json: &str) -> Result<Self, MatrixError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a matrix override file and check it is complete.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| MatrixError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix = Self::from_json(&json)?;
        matrix.validate_complete()?;
        tracing::info!(path = %path.display(), "Loaded access matrix override");
        Ok(matrix)
    }

    /// Return a copy with the `(tier, role)` row replaced.
    pub fn with_row(mut self, tier: PlanTier, role: UserRole, access: RoleAccess) -> Self {
        self.rows.entry(tier).or_default().insert(role, access);
        self
    }

    /// The row for `(tier, role)`, or `None` if the matrix has none.
    pub fn row(&self, tier: PlanTier, role: UserRole) -> Option<&RoleAccess> {
        self.rows.get(&tier)?.get(&role)
    }

    pub fn entry(
        &self,
        tier: PlanTier,
        role: UserRole,
        feature: FeatureArea,
    ) -> Option<&FeatureAccess> {
        self.row(tier, role)?.get(feature)
    }

    /// Every row missing for any tier/role pair, and every feature missing from a row.
    pub fn missing_entries(&self) -> Vec<MissingEntry> {
        let mut missing = Vec::new();
        for tier in PlanTier::ALL {
            for role in UserRole::ALL {
                let Some(row) = self.row(tier, role) else {
                    missing.push(MissingEntry { tier, role, feature: None });
                    continue;
                };
                missing.extend(
                    FeatureArea::ALL
                        .into_iter()
                        .filter(|f| row.get(*f).is_none())
                        .map(|f| MissingEntry { tier, role, feature: Some(f) }),
                );
            }
        }
        missing
    }

    /// Fail unless every tier/role pair has an entry for every feature area.
    pub fn validate_complete(&self) -> Result<(), MatrixError> {
        let missing = self.missing_entries();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MatrixError::Incomplete { missing })
        }
    }

    /// Fail if a higher tier revokes an action a lower tier grants to the same role.
    ///
    /// Entries missing on either side are skipped; completeness is reported
    /// separately by [`validate_complete`](Self::validate_complete).
    pub fn check_monotonic(&self) -> Result<(), MatrixError> {
        let mut regressions = Vec::new();
        for role in UserRole::ALL {
            for (i, lower) in PlanTier::ALL.into_iter().enumerate() {
                for higher in PlanTier::ALL.into_iter().skip(i + 1) {
                    for feature in FeatureArea::ALL {
                        let (Some(lo), Some(hi)) = (
                            self.entry(lower, role, feature),
                            self.entry(higher, role, feature),
                        ) else {
                            continue;
                        };
                        let revoked = lo.not_granted_by(hi);
                        if !revoked.is_empty() {
                            regressions.push(TierRegression {
                                role,
                                feature,
                                lower,
                                higher,
                                revoked,
                            });
                        }
                    }
                }
            }
        }
        if regressions.is_empty() {
            Ok(())
        } else {
            Err(MatrixError::NotMonotonic { regressions })
        }
    }

    /// The FuelSync Hub matrix, matching the backend's enforcement table.
    pub fn builtin() -> Self {
        use Action::*;
        use FeatureArea::*;

        let g = FeatureAccess::granting;
        let none = FeatureAccess::NONE;

        let starter_owner = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View, Create, Edit])),
            (Pumps, g(&[View, Create, Edit])),
            (Nozzles, g(&[View, Create, Edit])),
            (Readings, g(&[View, Create, Edit, ViewAll])),
            (Sales, g(&[View, Create, Edit, ViewAll])),
            (CashReports, g(&[View, Create, Edit, ViewAll])),
            (Reconciliation, g(&[View, Perform, CloseDay])),
            (Users, g(&[View, Create, Edit, ResetPassword])),
            (FuelPrices, g(&[View, Edit])),
            (Inventory, g(&[View, Edit])),
            (Creditors, none),
            (Reports, none),
            (Analytics, none),
            (Settings, g(&[View, Edit])),
        ]);
        let starter_manager = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View, Edit])),
            (Pumps, g(&[View, Edit])),
            (Nozzles, g(&[View, Edit])),
            (Readings, g(&[View, Create, Edit, ViewAll])),
            (Sales, g(&[View, Create, Edit, ViewAll])),
            (CashReports, g(&[View, Create, Edit, ViewAll])),
            (Reconciliation, g(&[View, Perform, CloseDay])),
            (Users, g(&[View])),
            (FuelPrices, g(&[View, Edit])),
            (Inventory, g(&[View, Edit])),
            (Creditors, none),
            (Reports, none),
            (Analytics, none),
            (Settings, g(&[View])),
        ]);
        let starter_attendant = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View])),
            (Pumps, g(&[View])),
            (Nozzles, g(&[View])),
            (Readings, g(&[View, Create, Edit])),
            (Sales, g(&[View, Create])),
            (CashReports, g(&[View, Create, Edit])),
            (Reconciliation, none),
            (Users, none),
            (FuelPrices, g(&[View])),
            (Inventory, g(&[View])),
            (Creditors, none),
            (Reports, none),
            (Analytics, none),
            (Settings, none),
        ]);

        let pro_owner = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View, Create, Edit, Delete])),
            (Pumps, g(&[View, Create, Edit, Delete])),
            (Nozzles, g(&[View, Create, Edit, Delete])),
            (Readings, g(&[View, Create, Edit, Delete, ViewAll])),
            (Sales, g(&[View, Create, Edit, Delete, ViewAll])),
            (CashReports, g(&[View, Create, Edit, ViewAll])),
            (Reconciliation, g(&[View, Perform, CloseDay])),
            (Users, g(&[View, Create, Edit, Delete, ResetPassword])),
            (FuelPrices, g(&[View, Edit])),
            (Inventory, g(&[View, Edit])),
            (Creditors, g(&[View, Create, Edit, Delete])),
            (Reports, g(&[View, Generate, Schedule, Export])),
            (Analytics, g(&[View])),
            (Settings, g(&[View, Edit])),
        ]);
        let pro_manager = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View, Create, Edit])),
            (Pumps, g(&[View, Create, Edit])),
            (Nozzles, g(&[View, Create, Edit])),
            (Readings, g(&[View, Create, Edit, Delete, ViewAll])),
            (Sales, g(&[View, Create, Edit, Delete, ViewAll])),
            (CashReports, g(&[View, Create, Edit, ViewAll])),
            (Reconciliation, g(&[View, Perform, CloseDay])),
            (Users, g(&[View, Create, Edit])),
            (FuelPrices, g(&[View, Edit])),
            (Inventory, g(&[View, Edit])),
            (Creditors, g(&[View, Create, Edit])),
            (Reports, g(&[View, Generate, Export])),
            (Analytics, g(&[View])),
            (Settings, g(&[View])),
        ]);
        let pro_attendant = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View])),
            (Pumps, g(&[View])),
            (Nozzles, g(&[View])),
            (Readings, g(&[View, Create, Edit])),
            (Sales, g(&[View, Create])),
            (CashReports, g(&[View, Create, Edit])),
            (Reconciliation, none),
            (Users, none),
            (FuelPrices, g(&[View])),
            (Inventory, g(&[View])),
            (Creditors, g(&[View])),
            (Reports, none),
            (Analytics, none),
            (Settings, none),
        ]);

        // Owners and managers share the same enterprise row.
        let enterprise_staff = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View, Create, Edit, Delete])),
            (Pumps, g(&[View, Create, Edit, Delete])),
            (Nozzles, g(&[View, Create, Edit, Delete])),
            (Readings, g(&[View, Create, Edit, Delete, ViewAll])),
            (Sales, g(&[View, Create, Edit, Delete, ViewAll])),
            (CashReports, g(&[View, Create, Edit, ViewAll])),
            (Reconciliation, g(&[View, Perform, CloseDay])),
            (Users, g(&[View, Create, Edit, Delete, ResetPassword])),
            (FuelPrices, g(&[View, Edit])),
            (Inventory, g(&[View, Edit])),
            (Creditors, g(&[View, Create, Edit, Delete])),
            (Reports, g(&[View, Generate, Schedule, Export])),
            (Analytics, g(&[View, Advanced])),
            (Settings, g(&[View, Edit])),
        ]);
        let enterprise_attendant = RoleAccess::from_entries(&[
            (Dashboard, g(&[View])),
            (Stations, g(&[View])),
            (Pumps, g(&[View])),
            (Nozzles, g(&[View])),
            (Readings, g(&[View, Create, Edit])),
            (Sales, g(&[View, Create, Edit])),
            (CashReports, g(&[View, Create, Edit])),
            (Reconciliation, g(&[View])),
            (Users, none),
            (FuelPrices, g(&[View])),
            (Inventory, g(&[View, Edit])),
            (Creditors, g(&[View, Create, Edit])),
            (Reports, g(&[View])),
            (Analytics, none),
            (Settings, none),
        ]);

        let mut matrix = AccessMatrix::default();
        for tier in PlanTier::ALL {
            matrix = matrix.with_row(tier, UserRole::SuperAdmin, RoleAccess::full());
        }
        matrix
            .with_row(PlanTier::Starter, UserRole::Owner, starter_owner)
            .with_row(PlanTier::Starter, UserRole::Manager, starter_manager)
            .with_row(PlanTier::Starter, UserRole::Attendant, starter_attendant)
            .with_row(PlanTier::Pro, UserRole::Owner, pro_owner)
            .with_row(PlanTier::Pro, UserRole::Manager, pro_manager)
            .with_row(PlanTier::Pro, UserRole::Attendant, pro_attendant)
            .with_row(PlanTier::Enterprise, UserRole::Owner, enterprise_staff.clone())
            .with_row(PlanTier::Enterprise, UserRole::Manager, enterprise_staff)
            .with_row(PlanTier::Enterprise, UserRole::Attendant, enterprise_attendant)
    }
}
