// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Control
//!
//! Plan- and role-based access control for the FuelSync Hub dashboard.
//!
//! ## Resolution
//!
//! 1. The session's plan name ("Regular", "Premium", "Enterprise") is
//!    normalized to a [`PlanTier`]; unknown names fall back to starter.
//! 2. `(tier, role)` selects a row of the [`AccessMatrix`].
//! 3. An [`AccessView`] answers `can_view`/`can_create`/... per
//!    [`FeatureArea`], and suggests upgrades.
//!
//! Every miss resolves to "no access"; nothing in this module returns an
//! error to the caller except matrix loading.

pub mod feature;
pub mod gate;
pub mod matrix;
pub mod resolver;
pub mod tier;

pub use feature::{Action, FeatureAccess, FeatureArea};
pub use gate::{GateDecision, Requires};
pub use matrix::{AccessMatrix, MatrixError, RoleAccess};
pub use resolver::{resolve, resolve_permissions, AccessView, ResolvedPermissions};
pub use tier::{normalize_tier, PlanTier};
