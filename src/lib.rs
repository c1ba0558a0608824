// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FuelSync Access - plan and role based access control
//!
//! This crate resolves what a FuelSync Hub user may do in each dashboard
//! feature area from their subscription plan and role, and serves those
//! decisions over HTTP.
//!
//! ## Modules
//!
//! - `access` - Access matrix, tier normalization, resolver and gates
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session token authentication and single-flight refresh
//! - `client` - Outbound client for the FuelSync backend

pub mod access;
pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod state;
