// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session authentication for the FuelSync access service.
//!
//! ## Auth Flow
//!
//! 1. The FuelSync backend issues an HS256 session token at login
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. This service:
//!    - Verifies signature, expiry and (optionally) issuer
//!    - Extracts:
//!      - `userId` / `sub` → canonical `user_id`
//!      - `role` → [`UserRole`] (unknown roles become attendant)
//!      - `planName` → subscription plan used for tier resolution
//!
//! ## Security
//!
//! - All non-health endpoints require authentication
//! - Without `JWT_SECRET` tokens are rejected unless built with `dev`
//! - Clock skew tolerance is 60 seconds
//!
//! Outbound calls to the backend use [`refresh::TokenRefresher`] to renew
//! the session token at most once per expiry.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod refresh;
pub mod roles;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::{Auth, Permissions, SuperAdminOnly};
pub use roles::UserRole;
