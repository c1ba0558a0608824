// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::access::PlanTier;

/// JSON error response: `{ "error", "errorCode"?, "upgradeMessage"?, "targetPlan"? }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Machine-readable code, set for authentication failures
    pub code: Option<&'static str>,
    pub upgrade: Option<UpgradeHint>,
}

/// Upgrade suggestion attached to a denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeHint {
    pub upgrade_message: String,
    pub target_plan: PlanTier,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    upgrade: Option<UpgradeHint>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            upgrade: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_upgrade(mut self, upgrade_message: impl Into<String>, target_plan: PlanTier) -> Self {
        self.upgrade = Some(UpgradeHint {
            upgrade_message: upgrade_message.into(),
            target_plan,
        });
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
            upgrade: self.upgrade,
        });
        (self.status, body).into_response()
    }
}
