// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`AppConfig`] collected from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 secret shared with the FuelSync backend | Required for production |
//! | `JWT_ISSUER` | Expected JWT issuer claim | Optional |
//! | `ACCESS_MATRIX_PATH` | JSON file replacing the built-in access matrix | Optional |
//! | `BACKEND_BASE_URL` | FuelSync REST API base, checked by readiness | `http://localhost:3003/api/v1` |
//! | `BACKEND_TOKEN` | Session token for backend calls (refreshed on 401) | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const ACCESS_MATRIX_PATH_ENV: &str = "ACCESS_MATRIX_PATH";
pub const BACKEND_BASE_URL_ENV: &str = "BACKEND_BASE_URL";
pub const BACKEND_TOKEN_ENV: &str = "BACKEND_TOKEN";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:3003/api/v1";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (case-insensitive) is pretty.
    pub fn parse(value: &str) -> LogFormat {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Option<String>,
    pub jwt_issuer: Option<String>,
    pub access_matrix_path: Option<PathBuf>,
    pub backend_base_url: String,
    pub backend_token: Option<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using default");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            jwt_secret: get(JWT_SECRET_ENV),
            jwt_issuer: get(JWT_ISSUER_ENV),
            access_matrix_path: get(ACCESS_MATRIX_PATH_ENV).map(PathBuf::from),
            backend_base_url: get(BACKEND_BASE_URL_ENV)
                .unwrap_or_else(|| DEFAULT_BACKEND_BASE_URL.to_string()),
            backend_token: get(BACKEND_TOKEN_ENV),
            log_format: get(LOG_FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
        assert!(cfg.jwt_secret.is_none());
        assert!(cfg.access_matrix_path.is_none());
        assert_eq!(cfg.backend_base_url, DEFAULT_BACKEND_BASE_URL);
        assert!(cfg.backend_token.is_none());
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn values_are_read() {
        let cfg = config(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (JWT_SECRET_ENV, "s3cret"),
            (ACCESS_MATRIX_PATH_ENV, "/etc/fuelsync/matrix.json"),
            (LOG_FORMAT_ENV, "JSON"),
            (BACKEND_BASE_URL_ENV, "https://api.fuelsync.example/api/v1"),
            (BACKEND_TOKEN_ENV, "svc-token"),
        ]);
        assert_eq!(cfg.bind_address(), "127.0.0.1:9000");
        assert_eq!(cfg.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(
            cfg.access_matrix_path,
            Some(PathBuf::from("/etc/fuelsync/matrix.json"))
        );
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.backend_base_url, "https://api.fuelsync.example/api/v1");
        assert_eq!(cfg.backend_token.as_deref(), Some("svc-token"));
    }

    #[test]
    fn invalid_port_and_empty_values_fall_back() {
        let cfg = config(&[(PORT_ENV, "http"), (JWT_SECRET_ENV, "  ")]);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.jwt_secret.is_none());
    }
}
