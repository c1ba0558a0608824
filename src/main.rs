// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, time::Duration};

use axum_server::Handle;
use tracing_subscriber::EnvFilter;

use fuelsync_access::{
    access::{AccessMatrix, MatrixError},
    api::router,
    client::BackendClient,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    state::{AppState, AuthConfig},
};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn load_matrix(config: &AppConfig) -> Result<AccessMatrix, MatrixError> {
    let matrix = match config.access_matrix_path {
        Some(ref path) => AccessMatrix::load(path)?,
        None => {
            tracing::info!("Using built-in access matrix");
            AccessMatrix::builtin()
        }
    };

    // Upgrade prompts on pro assume enterprise grants whatever pro lacks.
    if let Err(MatrixError::NotMonotonic { regressions }) = matrix.check_monotonic() {
        for regression in &regressions {
            tracing::warn!(%regression, "Access matrix revokes access on a higher tier");
        }
    }

    Ok(matrix)
}

fn auth_config(config: &AppConfig) -> AuthConfig {
    let Some(ref secret) = config.jwt_secret else {
        if cfg!(feature = "dev") {
            tracing::warn!("JWT_SECRET not set, accepting unverified tokens (dev build)");
        } else {
            tracing::error!("JWT_SECRET not set, all authenticated requests will be rejected");
        }
        return AuthConfig::default();
    };

    let auth = AuthConfig::with_secret(secret);
    match config.jwt_issuer {
        Some(ref issuer) => auth.with_issuer(issuer.clone()),
        None => auth,
    }
}

async fn shutdown_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    let matrix = load_matrix(&config).inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load access matrix");
    })?;

    let backend = BackendClient::connect(&config.backend_base_url, config.backend_token.clone())
        .inspect_err(|e| {
            tracing::error!(error = %e, url = %config.backend_base_url, "Invalid BACKEND_BASE_URL");
        })?;
    tracing::info!(url = %config.backend_base_url, "FuelSync backend");

    let state = AppState::new(matrix)
        .with_auth_config(auth_config(&config))
        .with_backend(backend);
    let app = router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    tracing::info!(%addr, "FuelSync access service listening (docs at /docs)");

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
