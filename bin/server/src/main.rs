use auth_relay_flow::{ProviderClient, ProviderConfig, RequestRouter};
use auth_relay_server::{app::app, config::ServerConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration is read once; nothing is served without it.
    let provider_config = match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!("{report}");
            return ExitCode::FAILURE;
        }
    };
    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load server configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Loaded configuration");

    let provider = match ProviderClient::new(provider_config) {
        Ok(provider) => provider,
        Err(report) => {
            tracing::error!("{report}");
            return ExitCode::FAILURE;
        }
    };
    let relay = Arc::new(RequestRouter::new(provider));

    let listener = match tokio::net::TcpListener::bind(&server_config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %server_config.bind_addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("listening on http://{}", server_config.bind_addr);

    if let Err(e) = axum::serve(listener, app(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
