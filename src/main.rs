use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};

use town_server::config::{self, Config};
use town_server::metrics::Metrics;
use town_server::server::{self, AppState};
use town_server::town::TownsStore;
use town_server::video::InMemoryVideoTokenSource;

#[derive(Debug, Parser)]
#[command(name = "town-server", version, about = "Authoritative controller for multiplayer 2D towns")]
struct Cli {
    /// Validate the loaded configuration and exit with a non-zero status on failure.
    #[arg(long, conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the fully-resolved configuration as JSON and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load();

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if cli.validate_config {
        return match config::validate_config_security(&config) {
            Ok(()) => {
                println!("configuration is valid");
                Ok(())
            }
            Err(err) => {
                eprintln!("configuration is invalid: {err}");
                std::process::exit(1);
            }
        };
    }

    town_server::logging::init_with_config(&config);

    if let Err(err) = config::validate_config_security(&config) {
        tracing::warn!(%err, "starting with a configuration that failed security validation");
    }

    let video_token_source: Arc<dyn town_server::video::VideoTokenSource> =
        Arc::new(InMemoryVideoTokenSource::new(config.town.session_token_bytes));
    let metrics = Arc::new(Metrics::new());
    let towns = Arc::new(TownsStore::new(config.town.clone(), video_token_source, metrics.clone()));

    let state = AppState { towns, metrics };

    let cors = build_cors_layer(&config);
    let app = server::router(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;
    tracing::info!(%addr, "starting town-server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.trim() == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = config
        .cors_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(tower_http::cors::Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod cli_tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn defaults_to_no_flags() {
        let cli = Cli::parse_from(["town-server"]);
        assert!(!cli.validate_config);
        assert!(!cli.print_config);
    }

    #[test]
    fn accepts_validate_config() {
        let cli = Cli::parse_from(["town-server", "--validate-config"]);
        assert!(cli.validate_config);
    }

    #[test]
    fn accepts_print_config() {
        let cli = Cli::parse_from(["town-server", "--print-config"]);
        assert!(cli.print_config);
    }

    #[test]
    fn rejects_both_flags_together() {
        let result = Cli::try_parse_from(["town-server", "--print-config", "--validate-config"]);
        assert!(result.is_err());
    }

    #[test]
    fn prints_help_without_panicking() {
        let result = Cli::try_parse_from(["town-server", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn prints_version_without_panicking() {
        let result = Cli::try_parse_from(["town-server", "--version"]);
        assert!(result.is_err());
    }
}
