//! Tax server - exposes `calculatePersonalIncomeTax` over JSON and SOAP.

mod config;
mod routes;
mod soap;
mod state;

use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{ServerConfig, load_config};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "taxcalc-server")]
#[command(about = "Personal income tax service over JSON and SOAP")]
struct Args {
    /// Path to the TOML config file (defaults apply when missing)
    #[arg(long, default_value = "taxcalc-server.toml")]
    config: PathBuf,

    /// Address to bind the server to (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taxcalc_server=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    info!(config = %args.config.display(), "starting taxcalc-server");

    let addr = config.socket_addr()?;
    info!(soap_path = %config.soap_path, "serving SOAP endpoint and /api");

    let app = build_app(AppState::new(config));

    info!(addr = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn resolve_config(args: &Args) -> anyhow::Result<ServerConfig> {
    let mut config = load_config(&args.config)?;
    if let Some(bind) = &args.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

fn build_app(state: AppState) -> Router {
    let mut app = Router::new()
        .nest("/api", routes::api_router())
        .merge(soap::soap_router(&state.config.soap_path))
        .layer(TraceLayer::new_for_http());

    if state.config.cors_permissive {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.with_state(state)
}
