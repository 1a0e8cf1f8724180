use anyhow::Result;
use clap::Parser;
use govdash_models::RuntimeMode;
use govdash_upstream::GovernanceClient;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod watch;

#[tokio::main]
async fn main() -> Result<()> {
    let mode = RuntimeMode::from_env();
    let default_filter = if mode.is_development() {
        "govdash=debug,tower_http=debug"
    } else {
        "govdash=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let args = cli::Args::parse();
    let config = config::Config::load(&args.config)?;

    match args.command.unwrap_or(cli::Command::Serve { bind: None }) {
        cli::Command::Serve { bind } => serve(&config, mode, bind).await,
        cli::Command::Watch {
            proxy_url,
            filter,
            once,
        } => watch::run(&config, proxy_url, filter, once).await,
    }
}

async fn serve(config: &config::Config, mode: RuntimeMode, bind: Option<String>) -> Result<()> {
    let upstream = GovernanceClient::new(&config.upstream_config(), mode)?;
    let upstream_url = upstream.proposals_url().to_string();
    let tls_status = if upstream.verifies_tls() {
        "Verified"
    } else {
        "NOT verified (development)"
    };

    let state = govdash_core::AppState {
        config: config.app_config(mode),
        upstream,
    };
    let app = govdash_api::app(state);

    let bind_address = bind.unwrap_or_else(|| config.server.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    print_startup_banner(
        &bind_address,
        mode,
        &upstream_url,
        tls_status,
        &config.server.allowed_origins,
    );

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        println!();
        tracing::info!("Shutting down...");
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

fn print_startup_banner(
    bind_address: &str,
    mode: RuntimeMode,
    upstream_url: &str,
    tls_status: &str,
    allowed_origins: &[String],
) {
    println!();
    println!("  govdash {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  Listening:   http://{}", bind_address);
    println!("  Proxy:       http://{}/api/proposals", bind_address);
    println!("  Mode:        {}", mode.as_str());
    println!("  Upstream:    {}", upstream_url);
    println!("  Upstream TLS: {}", tls_status);
    if allowed_origins.is_empty() {
        println!("  CORS:        same-origin only");
    } else {
        println!("  CORS:        {}", allowed_origins.join(", "));
    }
    println!();
}
