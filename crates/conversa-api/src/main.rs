//! Conversa entry point.
//!
//! Binary name: `conversa`
//!
//! Loads configuration, wires the Bedrock provider into the chat service,
//! and serves the HTTP API until Ctrl+C or SIGTERM.

mod http;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use conversa_infra::llm::bedrock::BedrockProvider;

use state::AppState;

/// Interval for the conversation store's idle-eviction sweeper.
const SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Parser)]
#[command(name = "conversa", about = "Session-scoped streaming chat over AWS Bedrock Claude")]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Path to the configuration file.
    #[arg(long, default_value = "conversa.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,conversa=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let config = conversa_infra::config::load_config(&cli.config).await;

    let api_key = std::env::var("BEDROCK_API_KEY")
        .map(SecretString::from)
        .map_err(|_| anyhow::anyhow!("BEDROCK_API_KEY environment variable is required"))?;

    let provider = Arc::new(
        BedrockProvider::new(api_key, &config.model, &config.region)
            .map_err(|e| anyhow::anyhow!("failed to initialize Bedrock provider: {e}"))?,
    );

    let (app_state, store) = AppState::new(provider, &config);
    let sweeper = store.start_sweeper(SWEEP_PERIOD);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Conversa listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {} model {} in {}",
        console::style("·").dim(),
        console::style(&config.model).green(),
        config.region
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    println!("\n  Server stopped.");

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
