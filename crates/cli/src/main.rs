//! Interview gateway binary.
//!
//! Composition root for the workspace:
//!
//! 1. **Load configuration** from the TOML file and overlay the environment.
//! 2. **Wire observability** through `tracing-subscriber`, with an optional
//!    OTLP exporter.
//! 3. **Construct providers** for every section that carries a credential and
//!    inject them into the [`gateway::Gateway`].
//! 4. **Run** either the HTTP listener (`serve`) or a single request read from
//!    a file or stdin (`invoke`).

mod config;
mod telemetry;

use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway::{Gateway, GatewaySettings, ProviderChain};
use interview::{GatewayRequest, LlmProvider};
use llm::{GeminiProvider, HttpTransport, OpenAiProvider};
use tracing::info;

use crate::config::{Config, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "interview-gateway", version, about = "AI provider gateway for mock interviews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP endpoint.
    Serve {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Overrides `[server] listen` and `GATEWAY_LISTEN`.
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Run one request and print the response envelope.
    Invoke {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Path to the request JSON, or `-` for stdin.
        #[arg(long)]
        request: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, listen } => {
            let mut config = load_config(&config)?;
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            let guard = telemetry::init(&config.telemetry)?;
            let result = serve(&config).await;
            guard.shutdown();
            result.map(|()| ExitCode::SUCCESS)
        }
        Command::Invoke { config, request } => {
            let config = load_config(&config)?;
            let guard = telemetry::init(&config.telemetry)?;
            let result = invoke(&config, &request).await;
            guard.shutdown();
            result
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load(path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    config
        .apply_env(|name| std::env::var(name).ok())
        .context("applying environment overrides")?;
    Ok(config)
}

fn build_gateway(config: &Config) -> Result<Gateway> {
    let timeout = config.gateway.attempt_timeout();
    let transport = HttpTransport::new(timeout).context("building HTTP transport")?;

    let primary = config.providers.active_gemini().map(|c| {
        Arc::new(GeminiProvider::new(c.clone(), transport.clone())) as Arc<dyn LlmProvider>
    });
    let secondary = config.providers.active_openai().map(|c| {
        Arc::new(OpenAiProvider::new(c.clone(), transport.clone())) as Arc<dyn LlmProvider>
    });

    let gateway = Gateway::new(
        ProviderChain::new(primary, secondary),
        GatewaySettings {
            attempt_timeout: timeout,
        },
    );
    if gateway.configured_providers().is_empty() {
        tracing::warn!("no provider credentials configured; serving static fallbacks only");
    }
    Ok(gateway)
}

async fn serve(config: &Config) -> Result<()> {
    let gateway = build_gateway(config)?;
    let socket = listener::bind(config.server.listen).await?;
    listener::serve(socket, gateway, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn invoke(config: &Config, source: &str) -> Result<ExitCode> {
    let raw = read_request(source)?;
    let request: GatewayRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing request from {source}"))?;

    let envelope = build_gateway(config)?.handle(request).await;

    println!("{}", serde_json::to_string_pretty(&envelope.body)?);
    Ok(if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_request(source: &str) -> Result<String> {
    if source == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("reading request from stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading request file {source}"))
    }
}
