use anyhow::Context;
use clap::Parser;
use covenant_core::contract::Contract;
use covenant_mock::config::MockConfig;
use covenant_mock::service::{MockServer, MockService};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve a contract document as a mock provider.
#[derive(Parser, Debug)]
#[command(name = "covenant-mock")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Contract document (JSON) to serve
    #[arg(short, long)]
    file: PathBuf,

    /// Optional YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides config)
    #[arg(long, env = "COVENANT_HOST")]
    host: Option<String>,

    /// Port to bind; 0 auto-assigns (overrides config)
    #[arg(short, long, env = "COVENANT_PORT")]
    port: Option<u16>,

    /// Fail on members the contract does not declare
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MockConfig::from_file(path)?,
        None => MockConfig::default(),
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.strict {
        config.strict = true;
    }

    let contract = Contract::load(&args.file)
        .with_context(|| format!("failed to load contract {}", args.file.display()))?;
    info!(
        consumer = %contract.consumer.name,
        provider = %contract.provider.name,
        interactions = contract.interactions.len(),
        "loaded contract"
    );

    let service = MockService::from_contract(&config, &contract)?;
    let server = MockServer::start(service, &config.host, config.port).await?;
    println!("serving {} at {}", args.file.display(), server.url());

    tokio::signal::ctrl_c().await.ok();

    let report = server.service().verify_all_matched();
    server.shutdown();
    println!("{}", report.describe());
    if !report.success() {
        std::process::exit(1);
    }
    Ok(())
}
