//! Covenant Provider Verifier CLI Tool
//!
//! Replays every interaction of a contract document against a real provider
//! and matches the actual responses with the same matching primitive the
//! mock service uses.
//!
//! Usage:
//!   covenant-verify --provider-url http://localhost:8080 --file consumer-provider.json
//!   covenant-verify --provider-url http://localhost:8080 \
//!       --broker-url https://broker.example.org --provider things --consumer app

use clap::Parser;
use covenant_core::contract::Contract;
use covenant_core::interaction::{ActualResponse, CompiledInteraction};
use covenant_core::matcher::MatchOptions;
use covenant_mock::broker::BrokerClient;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Covenant Provider Verifier - replay a contract against a provider
#[derive(Parser, Debug)]
#[command(name = "covenant-verify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the provider under verification
    #[arg(short = 'u', long)]
    provider_url: String,

    /// Contract document (JSON) to verify
    #[arg(short, long, conflicts_with = "broker_url")]
    file: Option<PathBuf>,

    /// Broker base URL to fetch the contract from
    #[arg(long)]
    broker_url: Option<String>,

    /// Provider name (for broker lookup)
    #[arg(long)]
    provider: Option<String>,

    /// Consumer name (for broker lookup)
    #[arg(long)]
    consumer: Option<String>,

    /// Bearer token for the broker
    #[arg(long, env = "COVENANT_BROKER_TOKEN")]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,

    /// Fail on members the contract does not declare
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let contract = load_contract(&args).await?;
    println!(
        "{BOLD}Verifying {} -> {} ({} interactions) against {}{RESET}",
        contract.consumer.name,
        contract.provider.name,
        contract.interactions.len(),
        args.provider_url
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;
    let options = if args.strict {
        MatchOptions::strict()
    } else {
        MatchOptions::default()
    };
    let base_url = args.provider_url.trim_end_matches('/');

    let mut failures = 0usize;
    for interaction in contract.interactions {
        let description = interaction.description.clone();
        let compiled = CompiledInteraction::compile(interaction)?;
        match replay(&client, base_url, &compiled).await {
            Ok(actual) => {
                let result = compiled.match_response(&actual, &options);
                if result.success() {
                    println!("  {GREEN}ok{RESET} {description}");
                } else {
                    failures += 1;
                    println!("  {RED}failed{RESET} {description}");
                    for mismatch in &result.mismatches {
                        println!("    {DIM}{}{RESET}", mismatch.describe());
                    }
                }
            }
            Err(e) => {
                failures += 1;
                println!("  {RED}error{RESET} {description}");
                println!("    {DIM}{e}{RESET}");
            }
        }
        if args.verbose {
            let request = &compiled.interaction().request;
            println!("    {DIM}{} {}{RESET}", request.method, request.path);
        }
    }

    if failures > 0 {
        println!("{RED}{BOLD}{failures} interaction(s) failed{RESET}");
        std::process::exit(1);
    }
    println!("{GREEN}{BOLD}all interactions verified{RESET}");
    Ok(())
}

async fn load_contract(args: &Args) -> anyhow::Result<Contract> {
    if let Some(file) = &args.file {
        return Ok(Contract::load(file)?);
    }
    if let Some(broker_url) = &args.broker_url {
        let (Some(provider), Some(consumer)) = (&args.provider, &args.consumer) else {
            anyhow::bail!("--broker-url requires --provider and --consumer");
        };
        let mut broker = BrokerClient::new(broker_url.clone());
        if let Some(token) = &args.token {
            broker = broker.with_token(token.clone());
        }
        return Ok(broker.fetch_latest(provider, consumer).await?);
    }
    anyhow::bail!("either --file or --broker-url is required");
}

/// Send one interaction's request and reduce the provider's response to the
/// fields the matcher consults.
async fn replay(
    client: &reqwest::Client,
    base_url: &str,
    compiled: &CompiledInteraction,
) -> anyhow::Result<ActualResponse> {
    let expected = &compiled.interaction().request;
    let mut url = format!("{base_url}{}", expected.path);
    if let Some(query) = &expected.query {
        url.push('?');
        url.push_str(query);
    }

    let method = reqwest::Method::from_bytes(expected.method.as_bytes())?;
    let mut request = client.request(method, &url);
    for (name, value) in &expected.headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &expected.body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some(value),
            Err(_) => {
                // Leave the body in place as a mismatch the matcher will
                // report against the expectation.
                return Ok(ActualResponse {
                    status,
                    headers,
                    body: Some(Value::String(text)),
                });
            }
        }
    };

    Ok(ActualResponse {
        status,
        headers,
        body,
    })
}
