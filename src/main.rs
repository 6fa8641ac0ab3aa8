// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (diagnostics go to stderr, results to stdout)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
//
// Rust concepts used:
// - #[tokio::main]: turns main() into an async entry point on the tokio runtime
// - Result<T, E> with ?: any error bubbles up to main() and becomes exit code 2
// - match: one arm per subcommand
// =============================================================================

mod cli;
mod config;
mod domain;
mod engine;
mod error;
mod server;
mod sources;
mod wordlist;

#[cfg(test)]
mod testutil;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, TuningArgs};
use config::{DiscoveryConfig, ServerConfig};
use domain::TargetDomain;
use engine::{Discovery, StreamEvent, SubdomainResult};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,subdomain_scout=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { domain, json, tuning } => handle_search(&domain, json, &tuning).await,
        Commands::Stream { domain, json, tuning } => handle_stream(&domain, json, &tuning).await,
        Commands::Serve { port, tuning } => handle_serve(port, &tuning).await,
    }
}

fn load_config(tuning: &TuningArgs) -> Result<DiscoveryConfig> {
    let mut config = DiscoveryConfig::from_env().context("Failed to load configuration")?;
    tuning.apply(&mut config)?;
    Ok(config)
}

fn parse_target(input: &str) -> Result<TargetDomain> {
    TargetDomain::parse(input).with_context(|| format!("Cannot search '{}'", input.trim()))
}

// Handles the 'search' subcommand
async fn handle_search(domain: &str, json: bool, tuning: &TuningArgs) -> Result<i32> {
    // Validate before building anything, so a typo fails fast
    let target = parse_target(domain)?;
    let config = load_config(tuning)?;
    let discovery = Discovery::from_config(&config)?;

    // Banner only in table mode; --json output must stay parseable
    if !json {
        println!("🔍 Discovering subdomains of: {}", target);
        println!("📋 Trying {} wordlist label(s) plus Certificate Transparency logs\n", config.wordlist.len());
    }

    // Waits for every source, then sort so the output is stable between runs
    let mut results = discovery.discover(&target).await;
    results.sort_by(|a, b| a.subdomain.cmp(&b.subdomain));

    print_results(&results, json)?;
    Ok(0)
}

// Handles the 'stream' subcommand
async fn handle_stream(domain: &str, json: bool, tuning: &TuningArgs) -> Result<i32> {
    let target = parse_target(domain)?;
    let config = load_config(tuning)?;
    let discovery = Discovery::from_config(&config)?;

    if !json {
        println!("🔍 Streaming subdomains of: {}\n", target);
    }

    let mut found = 0;
    let mut stream = discovery.discover_streaming(&target);

    // Print in discovery order; the loop ends after the Complete event
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Discovered(result) => {
                found += 1;
                if json {
                    // NDJSON: one compact object per line
                    println!("{}", serde_json::to_string(&result)?);
                } else {
                    println!("   {:<50} {}", result.subdomain, result.source);
                }
            }
            StreamEvent::Complete => {
                if !json {
                    println!("\n✅ Search completed: {} subdomain(s) found", found);
                }
            }
        }
    }

    Ok(0)
}

// Handles the 'serve' subcommand
async fn handle_serve(port: Option<u16>, tuning: &TuningArgs) -> Result<i32> {
    let config = load_config(tuning)?;
    let mut server_config = ServerConfig::from_env().context("Failed to load server configuration")?;
    // --port wins over $PORT
    if let Some(port) = port {
        server_config.port = port;
    }

    let discovery = Discovery::from_config(&config)?;

    println!("Starting subdomain discovery server on {}", server_config.addr());
    server::serve(&server_config, discovery).await?;
    Ok(0)
}

// Prints the results either as a table or JSON
fn print_results(results: &[SubdomainResult], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        print_table(results);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[SubdomainResult]) {
    if results.is_empty() {
        println!("⚠️  No subdomains found");
        return;
    }

    println!("{:<60} {:<30}", "SUBDOMAIN", "SOURCE");
    println!("{}", "=".repeat(90));

    for result in results {
        // Truncate long names so the columns stay aligned
        let name_display = if result.subdomain.chars().count() > 57 {
            format!("{}...", result.subdomain.chars().take(57).collect::<String>())
        } else {
            result.subdomain.clone()
        };

        println!("{:<60} {:<30}", name_display, result.source);
    }

    println!();

    let mut per_source: BTreeMap<&str, usize> = BTreeMap::new();
    for result in results {
        *per_source.entry(result.source.label()).or_default() += 1;
    }

    println!("📊 Summary:");
    for (source, count) in per_source {
        println!("   {}: {}", source, count);
    }
    println!("   📋 Total: {}", results.len());
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why std::process::exit instead of returning from main?
//    - main() can't return an arbitrary exit code directly
//    - run() returns the code, main() hands it to the OS
//
// 2. Why log to stderr?
//    - stdout carries the results (table, JSON, NDJSON)
//    - Keeping logs on stderr means `search --json > out.json` stays valid JSON
//
// 3. What is {:#} in eprintln!?
//    - The alternate Display of anyhow::Error
//    - Prints the whole context chain: "Cannot search 'x': Invalid domain format"
// -----------------------------------------------------------------------------
