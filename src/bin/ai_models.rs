//! ai-models: list the models of every provider with a credential.
//!
//! Usage:
//!   ai-models [--verbose]
//!
//! Environment:
//!   CORETHINK_API_KEY     Credential for the built-in provider
//!   AI_CONFIG             Configuration file (YAML or JSON)
//!   AI_CONFIG_CONTENT     Inline configuration, wins over AI_CONFIG
//!   AI_CREDENTIAL_STORE   file (default) or keyring
//!   RUST_LOG              Log filter (default: warn)

use ai_provider_runtime::Dispatcher;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!(
        r#"ai-models — list available models

USAGE:
    ai-models [--verbose]

OPTIONS:
    -v, --verbose    Print each model descriptor as JSON (costs, limits, capabilities)
    -h, --help       Show this help message"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut verbose = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    let dispatcher = Dispatcher::from_env()?;
    let providers = dispatcher.list_providers().await?;
    if providers.is_empty() {
        eprintln!("Error: no providers available. Please set CORETHINK_API_KEY environment variable.");
        std::process::exit(1);
    }

    for (provider_id, provider) in &providers {
        for (model_id, model) in &provider.models {
            println!("{provider_id}/{model_id}");
            if verbose {
                println!("{}", serde_json::to_string_pretty(model)?);
            }
        }
    }
    Ok(())
}
