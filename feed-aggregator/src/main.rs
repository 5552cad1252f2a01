use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use feed_aggregator::{Aggregator, FetchConfig, OperationRegistry, SourceRouter};
use interfaces::OperationHandler;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Aggregate feed posts through named operations", long_about = None)]
struct Args {
    /// Per-fetch timeout in seconds (overrides FEED_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// User agent sent to feed hosts (overrides FEED_USER_AGENT)
    #[arg(long, global = true)]
    user_agent: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every operation descriptor as JSON
    List,
    /// Invoke an operation and print its result
    Call {
        /// Operation name, e.g. get_trending_memes
        name: String,

        /// JSON object with the operation's input options
        #[arg(short, long, default_value = "{}")]
        input: String,

        /// Print the text rendering instead of the structured payload
        #[arg(long)]
        text: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = FetchConfig::from_env();
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = timeout;
    }
    if let Some(user_agent) = args.user_agent {
        config.user_agent = user_agent;
    }
    let fetch_timeout = config.timeout();

    let router = SourceRouter::new(config).context("failed to build HTTP client")?;
    let aggregator = Aggregator::new(Arc::new(router), fetch_timeout);
    let registry = OperationRegistry::with_default_operations(aggregator);

    match args.command {
        Command::List => {
            println!("{}", serde_json::to_string_pretty(&registry.descriptors())?);
        }
        Command::Call { name, input, text } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&input).context("--input is not valid JSON")?;

            info!("Calling {}", name);
            let result = registry.call(&name, arguments).await;

            if result.is_error {
                for block in &result.content {
                    error!("{}", block.text);
                }
                bail!("operation {} failed", name);
            }

            if text {
                let blocks: Vec<&str> = result.content.iter().map(|c| c.text.as_str()).collect();
                println!("{}", blocks.join("\n\n"));
            } else {
                let structured = result.structured_content.unwrap_or_default();
                println!("{}", serde_json::to_string_pretty(&structured)?);
            }
        }
    }

    Ok(())
}
