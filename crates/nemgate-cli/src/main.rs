//! # nemgate CLI
//!
//! Queries NEM nodes through the failover client and computes transaction
//! deadlines.
//!
//! ## Usage
//!
//! ```bash
//! # Stream all root namespaces as JSON lines, 50 per request
//! nemgate --network testnet -n http://127.0.0.1:7890 namespaces --page-size 50
//!
//! # Look up one namespace, rotating over two nodes
//! nemgate -n http://10.0.0.1:7890 -n http://10.0.0.2:7890 namespace nem
//!
//! # Deadline one hour after the node's network time (ms since nemesis)
//! nemgate deadline --amount 1 --unit hours --node-time 86400000
//! ```
//!
//! Nodes come from `--node` flags, else from `NEMGATE_NODES`
//! (comma-separated), else from the `--config` file, else the network's
//! default node.

use anyhow::{Context, Result};
use argh::FromArgs;
use futures_util::TryStreamExt;
use nemgate_client::{ClientConfig, NamespaceHttp};
use nemgate_common::{DeadlineUnit, NetworkContext, NetworkType, QueryParams, ServerConfig, TimeWindow};
use serde_json::json;
use std::pin::pin;

/// Environment variable holding a comma-separated node list.
const NODES_ENV: &str = "NEMGATE_NODES";

#[derive(FromArgs)]
/// nemgate - failover access to NEM nodes
struct Cli {
    /// node to query, e.g. http://127.0.0.1:7890
    ///
    /// Can be given several times; requests rotate over the nodes and fail
    /// over to the next one on error.
    #[argh(option, short = 'n', long = "node")]
    nodes: Vec<String>,

    /// network to use: mainnet, testnet or mijin
    #[argh(option, default = "\"mainnet\".into()")]
    network: String,

    /// path to a JSON client configuration
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// attempts per request before giving up
    #[argh(option, long = "max-attempts")]
    max_attempts: Option<usize>,

    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Namespaces(NamespacesArgs),
    Namespace(NamespaceArgs),
    Deadline(DeadlineArgs),
}

/// Streams root namespaces, newest first, one JSON object per line.
#[derive(FromArgs)]
#[argh(subcommand, name = "namespaces")]
/// list root namespaces
struct NamespacesArgs {
    /// namespaces per request (5 to 100, node default 25)
    #[argh(option, long = "page-size")]
    page_size: Option<u32>,

    /// start below this database id instead of at the newest namespace
    #[argh(option, long = "start-id")]
    start_id: Option<u64>,

    /// stop after this many pages
    #[argh(option, long = "max-pages")]
    max_pages: Option<usize>,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "namespace")]
/// look up a namespace by name
struct NamespaceArgs {
    /// fully qualified namespace name, e.g. nem or foo.bar
    #[argh(positional)]
    name: String,
}

/// Prints the `timeStamp` / `deadline` pair of a new time window.
///
/// Runs locally; no node is contacted.
#[derive(FromArgs)]
#[argh(subcommand, name = "deadline")]
/// compute a transaction time window
struct DeadlineArgs {
    /// deadline amount, must be positive
    #[argh(option, short = 'a', default = "2")]
    amount: i64,

    /// deadline unit: seconds, minutes or hours
    #[argh(option, short = 'u', default = "\"hours\".into()")]
    unit: String,

    /// node network time in milliseconds since the nemesis block
    #[argh(option, long = "node-time")]
    node_time: Option<u64>,
}

/// Builds the client configuration from the config file, the environment and
/// the command-line flags, in increasing order of precedence.
fn client_config(cli: &Cli, env_nodes: Option<&str>) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => ClientConfig::default(),
    };

    if !cli.nodes.is_empty() {
        config.nodes = cli
            .nodes
            .iter()
            .map(|n| ServerConfig::parse_url(n))
            .collect::<Result<_, _>>()?;
    } else if let Some(list) = env_nodes.filter(|l| !l.trim().is_empty()) {
        config.nodes = ClientConfig::parse_node_list(list)
            .with_context(|| format!("invalid {}", NODES_ENV))?;
    }

    if let Some(max_attempts) = cli.max_attempts {
        config.retry.max_attempts = max_attempts;
    }

    config.validate()?;
    Ok(config)
}

fn network_context(cli: &Cli) -> Result<NetworkContext> {
    let network: NetworkType = cli.network.parse()?;
    let mut ctx = NetworkContext::new();
    ctx.bootstrap(network)?;
    Ok(ctx)
}

fn deadline(args: &DeadlineArgs) -> Result<serde_json::Value> {
    let unit: DeadlineUnit = args.unit.parse()?;
    let window = match args.node_time {
        Some(node_time) => TimeWindow::create_with_node_time_and_deadline(node_time, args.amount, unit)?,
        None => TimeWindow::create_with_deadline(args.amount, unit)?,
    };

    Ok(json!({
        "timeStamp": window.time_stamp_to_dto(),
        "deadline": window.deadline_to_dto(),
        "createdAt": window.created_at().to_rfc3339(),
        "expiresAt": window.expires_at().to_rfc3339(),
    }))
}

async fn list_namespaces(client: &NamespaceHttp, args: &NamespacesArgs) -> Result<()> {
    let params = QueryParams {
        id: args.start_id,
        page_size: args.page_size,
    };
    let mut pages = pin!(client.get_root_namespaces_paginated(params).into_stream());

    let mut fetched = 0;
    let mut total = 0;
    while let Some(page) = pages.try_next().await? {
        for namespace in &page {
            println!("{}", serde_json::to_string(namespace)?);
        }
        fetched += 1;
        total += page.len();
        if args.max_pages.is_some_and(|max| fetched >= max) {
            break;
        }
    }

    tracing::info!("Fetched {} namespaces in {} pages", total, fetched);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // deadline prints a single JSON object and never touches the network;
    // everything else logs to stderr so stdout stays pipeable
    if !matches!(cli.command, Commands::Deadline(_)) {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match &cli.command {
        Commands::Deadline(args) => {
            println!("{}", deadline(args)?);
        }
        Commands::Namespaces(args) => {
            let ctx = network_context(&cli)?;
            let env_nodes = std::env::var(NODES_ENV).ok();
            let config = client_config(&cli, env_nodes.as_deref())?;
            let client = NamespaceHttp::new(&ctx, &config)?;
            tracing::info!(
                "Querying {} node(s) on {:?}",
                client.endpoint().dispatcher().pool().len(),
                ctx.network_type()?
            );
            list_namespaces(&client, args).await?;
        }
        Commands::Namespace(args) => {
            let ctx = network_context(&cli)?;
            let env_nodes = std::env::var(NODES_ENV).ok();
            let config = client_config(&cli, env_nodes.as_deref())?;
            let client = NamespaceHttp::new(&ctx, &config)?;
            let namespace = client.get_namespace(&args.name).await?;
            println!("{}", serde_json::to_string(&namespace)?);
        }
    }

    Ok(())
}
