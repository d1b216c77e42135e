use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use obscura_core::Config;
use obscura_node::Node;

/// Launches a single Obscura node. Peers are always on `localhost`,
/// identified by port.
#[derive(Parser)]
#[command(name = "obscura")]
#[command(about = "Obscura node launcher", version)]
struct Cli {
    /// Node name, used only in log output.
    #[arg(long)]
    name: String,

    /// Port to listen on.
    #[arg(long)]
    port: u16,

    /// Node directory: holds `.env` (keypair) and `blockchain.json`.
    #[arg(long)]
    dir: PathBuf,

    /// Enable mining.
    #[arg(long, default_value_t = false)]
    miner: bool,

    /// Peer ports on localhost (e.g. `--peers 5001 5002`).
    #[arg(long, num_args = 0..)]
    peers: Vec<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let peers: Vec<SocketAddr> =
        cli.peers.iter().map(|port| SocketAddr::from(([127, 0, 0, 1], *port))).collect();

    let node = Node::bootstrap(cli.name.clone(), cli.port, cli.dir, cli.miner, peers, Config::default())
        .context("failed to bootstrap node")?;

    tracing::info!(
        name = %cli.name,
        kind = if cli.miner { "miner" } else { "node" },
        port = cli.port,
        pubkey = %node.wallet.public_pem(),
        balance = node.chain.get_balance(&node.wallet.public_pem(), node.config.starting_balance),
        "started",
    );

    node.run().await?;
    Ok(())
}
