use clap::Parser;
use replidoc::{NodeConfig, NodeOptions};
use slog::Drain;
use std::error::Error;
use std::net::SocketAddr;
use tokio::time::Duration;

/// Runs one replidoc node until Ctrl-C.
#[derive(Parser)]
#[command(name = "replidoc")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to serve the document gRPC service on
    #[arg(short, long, default_value = "0.0.0.0:7000")]
    listen: SocketAddr,

    /// Source label for writes made on this node. Must be unique in the cluster.
    #[arg(short, long)]
    source: String,

    /// Peer to gossip with, as host:port or full URI. Repeat for more peers.
    #[arg(short, long = "peer")]
    peers: Vec<String>,

    /// Wait between attempts to reconnect to a peer
    #[arg(long, default_value_t = 5000)]
    reconnect_backoff_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let logger = create_root_logger_for_stdout();

    let config = NodeConfig {
        source: args.source,
        listen_addr: Some(args.listen),
        peers: args.peers,
        logger: logger.clone(),
        options: NodeOptions {
            reconnect_backoff: Some(Duration::from_millis(args.reconnect_backoff_ms)),
            ..NodeOptions::default()
        },
    };
    let node = replidoc::try_create_node(config).await?;

    tokio::signal::ctrl_c().await?;
    slog::info!(logger, "Received Ctrl-C.");
    node.shutdown();

    // Give the server and gossip sessions a moment to close their streams.
    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}

fn create_root_logger_for_stdout() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!())
}
