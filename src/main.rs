//! rstore server entry point.
//!
//! Parses the configuration, builds the partitions and the shared
//! dispatcher, then serves clients until Ctrl+C.

use anyhow::Context;
use clap::Parser;
use rstore::commands::Dispatcher;
use rstore::config::ServerConfig;
use rstore::connection::{handle_connection, ConnectionStats};
use rstore::router::PartitionRouter;
use rstore::storage::BackendStats;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config);

    let (router, partitions) = PartitionRouter::in_memory_with_handles(usize::from(config.partitions));
    info!(partitions = router.len(), "Partitions initialized");

    // One dispatcher shared by every connection
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(router)));
    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(
        version = rstore::VERSION,
        address = %config.bind_address(),
        commands = dispatcher.table().len(),
        "rstore listening"
    );

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, stopping server..."),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    };

    tokio::select! {
        _ = accept_loop(listener, dispatcher, Arc::clone(&stats)) => {}
        _ = shutdown => {}
    }

    for (index, partition) in partitions.iter().enumerate() {
        let BackendStats { keys, reads, writes } = partition.stats();
        info!(partition = index, keys, reads, writes, "Partition stats");
    }
    info!(
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Accepts clients forever, one task per connection.
async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let dispatcher = Arc::clone(&dispatcher);
                let stats = Arc::clone(&stats);
                tokio::spawn(async move {
                    handle_connection(stream, addr, dispatcher, stats).await;
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }
}
