//! Server configuration from the command line.

use crate::{DEFAULT_HOST, DEFAULT_PARTITIONS, DEFAULT_PORT};
use clap::Parser;

/// rstore - partitioned in-memory key-value server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of in-memory partitions the keyspace is split across
    #[arg(long, default_value_t = DEFAULT_PARTITIONS, value_parser = clap::value_parser!(u16).range(1..))]
    pub partitions: u16,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            partitions: DEFAULT_PARTITIONS,
            log_level: "info".to_string(),
        }
    }
}
