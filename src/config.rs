use clap::Parser;
use std::net::{AddrParseError, SocketAddr};

/// Command-line configuration for the order book server.
#[derive(Parser, Debug)]
#[command(
    name = "orderbook-server",
    about = "Serves a price-ordered order book over a one-shot TCP command protocol"
)]
pub struct Config {
    /// Host the dispatch loop listens on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port the dispatch loop listens on
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Number of random bid/ask pairs the generator seeds
    #[arg(long, default_value_t = 1000)]
    pub orders: usize,

    /// Seconds to keep serving before the cooperative shutdown
    #[arg(long, default_value_t = 60)]
    pub run_for: u64,
}

impl Config {
    /// The listening endpoint as a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
