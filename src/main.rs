use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orderbook_server::{generator, Config, DispatchServer, OrderBook};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    let addr = config.listen_addr()?;

    let book = Arc::new(OrderBook::new());

    // Setup failures (bind, poll registration) are fatal.
    let server = DispatchServer::bind(addr, Arc::clone(&book))?;
    let server_thread = thread::spawn(move || server.run());

    generator::generate_random_orders(&book, config.orders);

    thread::sleep(Duration::from_secs(config.run_for));

    info!("shutting down");
    book.set_operational(false);
    // The dispatch loop only re-checks the flag after a wake-up; one
    // throwaway connection guarantees it observes the shutdown.
    let _ = TcpStream::connect(addr);

    server_thread
        .join()
        .map_err(|_| "dispatch thread panicked")??;

    Ok(())
}
