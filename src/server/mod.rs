//! Readiness-driven dispatch loop.
//!
//! A single thread owns every socket. The listener and all accepted
//! connections are non-blocking and registered with a `mio` poll for
//! readable events (edge-triggered: one notification per transition to
//! readable). Each connection gets exactly one bounded read, one dispatch
//! into the ledger, and an unconditional close with no reply, so a single
//! read per notification is always sufficient.
//!
//! The loop re-checks the book's operational flag once per event batch.
//! With no connection activity it stays blocked in the poll indefinitely,
//! so a shutdown initiator must provide one wake-up event (any connection)
//! after clearing the flag.

pub mod command;

use std::collections::HashMap;
use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::Arc;

use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};

use crate::orderbook::{render_depth, OrderBook, Side};
use command::{fixed_ask, fixed_bid, Request};

const LISTENER: Token = Token(0);

/// Bounded per-connection read size; commands are far shorter.
const READ_BUFFER_LEN: usize = 1024;

/// The dispatch loop: accepts connections, reads one command each, and
/// applies it to the shared book.
///
/// Setup failures out of [`DispatchServer::bind`] are fatal to the process;
/// per-connection failures inside [`DispatchServer::run`] are logged and the
/// offending connection is skipped.
pub struct DispatchServer {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, TcpStream>,
    next_token: usize,
    book: Arc<OrderBook>,
}

impl DispatchServer {
    /// Bind the listening endpoint and register it with the poll.
    pub fn bind(addr: SocketAddr, book: Arc<OrderBook>) -> io::Result<Self> {
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)?;

        Ok(Self {
            poll,
            listener,
            connections: HashMap::new(),
            next_token: LISTENER.0 + 1,
            book,
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the book's operational flag is cleared and a wake-up
    /// event lets the loop observe it. Poll failures are fatal.
    pub fn run(mut self) -> io::Result<()> {
        let mut events = Events::with_capacity(64);
        info!("dispatch loop serving on {}", self.listener.local_addr()?);

        while self.book.is_operational() {
            if let Err(err) = self.poll.poll(&mut events, None) {
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_pending(),
                    token => self.serve_connection(token),
                }
            }
        }

        info!("dispatch loop stopped");
        Ok(())
    }

    /// Drain the accept queue; required under edge-triggered notification.
    fn accept_pending(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut connection, peer)) => {
                    let token = Token(self.next_token);
                    self.next_token += 1;

                    if let Err(err) =
                        self.poll
                            .registry()
                            .register(&mut connection, token, Interest::READABLE)
                    {
                        warn!("failed to register connection from {peer}: {err}");
                        continue;
                    }
                    debug!("accepted connection from {peer}");
                    self.connections.insert(token, connection);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    warn!("accept failed: {err}");
                    break;
                }
            }
        }
    }

    /// One bounded read, one dispatch, then close. The connection never
    /// gets a reply; closure is the only acknowledgement.
    fn serve_connection(&mut self, token: Token) {
        let Some(mut connection) = self.connections.remove(&token) else {
            return;
        };

        let mut buffer = [0u8; READ_BUFFER_LEN];
        match connection.read(&mut buffer) {
            Ok(n) => self.dispatch(&buffer[..n]),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                // No data yet; leave the connection registered for the next
                // readable transition.
                self.connections.insert(token, connection);
                return;
            }
            Err(err) => warn!("read failed on client connection: {err}"),
        }

        let _ = self.poll.registry().deregister(&mut connection);
        // Dropping the stream closes it.
    }

    fn dispatch(&self, payload: &[u8]) {
        match Request::parse(payload) {
            Some(Request::InsertBid) => {
                let (price, quantity) = fixed_bid();
                self.book.insert(Side::Bid, price, quantity);
            }
            Some(Request::InsertAsk) => {
                let (price, quantity) = fixed_ask();
                self.book.insert(Side::Ask, price, quantity);
            }
            Some(Request::DisplayOrderBook) => {
                // Console-only: the requesting connection never sees this.
                println!("{}", render_depth(&self.book.snapshot()));
            }
            None => debug!("ignoring unrecognized request of {} bytes", payload.len()),
        }
    }
}
