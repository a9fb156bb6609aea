//! # GTO Client
//!
//! A blocking client for the TCP interface of the GTO+ poker solver.
//!
//! The solver speaks a line-oriented text protocol: every message is wrapped
//! in `~` delimiters, there is no length prefix, and a reply ends when a
//! socket read returns less than a full block. While the solver is working it
//! answers with a busy sentinel, which the client waits out transparently.
//!
//! ## Core Modules
//!
//! - [`net`]: Transport framing, busy-retry and the [`GtoClient`] session
//! - [`game`]: Typed node data (board, ranges, actions) and response parsers
//! - [`config`]: Per-connection settings
//!
//! ## Example
//!
//! ```no_run
//! use gto_client::{ConnectionConfig, GtoClient};
//!
//! let (mut solver, _banner) = GtoClient::connect(ConnectionConfig::default())?;
//! solver.load_file("/solves/AKQ-Game.gto")?;
//! let node = solver.get_node_data()?;
//! println!("{} to act, actions: {:?}", node.next_to_act, node.actions);
//! solver.take_action(0)?;
//! solver.disconnect();
//! # Ok::<(), gto_client::ClientError>(())
//! ```

/// Per-connection configuration.
pub mod config;
pub use config::{ConfigError, ConnectionConfig};

/// Game-tree entities and response parsers.
pub mod game;
pub use game::{
    ActionPath, ActionStrategy, Card, NodeData, ParseError, PotStacks, RangeEntry, Role,
    RoleRange, Suit,
};

/// Networking components (framing, retry, client).
pub mod net;
pub use net::{
    client::GtoClient,
    errors::{ClientError, Result},
    messages::{self, Command},
    retry::{ExponentialBackoff, FixedInterval, RetryPolicy},
};

/// Whether a `load_file` reply reports success.
pub fn is_file_loaded(reply: &str) -> bool {
    reply == messages::FILE_LOADED
}
