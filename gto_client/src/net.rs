//! Networking layer for talking to the solver.
//!
//! Messages are `~`-delimited UTF-8 text over a plain TCP stream, read in
//! fixed-size blocks. The solver answers "still running" until a reply is
//! ready, which the transport waits out according to a [`retry::RetryPolicy`].

/// Blocking session client.
pub mod client;

/// Client error types.
pub mod errors;

/// Commands and sentinel replies.
pub mod messages;

/// Busy-retry policies.
pub mod retry;

/// Framed send/receive over a stream.
pub mod transport;

/// Framing helpers.
pub mod utils;
