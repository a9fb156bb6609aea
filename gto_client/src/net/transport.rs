//! Framed, blocking transport over a single stream.
//!
//! One request may be in flight at a time. There is no correlation id on
//! the wire, so a reply that is not read to completion leaves the stream
//! out of sync for every later request.

use log::{debug, info, trace, warn};
use std::{
    io::{self, Read, Write},
    sync::Arc,
    thread,
    time::Instant,
};

use super::{
    errors::{ClientError, Result},
    retry::RetryPolicy,
    utils,
};

/// Owns the stream and implements send/receive framing.
#[derive(Debug)]
pub struct Transport<S> {
    stream: Option<S>,
    block_size: usize,
    max_message_size: usize,
    retry: Arc<dyn RetryPolicy>,
    verbose: bool,
}

impl<S: Read + Write> Transport<S> {
    pub fn new(
        stream: S,
        block_size: usize,
        max_message_size: usize,
        retry: Arc<dyn RetryPolicy>,
        verbose: bool,
    ) -> Self {
        Self {
            stream: Some(stream),
            block_size,
            max_message_size,
            retry,
            verbose,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Releases the stream. Later calls fail with [`ClientError::NotConnected`].
    pub fn close(&mut self) -> Option<S> {
        self.stream.take()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn stream(&mut self, operation: &'static str) -> Result<&mut S> {
        self.stream
            .as_mut()
            .ok_or(ClientError::NotConnected { operation })
    }

    fn log_wire(&self, direction: &str, text: &str) {
        if self.verbose {
            info!("{direction} {text}");
        } else {
            trace!("{direction} {text}");
        }
    }

    /// Sends a command wrapped in frame delimiters.
    pub fn send(&mut self, operation: &'static str, command: &str) -> Result<()> {
        let stream = self.stream(operation)?;
        utils::write_framed(stream, command).map_err(|source| match source.kind() {
            io::ErrorKind::WriteZero => ClientError::ConnectionBroken {
                operation,
                reason: "write accepted zero bytes",
            },
            _ => ClientError::Connection { operation, source },
        })?;
        self.log_wire("->", command);
        Ok(())
    }

    /// Performs one raw block read.
    pub fn read_block(&mut self, operation: &'static str) -> Result<Vec<u8>> {
        let block_size = self.block_size;
        let stream = self.stream(operation)?;
        utils::read_block(stream, block_size)
            .map_err(|source| ClientError::Connection { operation, source })
    }

    /// Reads one complete reply, waiting out busy replies.
    ///
    /// Blocks are accumulated until one is shorter than the block size. A
    /// block that is exactly the busy sentinel is dropped, and the read is
    /// retried after the policy's delay. A reply that is an exact multiple of
    /// the block size only ends at the next short (possibly empty) read.
    ///
    /// A reply longer than the maximum message size drops the connection,
    /// since the rest of it would otherwise be read as the next reply.
    pub fn receive(&mut self, operation: &'static str) -> Result<Vec<u8>> {
        self.receive_inner(operation, true)
    }

    /// Reads one complete reply, returning busy replies like any other.
    pub fn receive_raw(&mut self, operation: &'static str) -> Result<Vec<u8>> {
        self.receive_inner(operation, false)
    }

    fn receive_inner(&mut self, operation: &'static str, skip_busy: bool) -> Result<Vec<u8>> {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        let mut message = Vec::new();
        loop {
            let block = self.read_block(operation)?;
            if block.is_empty() {
                if message.is_empty() {
                    return Err(ClientError::ConnectionBroken {
                        operation,
                        reason: "peer closed the connection",
                    });
                }
                break;
            }

            if skip_busy && utils::is_busy(&block) {
                attempt = attempt.saturating_add(1);
                let delay = self.retry.delay(attempt);
                if let Some(max_wait) = self.retry.max_wait() {
                    let waited = started.elapsed();
                    if waited.saturating_add(delay) > max_wait {
                        return Err(ClientError::Timeout { operation, waited });
                    }
                }
                debug!("{operation}: solver busy (attempt {attempt}), retrying in {delay:?}");
                thread::sleep(delay);
                continue;
            }

            if message.len() + block.len() > self.max_message_size {
                warn!(
                    "{operation}: reply exceeded {} bytes, closing the connection",
                    self.max_message_size
                );
                self.close();
                return Err(ClientError::MessageTooLarge {
                    operation,
                    limit: self.max_message_size,
                });
            }

            let complete = block.len() < self.block_size;
            message.extend_from_slice(&block);
            if complete {
                break;
            }
        }

        if self.verbose || log::log_enabled!(log::Level::Trace) {
            self.log_wire("<-", &String::from_utf8_lossy(&message));
        }
        Ok(message)
    }

    /// Reads one reply and decodes it to text without frame delimiters.
    pub fn receive_text(&mut self, operation: &'static str) -> Result<String> {
        let bytes = self.receive(operation)?;
        decode(operation, &bytes)
    }
}

/// Decodes a complete reply, reporting undecodable bytes as a protocol error.
pub(crate) fn decode(operation: &'static str, bytes: &[u8]) -> Result<String> {
    utils::decode_payload(bytes).map_err(|source| ClientError::Protocol {
        operation,
        received: String::from_utf8_lossy(bytes).into_owned(),
        source,
    })
}
