//! A blocking GTO+ client.
//!
//! Every operation sends one command and reads its reply before returning,
//! so a client is strictly request/response. Open one client per concurrent
//! session; clients share nothing.

use log::{debug, info, warn};
use std::{
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
    path::Path,
    thread,
};

use super::{
    errors::{ClientError, Result},
    messages::{BUSY, CONNECTED_BANNER, Command},
    transport::{self, Transport},
};
use crate::{
    config::ConnectionConfig,
    game::{
        entities::{ActionPath, NodeData, PotStacks},
        parser::{self, ParseError},
    },
};

/// A session with a running solver.
pub struct GtoClient<S = TcpStream> {
    config: ConnectionConfig,
    transport: Transport<S>,
}

impl GtoClient<TcpStream> {
    /// Connect to the solver and perform the `init` handshake.
    ///
    /// Each resolved address is tried once; there is no reconnect loop.
    ///
    /// # Returns
    ///
    /// Returns the connected client and the banner the solver replied with.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `config` fails validation,
    /// [`ClientError::Connection`] if the socket cannot be opened and
    /// [`ClientError::UnexpectedBanner`] if the solver's reply is not the
    /// connection banner. In the latter case the socket is closed.
    pub fn connect(config: ConnectionConfig) -> Result<(Self, String)> {
        let operation = Command::Init.operation();
        config.validate()?;
        let addrs = config
            .addr()
            .to_socket_addrs()
            .map_err(|source| ClientError::Connection { operation, source })?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, config.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(config.read_timeout)
                        .and_then(|()| stream.set_write_timeout(config.write_timeout))
                        .and_then(|()| stream.set_nodelay(true))
                        .map_err(|source| ClientError::Connection { operation, source })?;
                    info!("connected to solver at {addr}");
                    let mut client = Self::from_stream(stream, config)?;
                    let banner = client.handshake()?;
                    return Ok((client, banner));
                }
                Err(error) => {
                    debug!("couldn't connect to {addr}: {error}");
                    last_error = Some(error);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("{} did not resolve to any address", config.addr()),
            )
        });
        Err(ClientError::Connection { operation, source })
    }
}

impl<S: Read + Write> GtoClient<S> {
    /// Wrap an already-open stream. Call [`Self::handshake`] before issuing requests.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `config` fails validation.
    pub fn from_stream(stream: S, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::new(
            stream,
            config.block_size,
            config.max_message_size,
            config.retry.clone(),
            config.verbose,
        );
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    /// Send `init` and check the solver's banner.
    ///
    /// The first block after `init` is a handshake artifact and is discarded;
    /// the second carries the banner. Any failure closes the connection.
    pub fn handshake(&mut self) -> Result<String> {
        let result = self.exchange_banner();
        if result.is_err() {
            self.transport.close();
        }
        result
    }

    fn exchange_banner(&mut self) -> Result<String> {
        let operation = Command::Init.operation();
        self.transport.send(operation, &Command::Init.to_string())?;
        let _ = self.transport.read_block(operation)?;
        let block = self.transport.read_block(operation)?;
        if block.is_empty() {
            return Err(ClientError::ConnectionBroken {
                operation,
                reason: "peer closed the connection during the handshake",
            });
        }
        let banner = transport::decode(operation, &block)?;
        if banner != CONNECTED_BANNER {
            warn!("unexpected banner from solver: {banner:?}");
            return Err(ClientError::UnexpectedBanner { received: banner });
        }
        Ok(banner)
    }

    /// Close the connection. Closing twice is harmless.
    pub fn disconnect(&mut self) {
        if self.transport.close().is_none() {
            warn!("trying to close an unopened connection");
        } else {
            debug!("disconnected from solver");
        }
    }

    /// Send a command and read its complete reply as text.
    fn request(&mut self, command: &Command) -> Result<String> {
        let operation = command.operation();
        self.transport.send(operation, &command.to_string())?;
        if command.settles() && !self.config.settle_delay.is_zero() {
            thread::sleep(self.config.settle_delay);
        }
        self.transport.receive_text(operation)
    }

    /// Load a solve file. The solver's reply is returned verbatim; see
    /// [`crate::is_file_loaded`].
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let reply = self.request(&Command::LoadFile(path.as_ref().to_path_buf()))?;
        info!("load file {}: {reply}", path.as_ref().display());
        Ok(reply)
    }

    /// Legal actions at the current node, in `take_action` index order.
    pub fn get_action_data(&mut self) -> Result<Vec<String>> {
        let command = Command::RequestActionData;
        let reply = self.request(&command)?;
        parser::parse_action_data(&reply).map_err(|source| ClientError::Protocol {
            operation: command.operation(),
            received: reply,
            source,
        })
    }

    /// Board, ranges and acting strategy at the current node.
    ///
    /// Issues `Request node data` and then `Request action data` back to back,
    /// so the strategy columns are labelled with the same node's actions.
    pub fn get_node_data(&mut self) -> Result<NodeData> {
        let command = Command::RequestNodeData;
        let reply = self.request(&command)?;
        let actions = self.get_action_data()?;
        parser::parse_node_data(&reply, &actions).map_err(|source| ClientError::Protocol {
            operation: command.operation(),
            received: reply,
            source,
        })
    }

    pub fn get_pot_stacks(&mut self) -> Result<PotStacks> {
        let command = Command::RequestPotStacks;
        let reply = self.request(&command)?;
        parser::parse_pot_stacks(&reply).map_err(|source| ClientError::Protocol {
            operation: command.operation(),
            received: reply,
            source,
        })
    }

    /// Actions taken from the root to the current node; empty at the root.
    pub fn get_current_line(&mut self) -> Result<ActionPath> {
        let reply = self.request(&Command::RequestCurrentLine)?;
        Ok(parser::parse_current_line(&reply))
    }

    /// Move to the child reached by the action at `index`.
    pub fn take_action(&mut self, index: usize) -> Result<()> {
        let ack = self.request(&Command::TakeAction(index))?;
        debug!("take action {index}: {ack}");
        Ok(())
    }

    /// Take the action with the given label at the current node.
    ///
    /// # Returns
    ///
    /// The index of the action taken.
    pub fn take_action_by_label(&mut self, label: &str) -> Result<usize> {
        let actions = self.get_action_data()?;
        let index = actions
            .iter()
            .position(|action| action == label)
            .ok_or_else(|| ClientError::Protocol {
                operation: Command::TakeAction(0).operation(),
                received: actions.join(","),
                source: ParseError::UnknownAction(label.to_string()),
            })?;
        self.take_action(index)?;
        Ok(index)
    }

    /// Ask whether the solver is still working on the previous instruction.
    pub fn still_processing(&mut self) -> Result<bool> {
        let command = Command::StillProcessing;
        let operation = command.operation();
        self.transport.send(operation, &command.to_string())?;
        let bytes = self.transport.receive_raw(operation)?;
        Ok(transport::decode(operation, &bytes)? == BUSY)
    }
}
