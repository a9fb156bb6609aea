use std::{fmt, path::PathBuf};

/// Sentinel wrapped around every message in both directions.
pub const DELIMITER: char = '~';

/// Reply meaning "no answer yet"; never the answer to a request.
pub const BUSY: &str = "Solver still running. Please try again later.";

/// Handshake reply of a usable connection.
pub const CONNECTED_BANNER: &str = "You are connected to GTO+";

/// Reply to `Request current line` at the root of the tree.
pub const START_OF_TREE: &str = "Hand is at start of tree.";

/// Reply to a successful `Load file`.
pub const FILE_LOADED: &str = "File successfully loaded.";

/// A command understood by the solver.
///
/// Each command has exactly one reply; which shape that reply takes is fixed
/// per command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Opens a session; answered by [`CONNECTED_BANNER`].
    Init,
    /// Loads a solve file from the solver's filesystem.
    LoadFile(PathBuf),
    /// Board and both ranges at the current node.
    RequestNodeData,
    /// Legal action labels at the current node.
    RequestActionData,
    RequestPotStacks,
    RequestCurrentLine,
    /// Moves to the child reached by the action at this index.
    TakeAction(usize),
    /// Asks whether the previous instruction is still being processed.
    StillProcessing,
}

impl Command {
    /// Short name used when reporting failures.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Init => "connect",
            Self::LoadFile(_) => "load_file",
            Self::RequestNodeData => "get_node_data",
            Self::RequestActionData => "get_action_data",
            Self::RequestPotStacks => "get_pot_stacks",
            Self::RequestCurrentLine => "get_current_line",
            Self::TakeAction(_) => "take_action",
            Self::StillProcessing => "still_processing",
        }
    }

    /// Whether the solver starts asynchronous work on this command, so the
    /// reply should only be read after the settle delay.
    pub fn settles(&self) -> bool {
        matches!(self, Self::LoadFile(_) | Self::RequestNodeData | Self::TakeAction(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::LoadFile(path) => write!(f, "Load file: {}", path.display()),
            Self::RequestNodeData => write!(f, "Request node data"),
            Self::RequestActionData => write!(f, "Request action data"),
            Self::RequestPotStacks => write!(f, "Request pot/stacks"),
            Self::RequestCurrentLine => write!(f, "Request current line"),
            Self::TakeAction(index) => write!(f, "Take action: {index}"),
            Self::StillProcessing => write!(f, "Still processing instruction?"),
        }
    }
}
