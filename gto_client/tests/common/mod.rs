//! An in-process stand-in for the solver's socket listener.
//!
//! Serves a two-street toy tree: OOP acts first on a 2d2c2h3d3c board with
//! `Bet 1` or `Check`, then IP responds. Each accepted connection gets its
//! own thread and its own position in the tree.

#![allow(dead_code)]

use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::Duration,
};

use gto_client::{
    ConnectionConfig, FixedInterval,
    messages::{BUSY, CONNECTED_BANNER, FILE_LOADED, START_OF_TREE},
};

/// Gap between consecutive unsolicited writes so each arrives as its own read.
const WRITE_GAP: Duration = Duration::from_millis(40);

pub const BOARD: &str = "2d2c2h3d3c";
pub const OOP_HANDS: [&str; 3] = ["AhAs", "KhKs", "QhQs"];
pub const IP_HANDS: [&str; 3] = ["AdAc", "KdKc", "QdQc"];

#[derive(Clone, Debug)]
pub struct MockOptions {
    pub banner: String,
    /// Busy replies sent before the answer to each `Load file`.
    pub busy_on_load: usize,
    /// Busy replies sent before the answer to each `Request node data`.
    pub busy_on_node: usize,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            banner: CONNECTED_BANNER.to_string(),
            busy_on_load: 0,
            busy_on_node: 0,
        }
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Client settings tuned for the mock: no settle delay, fast polling.
pub fn test_config(addr: SocketAddr) -> ConnectionConfig {
    ConnectionConfig::new(addr.ip().to_string(), addr.port())
        .with_settle_delay(Duration::ZERO)
        .with_retry(FixedInterval::new(Duration::from_millis(5)))
        .with_read_timeout(Some(Duration::from_secs(5)))
}

/// Start a mock solver on an ephemeral port.
pub fn spawn(options: MockOptions) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let options = options.clone();
            thread::spawn(move || Session::new(stream, options).run());
        }
    });
    addr
}

/// A port with nothing listening on it.
pub fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Labels of the actions available after `line`, and who takes them.
fn node(line: &[usize]) -> Option<(&'static str, Vec<&'static str>)> {
    match line {
        [] => Some(("OOP", vec!["Bet 1", "Check"])),
        [0] => Some(("IP", vec!["Call", "Fold"])),
        [1] => Some(("IP", vec!["Bet 1", "Check"])),
        _ => None,
    }
}

struct Session {
    stream: TcpStream,
    options: MockOptions,
    buffer: Vec<u8>,
    line: Vec<usize>,
}

impl Session {
    fn new(stream: TcpStream, options: MockOptions) -> Self {
        Self {
            stream,
            options,
            buffer: Vec::new(),
            line: Vec::new(),
        }
    }

    fn run(mut self) {
        while let Some(command) = self.next_command() {
            if self.handle(&command).is_err() {
                break;
            }
        }
    }

    /// Reads until one complete `~command~` frame is buffered.
    fn next_command(&mut self) -> Option<String> {
        loop {
            let delimiters: Vec<usize> = self
                .buffer
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == b'~')
                .map(|(i, _)| i)
                .take(2)
                .collect();
            if let [start, end] = delimiters[..] {
                let command = String::from_utf8_lossy(&self.buffer[start + 1..end]).into_owned();
                self.buffer.drain(..=end);
                return Some(command);
            }
            let mut chunk = [0u8; 1024];
            match self.stream.read(&mut chunk) {
                Ok(0) | Err(_) => return None,
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
            }
        }
    }

    fn reply(&mut self, payload: &str) -> std::io::Result<()> {
        self.stream.write_all(format!("~{payload}~").as_bytes())?;
        self.stream.flush()
    }

    fn reply_after_busy(&mut self, busy: usize, payload: &str) -> std::io::Result<()> {
        for _ in 0..busy {
            self.reply(BUSY)?;
            thread::sleep(WRITE_GAP);
        }
        self.reply(payload)
    }

    fn handle(&mut self, command: &str) -> std::io::Result<()> {
        if command == "init" {
            self.reply("Connection accepted")?;
            thread::sleep(WRITE_GAP);
            let banner = self.options.banner.clone();
            return self.reply(&banner);
        }
        if let Some(path) = command.strip_prefix("Load file: ") {
            let reply = if path.ends_with(".gto") {
                self.line.clear();
                FILE_LOADED.to_string()
            } else {
                format!("Could not load file: {path}")
            };
            return self.reply_after_busy(self.options.busy_on_load, &reply);
        }
        if let Some(index) = command.strip_prefix("Take action: ") {
            let reply = match (index.parse::<usize>(), node(&self.line)) {
                (Ok(index), Some((_, actions))) if index < actions.len() => {
                    self.line.push(index);
                    "Action taken.".to_string()
                }
                _ => "Invalid action.".to_string(),
            };
            return self.reply(&reply);
        }
        let reply = match command {
            "Request node data" => {
                let data = self.node_data();
                return self.reply_after_busy(self.options.busy_on_node, &data);
            }
            "Request action data" => {
                let actions = node(&self.line).map(|(_, a)| a).unwrap_or_default();
                format!("[Action data: {}]", actions.join(","))
            }
            "Request pot/stacks" => "[Pot and stacks][Pot: 1][OOP Stack: 1][IP Stack: 1]".to_string(),
            "Request current line" => self.current_line(),
            "Still processing instruction?" => "Ready for instructions.".to_string(),
            _ => "Unknown instruction.".to_string(),
        };
        self.reply(&reply)
    }

    fn current_line(&self) -> String {
        if self.line.is_empty() {
            return START_OF_TREE.to_string();
        }
        let mut labels = Vec::new();
        for depth in 0..self.line.len() {
            if let Some((_, actions)) = node(&self.line[..depth]) {
                labels.push(actions[self.line[depth]]);
            }
        }
        labels.join(",")
    }

    fn node_data(&self) -> String {
        let (acting, actions) = node(&self.line).unwrap_or(("OOP", Vec::new()));
        let block = |role: &str, hands: &[&str]| {
            let equities = ["100.000", "50.000", "0.000"];
            let mut text = if role == acting {
                let mut header = String::from("Hand Combos Equity");
                for action in &actions {
                    header.push_str(&format!(" {}", action.replace(' ', "_")));
                }
                for action in &actions {
                    header.push_str(&format!(" EV_{}", action.replace(' ', "_")));
                }
                format!("{role}, {} hands, {} actions\n{header}\n", hands.len(), actions.len())
            } else {
                format!("{role}, {} hands\nHand Combos Equity\n", hands.len())
            };
            for (i, hand) in hands.iter().enumerate() {
                text.push_str(&format!("{hand} 1 {}", equities[i]));
                if role == acting {
                    // Pure strategy: hand i plays action i % k.
                    let k = actions.len();
                    for a in 0..k {
                        let frequency = if a == i % k { 100.0 } else { 0.0 };
                        text.push_str(&format!(" {frequency:.3}"));
                    }
                    for a in 0..k {
                        text.push_str(&format!(" {:.3}", a as f64 + 0.5));
                    }
                }
                text.push('\n');
            }
            text
        };
        format!(
            "[GTO+ export][Board: {BOARD}][{}][{}]",
            block("OOP", &OOP_HANDS),
            block("IP", &IP_HANDS)
        )
    }
}
