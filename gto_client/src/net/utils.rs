//! Message framing helpers.
//!
//! Messages travel as `~payload~` in UTF-8 with no length prefix. Writers may
//! accept fewer bytes than offered, and readers see a message end only when a
//! read returns fewer bytes than the block size.

use std::io::{self, Read, Write};

use super::messages::{BUSY, DELIMITER};
use crate::game::parser::ParseError;

/// Block size of the reference solver.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Wraps a payload in frame delimiters.
pub fn create_message(message: &str) -> String {
    format!("{DELIMITER}{message}{DELIMITER}")
}

/// Removes one frame delimiter from each end of a received payload.
///
/// Padding the solver leaves around the frame (whitespace, NUL bytes) is
/// dropped first. A payload without delimiters is returned as is.
pub fn strip_delimiters(payload: &str) -> &str {
    let payload = payload.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    let payload = payload.strip_prefix(DELIMITER).unwrap_or(payload);
    payload.strip_suffix(DELIMITER).unwrap_or(payload)
}

/// Decodes a complete reply and strips its delimiters.
pub fn decode_payload(bytes: &[u8]) -> Result<String, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8)?;
    Ok(strip_delimiters(text).to_string())
}

/// Whether a single block is the busy sentinel.
pub fn is_busy(block: &[u8]) -> bool {
    std::str::from_utf8(block).is_ok_and(|text| strip_delimiters(text) == BUSY)
}

/// Writes a framed message, looping over partial writes.
///
/// A write that makes no progress means the peer is gone and yields
/// [`io::ErrorKind::WriteZero`]; it is not retried.
pub fn write_framed<W: Write>(writer: &mut W, message: &str) -> io::Result<usize> {
    let buf = create_message(message).into_bytes();
    let mut total_sent = 0;
    while total_sent < buf.len() {
        match writer.write(&buf[total_sent..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "socket connection broken",
                ));
            }
            Ok(sent) => total_sent += sent,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    writer.flush()?;
    Ok(total_sent)
}

/// Performs a single read of at most `block_size` bytes.
///
/// An empty result means the peer closed its end.
pub fn read_block<R: Read>(reader: &mut R, block_size: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0; block_size];
    loop {
        match reader.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                return Ok(buf);
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}
