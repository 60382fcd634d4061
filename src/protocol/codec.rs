//! Newline framing for protocol messages.
//!
//! A frame is one line of UTF-8 text. Payloads that span several lines
//! (round and game summaries) are escaped on the way out so a raw `\n` only
//! ever appears as the frame delimiter: `\` becomes `\\` and a line break
//! becomes `\n`. [`FrameDecoder`] reverses the escaping for each frame it
//! yields.

use std::fmt::Display;

use super::messages::ProtocolError;

/// Delimiter between frames.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Largest amount of buffered data accepted without seeing a delimiter.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Encode a message as one wire frame, delimiter included.
pub fn encode_frame<M: Display>(message: &M) -> String {
    let mut frame = escape(&message.to_string());
    frame.push(FRAME_DELIMITER as char);
    frame
}

/// Escape backslashes and line breaks so `text` fits on one line.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]. Unknown escape sequences are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits a byte stream into frames, keeping any trailing partial frame
/// until its delimiter arrives.
///
/// Once a partial frame outgrows [`MAX_FRAME_LEN`] it is reported once and
/// everything up to and including its delimiter is dropped.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    discarding: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed newly received bytes and return every complete frame, in
    /// arrival order. Empty frames are skipped and a trailing `\r` is
    /// stripped.
    pub fn feed(&mut self, mut bytes: &[u8]) -> Vec<Result<String, ProtocolError>> {
        if self.discarding {
            match bytes.iter().position(|&b| b == FRAME_DELIMITER) {
                Some(end) => {
                    self.discarding = false;
                    bytes = &bytes[end + 1..];
                }
                None => return Vec::new(),
            }
        }
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..]
            .iter()
            .position(|&b| b == FRAME_DELIMITER)
        {
            let end = start + offset;
            let mut line = &self.buffer[start..end];
            if let [rest @ .., b'\r'] = line {
                line = rest;
            }
            if !line.is_empty() {
                frames.push(match std::str::from_utf8(line) {
                    Ok(text) => Ok(unescape(text)),
                    Err(_) => Err(ProtocolError::InvalidUtf8),
                });
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > MAX_FRAME_LEN {
            self.buffer.clear();
            self.discarding = true;
            frames.push(Err(ProtocolError::FrameTooLong {
                limit: MAX_FRAME_LEN,
            }));
        }

        frames
    }

    /// Bytes held back waiting for a delimiter.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
