//! Incremental splitter for a stream of JSON values.
//!
//! Push query responses are a JSON array written one element at a time, or a
//! sequence of newline-delimited values. [`JsonFrameCodec`] cuts complete
//! top-level values out of the byte buffer as soon as their last byte
//! arrives, skipping whitespace and the array punctuation between them, and
//! never buffers more than the value currently being assembled.

use bytes::{Buf, BytesMut};
use serde_json::Value as JsonValue;
use tokio_util::codec::Decoder;

use crate::error::KsqlLinkError;

/// Default upper bound for a single frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 << 20; // 16 MiB

/// How values are laid out in the body, decided by its first bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Undecided,
    /// `[v1, v2, ...]`
    Array,
    /// `v1\nv2\n...`
    Delimited,
    /// The enclosing array has been closed
    Closed,
}

#[derive(Debug)]
pub struct JsonFrameCodec {
    max_frame_bytes: usize,
    layout: Layout,
    /// A value has begun at buf[0]
    started: bool,
    /// Bytes of the current value already scanned
    scanned: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Default for JsonFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl JsonFrameCodec {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            max_frame_bytes,
            layout: Layout::Undecided,
            started: false,
            scanned: 0,
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    fn reset(&mut self) {
        self.started = false;
        self.scanned = 0;
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
    }

    /// Scan forward from where the previous call stopped. Returns the length
    /// of the completed value, if its end is in the buffer.
    fn scan(&mut self, buf: &[u8]) -> Result<Option<usize>, KsqlLinkError> {
        let mut i = self.scanned;
        while i < buf.len() {
            let b = buf[i];
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Ok(Some(i + 1));
                    }
                }
            } else {
                match b {
                    b'"' => self.in_string = true,
                    b'{' | b'[' => self.depth += 1,
                    b'}' | b']' if self.depth > 0 => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            return Ok(Some(i + 1));
                        }
                    },
                    // End of a bare scalar
                    b'}' | b']' | b',' if self.depth == 0 => {
                        if i == 0 {
                            return Err(KsqlLinkError::ProtocolError(format!(
                                "unexpected '{}' between frames",
                                b as char
                            )));
                        }
                        return Ok(Some(i));
                    },
                    b if b.is_ascii_whitespace() && self.depth == 0 => return Ok(Some(i)),
                    _ => {},
                }
            }
            i += 1;
        }
        self.scanned = i;
        Ok(None)
    }

    /// Drop whitespace and array punctuation ahead of the next value.
    /// Returns true once buf[0] is the first byte of a value.
    fn skip_between_values(&mut self, buf: &mut BytesMut) -> Result<bool, KsqlLinkError> {
        loop {
            let ws = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            buf.advance(ws);
            let Some(&first) = buf.first() else {
                return Ok(false);
            };

            match self.layout {
                Layout::Undecided => {
                    if first != b'[' {
                        self.layout = Layout::Delimited;
                        return Ok(true);
                    }
                    // `[{`, `[[` and `[]` open an enclosing array; `[1, 2]` is a value
                    match buf[1..].iter().find(|b| !b.is_ascii_whitespace()) {
                        None => return Ok(false),
                        Some(b'{') | Some(b'[') | Some(b']') => {
                            self.layout = Layout::Array;
                            buf.advance(1);
                        },
                        Some(_) => {
                            self.layout = Layout::Delimited;
                            return Ok(true);
                        },
                    }
                },
                Layout::Array => match first {
                    b',' => buf.advance(1),
                    b']' => {
                        buf.advance(1);
                        self.layout = Layout::Closed;
                    },
                    _ => return Ok(true),
                },
                Layout::Delimited => return Ok(true),
                Layout::Closed => {
                    return Err(KsqlLinkError::ProtocolError(format!(
                        "unexpected data after end of result array: '{}'",
                        first as char
                    )));
                },
            }
        }
    }

    fn take_frame(&mut self, buf: &mut BytesMut, len: usize) -> Result<JsonValue, KsqlLinkError> {
        let frame = buf.split_to(len);
        self.reset();
        serde_json::from_slice(&frame).map_err(|e| {
            KsqlLinkError::ProtocolError(format!(
                "malformed frame ({}): {}",
                e,
                String::from_utf8_lossy(&frame[..frame.len().min(120)])
            ))
        })
    }
}

impl Decoder for JsonFrameCodec {
    type Item = JsonValue;
    type Error = KsqlLinkError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<JsonValue>, KsqlLinkError> {
        if !self.started {
            if !self.skip_between_values(buf)? {
                return Ok(None);
            }
            self.started = true;
            self.scanned = 0;
        }

        match self.scan(buf)? {
            Some(len) => self.take_frame(buf, len).map(Some),
            None if buf.len() > self.max_frame_bytes => Err(KsqlLinkError::ProtocolError(format!(
                "frame exceeds {} bytes",
                self.max_frame_bytes
            ))),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<JsonValue>, KsqlLinkError> {
        if let Some(value) = self.decode(buf)? {
            return Ok(Some(value));
        }
        if buf.is_empty() {
            if self.layout == Layout::Array {
                return Err(KsqlLinkError::ProtocolError(
                    "stream ended before the result array was closed".to_string(),
                ));
            }
            return Ok(None);
        }
        // A trailing scalar needs no terminator; anything else is truncated
        if self.started && self.depth == 0 && !self.in_string {
            let len = buf.len();
            return self.take_frame(buf, len).map(Some);
        }
        let err = KsqlLinkError::ProtocolError(format!(
            "stream ended inside a frame ({} bytes buffered)",
            buf.len()
        ));
        buf.clear();
        self.reset();
        Err(err)
    }
}
