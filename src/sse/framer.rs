//! Line framing over a streaming HTTP body.

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::StreamExt;

use crate::error::TransportError;
use crate::traits::ByteStream;

/// Splits a byte stream into physical lines.
///
/// Lines are yielded with their `\n` terminator; `\r\n` is normalised to
/// `\n`. If the body ends without a final terminator the remaining bytes are
/// yielded once as an unterminated line.
pub struct LineFramer {
    body: Option<ByteStream>,
    buffer: BytesMut,
    /// Prefix of `buffer` already known to hold no `\n`.
    scanned: usize,
    eof: bool,
}

impl LineFramer {
    pub fn new(body: ByteStream) -> Self {
        Self {
            body: Some(body),
            buffer: BytesMut::new(),
            scanned: 0,
            eof: false,
        }
    }

    /// Pull the next line.
    ///
    /// Returns `Ok(None)` once the body is exhausted or the framer has been
    /// closed. Transport errors are returned as-is and not retried.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, TransportError> {
        loop {
            let unscanned = &self.buffer[self.scanned..];
            if let Some(offset) = unscanned.iter().position(|&b| b == b'\n') {
                let mut line = self.buffer.split_to(self.scanned + offset + 1);
                self.scanned = 0;
                if line.ends_with(b"\r\n") {
                    line.truncate(line.len() - 2);
                    line.put_u8(b'\n');
                }
                return Ok(Some(line.freeze()));
            }

            if self.eof {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                self.scanned = 0;
                return Ok(Some(self.buffer.split().freeze()));
            }
            self.scanned = self.buffer.len();

            let Some(body) = self.body.as_mut() else {
                self.eof = true;
                continue;
            };

            match body.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => return Err(err),
                None => {
                    self.eof = true;
                    self.body = None;
                }
            }
        }
    }

    /// Drop the underlying body, releasing the connection. Buffered bytes
    /// are discarded. Safe to call more than once.
    pub fn close(&mut self) {
        self.body = None;
        self.buffer.clear();
        self.scanned = 0;
        self.eof = true;
    }

    /// True once the body has been dropped.
    pub fn is_closed(&self) -> bool {
        self.body.is_none()
    }
}

impl std::fmt::Debug for LineFramer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineFramer")
            .field("buffered", &self.buffer.len())
            .field("scanned", &self.scanned)
            .field("eof", &self.eof)
            .field("closed", &self.body.is_none())
            .finish()
    }
}
