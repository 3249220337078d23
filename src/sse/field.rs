//! Field classification for single event-stream lines.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;

const ID_PREFIX: &[u8] = b"id:";
const DATA_PREFIX: &[u8] = b"data:";
const DATA_NAME: &[u8] = b"data";
const EVENT_PREFIX: &[u8] = b"event:";
const META_PREFIX: &[u8] = b"meta:";

/// One classified line of an event stream.
///
/// Values have the field prefix, one optional leading space and one
/// trailing line feed removed. `Data` values additionally end with a single
/// `\n` marker so consecutive data lines concatenate into a newline-joined
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Id(Bytes),
    Data(Bytes),
    Event(Bytes),
    Meta(Bytes),
    /// Unrecognised line, dropped by the accumulator.
    Ignorable,
}

/// Classify one raw line. First matching rule wins.
///
/// Blank lines are event boundaries and must be handled by the caller; an
/// empty input is rejected with [`ProtocolError::EmptyLine`].
pub fn parse_field(line: &Bytes) -> Result<Field, ProtocolError> {
    if line.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }

    if line.starts_with(ID_PREFIX) {
        return Ok(Field::Id(trim_value(line.slice(ID_PREFIX.len()..))));
    }

    if line.starts_with(DATA_PREFIX) {
        let value = trim_value(line.slice(DATA_PREFIX.len()..));
        return Ok(Field::Data(with_newline(&value)));
    }

    // A line holding only the field name is a data field with an empty body.
    if strip_line_feed(line) == DATA_NAME {
        return Ok(Field::Data(Bytes::from_static(b"\n")));
    }

    if line.starts_with(EVENT_PREFIX) {
        return Ok(Field::Event(trim_value(line.slice(EVENT_PREFIX.len()..))));
    }

    if line.starts_with(META_PREFIX) {
        return Ok(Field::Meta(trim_value(line.slice(META_PREFIX.len()..))));
    }

    Ok(Field::Ignorable)
}

/// Strip one leading ASCII space and one trailing line feed.
///
/// A value that has neither is returned unchanged.
pub fn trim_value(mut value: Bytes) -> Bytes {
    if value.first() == Some(&b' ') {
        value = value.slice(1..);
    }
    if value.last() == Some(&b'\n') {
        value.truncate(value.len() - 1);
    }
    value
}

fn strip_line_feed(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\n").unwrap_or(line)
}

fn with_newline(value: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(value.len() + 1);
    buf.put_slice(value);
    buf.put_u8(b'\n');
    buf.freeze()
}
