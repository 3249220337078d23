//! Event stream decoding for the `sse-invoke` endpoint.
//!
//! The wire format is line oriented:
//! - `id: <id>` - event identifier
//! - `event: <name>` - event name; `finish` marks the last event
//! - `data: <chunk>` - content; repeated lines join with `\n`
//! - `meta: <json>` - task status and token usage
//! - Empty line - end of event (see [`BoundaryPolicy`])
//! - Anything else is ignored
//!
//! # Module structure
//! - `framer` - splits the HTTP body into lines ([`LineFramer`])
//! - `field` - classifies one line ([`parse_field`], [`Field`])
//! - `event` - accumulates fields of one event ([`PendingEvent`], [`EventPool`])
//! - `decoder` - the state machine ([`StreamDecoder`])

mod decoder;
mod event;
mod field;
mod framer;

pub use decoder::{BoundaryPolicy, StreamDecoder, StreamState};
pub use event::{EventPool, PendingEvent, PooledEvent};
pub use field::{parse_field, trim_value, Field};
pub use framer::LineFramer;
