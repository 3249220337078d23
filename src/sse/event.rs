//! Event accumulation and the buffer pool behind it.
//!
//! A [`PendingEvent`] collects the fields of one event until its boundary is
//! reached. Buffers are borrowed from a process-wide [`EventPool`] through a
//! [`PooledEvent`] guard, which clears the buffer before handing it back.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use bytes::{Bytes, BytesMut};
use once_cell::sync::Lazy;

use crate::models::{ChatDelta, StreamMeta, FINISH_EVENT};

use super::field::Field;

/// Idle buffers kept by the global pool. Extra returns are dropped.
const MAX_IDLE_EVENTS: usize = 64;

static GLOBAL_POOL: Lazy<EventPool> = Lazy::new(|| EventPool::new(MAX_IDLE_EVENTS));

/// Fields of the event currently being decoded.
#[derive(Debug, Default)]
pub struct PendingEvent {
    id: Option<Bytes>,
    event: Option<Bytes>,
    data: BytesMut,
    meta: Option<Bytes>,
}

impl PendingEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one parsed field. Later `id`, `event` and `meta` fields replace
    /// earlier ones; data fields append.
    pub fn apply(&mut self, field: Field) {
        match field {
            Field::Id(value) => self.id = Some(value),
            Field::Data(value) => self.data.extend_from_slice(&value),
            Field::Event(value) => self.event = Some(value),
            Field::Meta(value) => self.meta = Some(value),
            Field::Ignorable => {}
        }
    }

    /// True if no field has been merged since the last clear.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.event.is_none() && self.data.is_empty() && self.meta.is_none()
    }

    /// True if at least one data field has been merged.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// True if the event name is exactly `finish`.
    pub fn is_finish(&self) -> bool {
        self.event.as_deref() == Some(FINISH_EVENT.as_bytes())
    }

    /// Convert the accumulated fields into a [`ChatDelta`].
    ///
    /// The single trailing newline left by the last data line is removed
    /// here and nowhere else. Metadata that is not valid JSON is logged and
    /// replaced by [`StreamMeta::default`]. The buffer keeps its contents;
    /// clearing is the pool's job.
    pub fn to_delta(&self) -> ChatDelta {
        let data = self.data.strip_suffix(b"\n").unwrap_or(&self.data[..]);

        let meta = match self.meta.as_deref() {
            Some(raw) if !raw.is_empty() => match serde_json::from_slice::<StreamMeta>(raw) {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!(error = %err, "Ignoring undecodable stream metadata");
                    StreamMeta::default()
                }
            },
            _ => StreamMeta::default(),
        };

        ChatDelta::from_parts(
            lossy(self.id.as_deref()),
            lossy(self.event.as_deref()),
            String::from_utf8_lossy(data).into_owned(),
            meta,
        )
    }

    /// Reset all four slots. Data capacity is retained for reuse.
    pub fn clear(&mut self) {
        self.id = None;
        self.event = None;
        self.data.clear();
        self.meta = None;
    }
}

fn lossy(value: Option<&[u8]>) -> String {
    value
        .map(|v| String::from_utf8_lossy(v).into_owned())
        .unwrap_or_default()
}

/// Thread-safe pool of reusable [`PendingEvent`] buffers.
///
/// No ordering is guaranteed on which idle buffer a borrower receives.
#[derive(Debug)]
pub struct EventPool {
    idle: Mutex<Vec<PendingEvent>>,
    max_idle: usize,
}

impl EventPool {
    /// Create a pool that keeps at most `max_idle` returned buffers.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// The process-wide pool shared by all streams.
    pub fn global() -> &'static EventPool {
        &GLOBAL_POOL
    }

    /// Borrow a cleared buffer, allocating one if the pool is empty.
    pub fn acquire(&self) -> PooledEvent<'_> {
        let event = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .unwrap_or_default();
        PooledEvent {
            event: Some(event),
            pool: self,
        }
    }

    /// Number of idle buffers.
    pub fn idle_count(&self) -> usize {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn release(&self, mut event: PendingEvent) {
        event.clear();
        let mut idle = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if idle.len() < self.max_idle {
            idle.push(event);
        }
    }
}

/// A buffer borrowed from an [`EventPool`]. Cleared and returned on drop.
#[derive(Debug)]
pub struct PooledEvent<'a> {
    event: Option<PendingEvent>,
    pool: &'a EventPool,
}

impl Deref for PooledEvent<'_> {
    type Target = PendingEvent;

    fn deref(&self) -> &PendingEvent {
        // Only `drop` takes the event out.
        self.event.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledEvent<'_> {
    fn deref_mut(&mut self) -> &mut PendingEvent {
        self.event.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledEvent<'_> {
    fn drop(&mut self) {
        if let Some(event) = self.event.take() {
            self.pool.release(event);
        }
    }
}
