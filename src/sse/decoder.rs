//! The stream decoder state machine.
//!
//! Drives [`LineFramer`] → [`parse_field`] → [`PendingEvent`] until one
//! event completes, then hands out a [`ChatDelta`]. The decoder is either
//! `Open` or `Finished`; the transition is one-way and a finished decoder
//! never reads from the transport again.

use bytes::{Bytes, BytesMut};

use crate::error::{ApiError, StreamError, TransportError};
use crate::models::{ChatDelta, FINISH_EVENT};
use crate::traits::ByteStream;

use super::event::{EventPool, PendingEvent};
use super::field::{parse_field, Field};
use super::framer::LineFramer;

/// What marks the end of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// A blank line ends the event. Used by the `sse-invoke` endpoint.
    #[default]
    BlankLine,
    /// The end of the response body ends the event; blank lines are
    /// ignored, so the whole body decodes into one event.
    EndOfBody,
}

/// Lifecycle of a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Finished,
}

/// Decodes chat deltas from one open event stream.
///
/// `receive` takes `&mut self`, so one decoder has exactly one reader.
/// Cancellation and timeouts come from the transport; a cancelled read
/// surfaces as [`StreamError::Transport`].
#[derive(Debug)]
pub struct StreamDecoder {
    framer: LineFramer,
    boundary: BoundaryPolicy,
    state: StreamState,
}

impl StreamDecoder {
    pub fn new(body: ByteStream, boundary: BoundaryPolicy) -> Self {
        Self {
            framer: LineFramer::new(body),
            boundary,
            state: StreamState::Open,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == StreamState::Finished
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// Decode the next event.
    ///
    /// Returns [`StreamError::Exhausted`] once the stream is finished. The
    /// event carrying `event: finish` is still returned; only the calls
    /// after it fail. Any error is terminal: the decoder finishes and the
    /// connection is released before the error is returned.
    pub async fn receive(&mut self) -> Result<ChatDelta, StreamError> {
        if self.is_finished() {
            return Err(StreamError::Exhausted);
        }

        let result = self.decode_event().await;
        if result.is_err() {
            self.state = StreamState::Finished;
        }
        if self.is_finished() {
            self.framer.close();
        }
        result
    }

    /// Release the connection. Idempotent; later `receive` calls return
    /// [`StreamError::Exhausted`].
    pub fn close(&mut self) {
        self.state = StreamState::Finished;
        self.framer.close();
    }

    async fn decode_event(&mut self) -> Result<ChatDelta, StreamError> {
        let mut event = EventPool::global().acquire();
        let mut error_body: Option<BytesMut> = None;

        loop {
            let line = match self.framer.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return self.end_of_body(&event, error_body),
                Err(err) => return self.read_failed(&event, error_body, err),
            };
            let blank = &line[..] == b"\n";

            if let Some(body) = error_body.as_mut() {
                if blank {
                    return Err(envelope_error(body, None));
                }
                collect_error_line(body, &line)?;
                continue;
            }

            if blank {
                if self.boundary == BoundaryPolicy::BlankLine && !event.is_empty() {
                    return Ok(event.to_delta());
                }
                continue;
            }

            match parse_field(&line)? {
                Field::Data(value) if !event.has_data() && is_error_envelope(&value) => {
                    tracing::debug!("Event stream carries an error envelope");
                    error_body = Some(BytesMut::from(&value[..]));
                }
                Field::Event(name) => {
                    if &name[..] == FINISH_EVENT.as_bytes() {
                        tracing::debug!("Finish event observed");
                        self.state = StreamState::Finished;
                    }
                    event.apply(Field::Event(name));
                }
                field => event.apply(field),
            }
        }
    }

    fn end_of_body(
        &mut self,
        event: &PendingEvent,
        error_body: Option<BytesMut>,
    ) -> Result<ChatDelta, StreamError> {
        self.state = StreamState::Finished;

        if let Some(body) = error_body {
            return Err(envelope_error(&body, None));
        }
        if event.is_empty() {
            tracing::debug!("Event stream ended");
            return Err(StreamError::Exhausted);
        }
        if self.boundary == BoundaryPolicy::BlankLine {
            tracing::debug!("Event stream ended without a closing blank line");
        }
        Ok(event.to_delta())
    }

    /// A read failure ends the stream. Under [`BoundaryPolicy::EndOfBody`]
    /// the fields gathered so far are the whole answer and are delivered.
    fn read_failed(
        &mut self,
        event: &PendingEvent,
        error_body: Option<BytesMut>,
        err: TransportError,
    ) -> Result<ChatDelta, StreamError> {
        tracing::debug!(error = %err, "Event stream read failed");
        if let Some(body) = error_body {
            return Err(envelope_error(&body, Some(err)));
        }
        if self.boundary == BoundaryPolicy::EndOfBody && !event.is_empty() {
            self.state = StreamState::Finished;
            return Ok(event.to_delta());
        }
        Err(StreamError::Transport(err))
    }
}

/// Only data values belong to an error envelope; `id`, `event`, `meta` and
/// comment lines around it are dropped.
fn collect_error_line(body: &mut BytesMut, line: &Bytes) -> Result<(), StreamError> {
    if let Field::Data(value) = parse_field(line)? {
        body.extend_from_slice(&value);
    }
    Ok(())
}

/// True if a data value opens a JSON object whose first key is `"error"`.
fn is_error_envelope(value: &[u8]) -> bool {
    skip_whitespace(value)
        .strip_prefix(b"{")
        .map(skip_whitespace)
        .is_some_and(|rest| rest.starts_with(b"\"error\""))
}

fn skip_whitespace(value: &[u8]) -> &[u8] {
    let start = value
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(value.len());
    &value[start..]
}

/// Turn a collected error body into a stream error. If the body does not
/// parse, a transport failure that ended the read wins over the parse
/// failure.
fn envelope_error(body: &[u8], transport: Option<TransportError>) -> StreamError {
    match ApiError::from_envelope(body) {
        Ok(api) => StreamError::Api(api),
        Err(err) => {
            tracing::debug!(error = %err, "Error envelope did not parse");
            match transport {
                Some(transport) => StreamError::Transport(transport),
                None => StreamError::MalformedErrorEnvelope {
                    body: String::from_utf8_lossy(body).trim().to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn decoder(body: &'static str, boundary: BoundaryPolicy) -> StreamDecoder {
        let stream = futures::stream::iter(vec![Ok::<_, TransportError>(Bytes::from_static(
            body.as_bytes(),
        ))]);
        StreamDecoder::new(Box::pin(stream), boundary)
    }

    #[tokio::test]
    async fn test_blank_line_events() {
        let mut decoder = decoder(
            "event: add\nid: 1\ndata: Hel\n\nevent: add\nid: 1\ndata: lo\n\n",
            BoundaryPolicy::BlankLine,
        );

        assert_eq!(decoder.receive().await.unwrap().content(), "Hel");
        assert_eq!(decoder.receive().await.unwrap().content(), "lo");
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
        assert!(decoder.is_finished());
    }

    #[tokio::test]
    async fn test_multi_line_data_joins_with_newline() {
        let mut decoder = decoder(
            "data: line one\ndata: line two\ndata\ndata: end\n\n",
            BoundaryPolicy::BlankLine,
        );
        assert_eq!(
            decoder.receive().await.unwrap().content(),
            "line one\nline two\n\nend"
        );
    }

    #[tokio::test]
    async fn test_leading_blank_lines_are_skipped() {
        let mut decoder = decoder("\n\n: comment\n\ndata: x\n\n", BoundaryPolicy::BlankLine);
        assert_eq!(decoder.receive().await.unwrap().content(), "x");
    }

    #[tokio::test]
    async fn test_finish_event_is_delivered_then_exhausted() {
        let mut decoder = decoder(
            "event: add\ndata: a\n\nevent: finish\ndata: \nmeta: {\"usage\":{\"total_tokens\":7}}\n\nevent: add\ndata: never\n\n",
            BoundaryPolicy::BlankLine,
        );

        assert_eq!(decoder.receive().await.unwrap().content(), "a");
        let last = decoder.receive().await.unwrap();
        assert!(last.is_finish());
        assert_eq!(last.meta.usage.total_tokens, 7);
        assert_eq!(last.content(), "");
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_finished_decoder_does_not_read_transport() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let chunks = vec![
            Bytes::from_static(b"event: finish\ndata: done\n\n"),
            Bytes::from_static(b"data: trailing\n\n"),
        ];
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TransportError>(chunk)
        });
        let mut decoder = StreamDecoder::new(Box::pin(stream), BoundaryPolicy::BlankLine);

        assert_eq!(decoder.receive().await.unwrap().content(), "done");
        let reads_after_finish = reads.load(Ordering::SeqCst);

        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
        assert_eq!(reads.load(Ordering::SeqCst), reads_after_finish);
    }

    #[tokio::test]
    async fn test_error_envelope_becomes_api_error() {
        let mut decoder = decoder(
            "data: {\"error\":{\"message\":\"bad request\"}}\n\n",
            BoundaryPolicy::BlankLine,
        );
        match decoder.receive().await {
            Err(StreamError::Api(err)) => assert_eq!(err.message, "bad request"),
            other => panic!("expected API error, got {:?}", other),
        }
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_multi_line_error_envelope() {
        let mut decoder = decoder(
            "data: {\"error\":\ndata: {\"code\":\"1214\",\"message\":\"bad model\"}}\n\n",
            BoundaryPolicy::BlankLine,
        );
        match decoder.receive().await {
            Err(StreamError::Api(err)) => {
                assert_eq!(err.code.as_deref(), Some("1214"));
                assert_eq!(err.message, "bad model");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_envelope_followed_by_meta() {
        let mut decoder = decoder(
            "data: {\"error\":{\"message\":\"bad request\"}}\nmeta: {}\n\n",
            BoundaryPolicy::BlankLine,
        );
        match decoder.receive().await {
            Err(StreamError::Api(err)) => assert_eq!(err.message, "bad request"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_envelope_followed_by_id() {
        let mut decoder = decoder(
            "data: {\"error\":{\"message\":\"bad request\"}}\nid: 9\n: note\n\n",
            BoundaryPolicy::BlankLine,
        );
        match decoder.receive().await {
            Err(StreamError::Api(err)) => assert_eq!(err.message, "bad request"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_envelope_inside_full_event() {
        for boundary in [BoundaryPolicy::BlankLine, BoundaryPolicy::EndOfBody] {
            let mut decoder = decoder(
                "event: error\nid: 3\ndata: {\"error\":{\"code\":1301,\"message\":\"blocked\"}}\nmeta: {\"task_status\":\"FAIL\"}\n\ndata: never\n\n",
                boundary,
            );
            match decoder.receive().await {
                Err(StreamError::Api(err)) => {
                    assert_eq!(err.code.as_deref(), Some("1301"));
                    assert_eq!(err.message, "blocked");
                }
                other => panic!("expected API error under {:?}, got {:?}", boundary, other),
            }
            assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
        }
    }

    #[tokio::test]
    async fn test_error_envelope_at_end_of_body() {
        for boundary in [BoundaryPolicy::BlankLine, BoundaryPolicy::EndOfBody] {
            let mut decoder = decoder(
                "id: 4\ndata: {\"error\":{\"message\":\"quota exceeded\"}}\nid: 4\n",
                boundary,
            );
            match decoder.receive().await {
                Err(StreamError::Api(err)) => assert_eq!(err.message, "quota exceeded"),
                other => panic!("expected API error under {:?}, got {:?}", boundary, other),
            }
        }
    }

    #[tokio::test]
    async fn test_error_text_after_regular_data_is_content() {
        let mut decoder = decoder(
            "data: quoting\ndata: {\"error\":{\"message\":\"x\"}}\n\n",
            BoundaryPolicy::BlankLine,
        );
        assert_eq!(
            decoder.receive().await.unwrap().content(),
            "quoting\n{\"error\":{\"message\":\"x\"}}"
        );
    }

    #[tokio::test]
    async fn test_malformed_envelope_without_transport_error() {
        let mut decoder = decoder("data: {\"error\": oops\n\n", BoundaryPolicy::BlankLine);
        assert!(matches!(
            decoder.receive().await,
            Err(StreamError::MalformedErrorEnvelope { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_envelope_keeps_transport_error() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"data: {\"error\": {\"mess")),
            Ok(Bytes::from_static(b"age\n")),
            Err(TransportError::Io("reset by peer".to_string())),
        ]);
        let mut decoder = StreamDecoder::new(Box::pin(stream), BoundaryPolicy::BlankLine);
        assert_eq!(
            decoder.receive().await,
            Err(StreamError::Transport(TransportError::Io(
                "reset by peer".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_terminal() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"data: a\n")),
            Err(TransportError::Cancelled),
            Ok(Bytes::from_static(b"\n")),
        ])
        .inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut decoder = StreamDecoder::new(Box::pin(stream), BoundaryPolicy::BlankLine);

        assert_eq!(
            decoder.receive().await,
            Err(StreamError::Transport(TransportError::Cancelled))
        );
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_body_is_end_of_stream() {
        let mut decoder = decoder("", BoundaryPolicy::BlankLine);
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_unterminated_last_event_is_delivered() {
        let mut decoder = decoder("data: a\n\nevent: finish\ndata: b", BoundaryPolicy::BlankLine);
        assert_eq!(decoder.receive().await.unwrap().content(), "a");
        let last = decoder.receive().await.unwrap();
        assert_eq!(last.content(), "b");
        assert!(last.is_finish());
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_end_of_body_policy_merges_whole_body() {
        let mut decoder = decoder(
            "id: 7\ndata: full\n\ndata: text\nmeta: {\"task_status\":\"SUCCESS\"}\n",
            BoundaryPolicy::EndOfBody,
        );
        let delta = decoder.receive().await.unwrap();
        assert_eq!(delta.id, "7");
        assert_eq!(delta.content(), "full\ntext");
        assert_eq!(delta.meta.task_status.as_deref(), Some("SUCCESS"));
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_end_of_body_policy_keeps_fields_on_read_failure() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"id: 7\ndata: whole answer\n")),
            Err(TransportError::Io("reset".to_string())),
        ]);
        let mut decoder = StreamDecoder::new(Box::pin(stream), BoundaryPolicy::EndOfBody);

        let delta = decoder.receive().await.unwrap();
        assert_eq!(delta.id, "7");
        assert_eq!(delta.content(), "whole answer");
        assert!(decoder.is_finished());
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_end_of_body_policy_read_failure_before_fields() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b": keepalive\n")),
            Err(TransportError::Io("reset".to_string())),
        ]);
        let mut decoder = StreamDecoder::new(Box::pin(stream), BoundaryPolicy::EndOfBody);

        assert_eq!(
            decoder.receive().await,
            Err(StreamError::Transport(TransportError::Io("reset".to_string())))
        );
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[tokio::test]
    async fn test_fields_do_not_leak_between_events() {
        let mut decoder = decoder(
            "id: 1\nevent: add\ndata: first\nmeta: {\"task_id\":\"t-1\"}\n\ndata: second\n\n",
            BoundaryPolicy::BlankLine,
        );

        let first = decoder.receive().await.unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(first.meta.task_id.as_deref(), Some("t-1"));

        let second = decoder.receive().await.unwrap();
        assert_eq!(second.id, "");
        assert_eq!(second.event, "");
        assert_eq!(second.content(), "second");
        assert_eq!(second.meta.task_id, None);
    }

    #[tokio::test]
    async fn test_close_before_reading() {
        let mut decoder = decoder("data: a\n\n", BoundaryPolicy::BlankLine);
        decoder.close();
        decoder.close();
        assert_eq!(decoder.receive().await, Err(StreamError::Exhausted));
    }

    #[test]
    fn test_is_error_envelope() {
        assert!(is_error_envelope(b"{\"error\":{}}\n"));
        assert!(is_error_envelope(b"  { \"error\" : 1}"));
        assert!(!is_error_envelope(b"{\"data\":{\"error\":1}}"));
        assert!(!is_error_envelope(b"error\n"));
        assert!(!is_error_envelope(b"\n"));
    }
}
