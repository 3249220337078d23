//! Mock transport fixtures.
//!
//! Re-exports the mock client from `zhipu::adapters::mock` and adds helpers
//! for building byte streams split at arbitrary points.

use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::Poll;

#[allow(unused_imports)]
pub use zhipu::adapters::mock::{MockHttpClient, MockResponse};
#[allow(unused_imports)]
pub use zhipu::traits::{ByteStream, Headers, HttpClient, Response};
use zhipu::TransportError;

/// Splits `body` into chunks of at most `size` bytes.
#[allow(dead_code)]
pub fn chunked(body: &str, size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(size.max(1))
        .map(Bytes::copy_from_slice)
        .collect()
}

/// A byte stream that counts every poll, including the ones that report
/// end of body.
#[allow(dead_code)]
pub fn counting_stream(chunks: Vec<Bytes>) -> (ByteStream, Arc<AtomicUsize>) {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&polls);
    let mut chunks = chunks.into_iter();
    let stream = futures::stream::poll_fn(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(chunks.next().map(Ok::<_, TransportError>))
    });
    (Box::pin(stream), polls)
}
