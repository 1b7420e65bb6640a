//! Helpers for building server-driven datastar SSE responses.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, PatchElements};
use futures::{Stream, StreamExt};

/// Builder for composing datastar-compatible SSE responses.
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an element patch targeting the supplied selector.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Append a patch that swaps the whole element matched by `selector`.
    pub fn replace(&mut self, selector: &str, html: String) -> &mut Self {
        self.push_patch(html, selector, ElementPatchMode::Replace)
    }

    /// Take the queued events, for callers that interleave them with async work.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Finalise the builder into an Axum response.
    pub fn into_response(self) -> Response {
        let events = self.events;
        sse_response(stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        })
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Respond with batches of patches produced over time, e.g. a loading state
/// followed by the result of a remote call.
pub fn batched_response<S>(batches: S) -> Response
where
    S: Stream<Item = StreamBuilder> + Send + 'static,
{
    sse_response(batches.flat_map(|batch| {
        futures::stream::iter(batch.into_events().into_iter().map(Ok::<Event, Infallible>))
    }))
}

/// Wrap a lazily produced event stream as an SSE response.
pub fn sse_response<S>(events: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(events).into_response()
}
