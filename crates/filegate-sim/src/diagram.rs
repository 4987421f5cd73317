//! Space-time diagram.
//!
//! One row per client that got a handle, showing when its
//! write/read/close sequence started and finished relative to the start of
//! the run. One column is one millisecond.
//!
//! Headers show `+<ms>ms` offsets from the run start, not wall-clock
//! `HH:MM:SS` times.
//!
//! ```text
//! Client 2: +0ms - +3ms
//! ---
//!
//! Client 1: +1ms - +5ms
//!  ----
//! ```

use std::{fmt::Write as _, time::Instant};

use filegate_core::ClientId;

/// Time a client spent between its first access and its close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSpan {
    /// Client the span belongs to.
    pub client_id: ClientId,
    /// Taken right after the file was opened.
    pub start: Instant,
    /// Taken right after the file was closed.
    pub end: Instant,
}

/// Spans of one run, in client completion order.
#[derive(Debug, Clone)]
pub struct SpaceTimeDiagram {
    origin: Instant,
    spans: Vec<ClientSpan>,
}

impl SpaceTimeDiagram {
    /// Diagram with offsets measured from `origin`.
    pub fn new(origin: Instant) -> Self {
        Self { origin, spans: Vec::new() }
    }

    /// Add a span.
    pub fn record(&mut self, span: ClientSpan) {
        self.spans.push(span);
    }

    /// Recorded spans.
    pub fn spans(&self) -> &[ClientSpan] {
        &self.spans
    }

    /// Render every span as a header, a bar and a blank line.
    ///
    /// A bar has at least one dash so zero-length spans stay visible.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let start_ms = millis_between(self.origin, span.start);
            let end_ms = millis_between(self.origin, span.end).max(start_ms);
            let width = (end_ms - start_ms).max(1);

            let _ = writeln!(out, "Client {}: +{}ms - +{}ms", span.client_id, start_ms, end_ms);
            out.push_str(&" ".repeat(start_ms));
            out.push_str(&"-".repeat(width));
            out.push_str("\n\n");
        }
        out
    }
}

fn millis_between(from: Instant, to: Instant) -> usize {
    usize::try_from(to.saturating_duration_since(from).as_millis()).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn renders_offsets_and_bars() {
        let origin = Instant::now();
        let mut diagram = SpaceTimeDiagram::new(origin);
        diagram.record(ClientSpan {
            client_id: 2,
            start: origin,
            end: origin + Duration::from_millis(3),
        });
        diagram.record(ClientSpan {
            client_id: 1,
            start: origin + Duration::from_millis(1),
            end: origin + Duration::from_millis(5),
        });

        assert_eq!(
            diagram.render(),
            "Client 2: +0ms - +3ms\n---\n\nClient 1: +1ms - +5ms\n ----\n\n"
        );
    }

    #[test]
    fn zero_length_span_has_one_dash() {
        let origin = Instant::now();
        let mut diagram = SpaceTimeDiagram::new(origin);
        let at = origin + Duration::from_millis(2);
        diagram.record(ClientSpan { client_id: 7, start: at, end: at });

        assert_eq!(diagram.render(), "Client 7: +2ms - +2ms\n  -\n\n");
    }

    #[test]
    fn empty_diagram_renders_nothing() {
        assert_eq!(SpaceTimeDiagram::new(Instant::now()).render(), "");
    }
}
