//! SSE decoder for streamed chat completions.
//!
//! The response body is a chunked byte stream of newline-delimited event
//! records: lines of the form `data: <json>` terminated by `data: [DONE]`.
//! Chunk boundaries do not respect line boundaries, so the decoder buffers
//! partial lines across [`feed`](SseDecoder::feed) calls. Lines without the
//! `data: ` prefix (comments, pings) and payloads that fail to parse are
//! skipped without interrupting the stream.
//!
//! Each delta event carries both the increment and the running
//! concatenation; on termination (the `[DONE]` sentinel or the source
//! closing) the cumulative text is trimmed and emitted as
//! [`StreamEvent::Completed`].

use chatflow_domain::StreamEvent;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::trace;

/// Event line prefix; anything else is protocol noise.
const DATA_PREFIX: &str = "data: ";

/// Payload that ends the stream immediately.
const DONE_SENTINEL: &str = "[DONE]";

/// One parsed `data:` payload. Only the delta text is of interest.
#[derive(Debug, Deserialize)]
struct ChunkRecord {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental decoder for a `data:`-framed completion stream.
///
/// Buffers raw bytes and frames on `b'\n'` before any UTF-8 decoding, so a
/// multibyte code point split across network chunks is reassembled rather
/// than turned into replacement characters.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line_buf: Vec<u8>,
    full: String,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The concatenation of all deltas decoded so far.
    pub fn full_text(&self) -> &str {
        &self.full
    }

    /// True once the termination sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Decode one chunk of the response body.
    ///
    /// Returns the events completed by this chunk, in order. After the
    /// termination sentinel, remaining buffered bytes are discarded and
    /// further input is ignored.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        if self.done {
            return Vec::new();
        }

        self.line_buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.line_buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.line_buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.decode_line(line.trim_end_matches(['\n', '\r'])) {
                let terminal = event.is_terminal();
                events.push(event);
                if terminal {
                    self.line_buf.clear();
                    break;
                }
            }
        }
        events
    }

    /// Flush the decoder when the source closes without a sentinel.
    ///
    /// A trailing line without a newline is decoded first, then the
    /// cumulative text is emitted. Yields nothing if the stream already
    /// terminated via `[DONE]`.
    pub fn finish(mut self) -> Vec<StreamEvent> {
        if self.done {
            return Vec::new();
        }

        let mut events = Vec::new();
        if !self.line_buf.is_empty() {
            let raw = std::mem::take(&mut self.line_buf);
            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.decode_line(line.trim_end_matches('\r')) {
                events.push(event);
            }
        }

        if !events.last().is_some_and(StreamEvent::is_terminal) {
            events.push(StreamEvent::Completed(self.full.trim().to_string()));
        }
        events
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamEvent> {
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();

        if payload == DONE_SENTINEL {
            self.done = true;
            return Some(StreamEvent::Completed(self.full.trim().to_string()));
        }
        if payload.is_empty() {
            return None;
        }

        let record: ChunkRecord = match serde_json::from_str(payload) {
            Ok(record) => record,
            Err(e) => {
                // Malformed payloads must not abort the stream
                trace!(error = %e, "skipping malformed stream payload");
                return None;
            }
        };

        let chunk = record
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|c| !c.is_empty())?;

        self.full.push_str(&chunk);
        Some(StreamEvent::Delta {
            chunk,
            full: self.full.clone(),
        })
    }
}

/// Drive a response body stream through a decoder into a channel.
///
/// Exactly one terminal event is sent: `Completed` on `[DONE]` or source
/// close, `Error` on a transport failure. The body stream is dropped on
/// every exit path, releasing the connection.
pub async fn pump<S, B, E>(mut body: S, tx: mpsc::Sender<StreamEvent>)
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = body.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };

        for event in decoder.feed(bytes.as_ref()) {
            let terminal = event.is_terminal();
            if tx.send(event).await.is_err() || terminal {
                return;
            }
        }
    }

    for event in decoder.finish() {
        if tx.send(event).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn delta_chunks(events: &[StreamEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Delta { chunk, .. } => Some(chunk.as_str()),
                _ => None,
            })
            .collect()
    }

    fn data_line(content: &str) -> String {
        format!(
            "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{}\"}}}}]}}\n",
            content
        )
    }

    #[test]
    fn decodes_deltas_with_cumulative_text() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(format!("{}{}", data_line("Hi"), data_line(" there")).as_bytes());

        assert_eq!(
            events,
            vec![
                StreamEvent::Delta {
                    chunk: "Hi".to_string(),
                    full: "Hi".to_string(),
                },
                StreamEvent::Delta {
                    chunk: " there".to_string(),
                    full: "Hi there".to_string(),
                },
            ]
        );
    }

    #[test]
    fn done_sentinel_completes_with_trimmed_text() {
        let mut decoder = SseDecoder::new();
        decoder.feed(data_line("  Hi there ").as_bytes());
        let events = decoder.feed(b"data: [DONE]\n");

        assert_eq!(events, vec![StreamEvent::Completed("Hi there".to_string())]);
        assert!(decoder.is_done());
    }

    #[test]
    fn lines_after_done_are_discarded() {
        let mut decoder = SseDecoder::new();
        let input = format!("{}data: [DONE]\n{}", data_line("Hi"), data_line("ignored"));
        let events = decoder.feed(input.as_bytes());

        assert_eq!(delta_chunks(&events), vec!["Hi"]);
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Completed("Hi".to_string()))
        );

        // Further chunks are ignored entirely
        assert!(decoder.feed(data_line("more").as_bytes()).is_empty());
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let mut decoder = SseDecoder::new();
        let input = format!(": ping\n\nevent: noise\n{}", data_line("Hi"));
        let events = decoder.feed(input.as_bytes());

        assert_eq!(delta_chunks(&events), vec!["Hi"]);
    }

    #[test]
    fn malformed_json_is_skipped_without_aborting() {
        let mut decoder = SseDecoder::new();
        let input = format!(
            "{}data: {{not json}}\n{}",
            data_line("Hi"),
            data_line(" there")
        );
        let events = decoder.feed(input.as_bytes());

        assert_eq!(delta_chunks(&events), vec!["Hi", " there"]);
        assert_eq!(decoder.full_text(), "Hi there");
    }

    #[test]
    fn empty_and_missing_content_produce_no_event() {
        let mut decoder = SseDecoder::new();
        let input = format!(
            "{}data: {{\"choices\":[{{\"delta\":{{}}}}]}}\n{}",
            data_line(""),
            data_line("ok")
        );
        let events = decoder.feed(input.as_bytes());

        assert_eq!(delta_chunks(&events), vec!["ok"]);
    }

    #[test]
    fn line_split_across_chunks_is_reassembled() {
        let mut decoder = SseDecoder::new();
        let line = data_line("Hello");
        let (head, tail) = line.split_at(12);

        assert!(decoder.feed(head.as_bytes()).is_empty());
        let events = decoder.feed(tail.as_bytes());
        assert_eq!(delta_chunks(&events), vec!["Hello"]);
    }

    #[test]
    fn multibyte_code_point_split_across_chunks_stays_intact() {
        let mut decoder = SseDecoder::new();
        let line = data_line("日本語");
        let bytes = line.as_bytes();
        // Cut one byte into the three-byte encoding of the first character
        let cut = line.find('日').unwrap() + 1;

        assert!(decoder.feed(&bytes[..cut]).is_empty());
        let events = decoder.feed(&bytes[cut..]);

        assert_eq!(delta_chunks(&events), vec!["日本語"]);
        assert!(!decoder.full_text().contains('\u{FFFD}'));
    }

    #[test]
    fn crlf_lines_are_handled() {
        let mut decoder = SseDecoder::new();
        let events =
            decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\r\n");
        assert_eq!(delta_chunks(&events), vec!["Hi"]);
    }

    #[test]
    fn finish_completes_when_source_closes_without_sentinel() {
        let mut decoder = SseDecoder::new();
        decoder.feed(data_line("Hi there ").as_bytes());

        let events = decoder.finish();
        assert_eq!(events, vec![StreamEvent::Completed("Hi there".to_string())]);
    }

    #[test]
    fn finish_decodes_trailing_line_without_newline() {
        let mut decoder = SseDecoder::new();
        // No trailing newline on the last line
        decoder.feed(data_line("Hi").as_bytes());
        decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}");

        let events = decoder.finish();
        assert_eq!(delta_chunks(&events), vec!["!"]);
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Completed("Hi!".to_string()))
        );
    }

    #[test]
    fn delta_concatenation_equals_final_text() {
        let mut decoder = SseDecoder::new();
        let mut concatenated = String::new();
        let mut final_text = None;

        let input = format!(
            "{}{}{}data: [DONE]\n",
            data_line("The answer"),
            data_line(" is"),
            data_line(" 42.")
        );
        for event in decoder.feed(input.as_bytes()) {
            match event {
                StreamEvent::Delta { chunk, .. } => concatenated.push_str(&chunk),
                StreamEvent::Completed(text) => final_text = Some(text),
                StreamEvent::Error(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(final_text.unwrap(), concatenated.trim());
    }

    #[tokio::test]
    async fn pump_forwards_events_and_completes() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(data_line("Hi").into_bytes()),
            Ok(data_line(" there").into_bytes()),
            Ok(b"data: [DONE]\n".to_vec()),
        ];
        let (tx, mut rx) = mpsc::channel(16);

        pump(stream::iter(chunks), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(delta_chunks(&events), vec!["Hi", " there"]);
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Completed("Hi there".to_string()))
        );
    }

    #[tokio::test]
    async fn pump_reports_transport_errors() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(data_line("Hi").into_bytes()),
            Err(std::io::Error::other("connection reset")),
        ];
        let (tx, mut rx) = mpsc::channel(16);

        pump(stream::iter(chunks), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(delta_chunks(&events), vec!["Hi"]);
        assert!(matches!(events.last(), Some(StreamEvent::Error(_))));
    }

    #[tokio::test]
    async fn pump_completes_on_source_close() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(data_line("partial answer").into_bytes())];
        let (tx, mut rx) = mpsc::channel(16);

        pump(stream::iter(chunks), tx).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Completed("partial answer".to_string()))
        );
    }
}
