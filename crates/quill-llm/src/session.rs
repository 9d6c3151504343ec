//! The streaming generation client.
//!
//! [`Session::start`] hands one prompt to a worker thread, which expands its
//! directives, frames it with the conversation so far, POSTs it to the
//! generation endpoint and forwards response fragments as they arrive. The
//! foreground polls the returned [`Generation`]; dropping it is the only way to
//! cancel, and the worker notices at its next send. History is only touched by
//! the foreground, through [`Session::record`].

use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::embed::{HttpResolver, Resolver, expand_commands};
use crate::error::SessionError;
use crate::history::{Exchange, History};

pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub model: String,
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` lets a long generation run to the end.
    pub timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            connect_timeout: Duration::from_secs(10),
            timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// One line of the newline-delimited response stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerateChunk {
    pub response: String,
    pub done: bool,
}

// ---------------------------------------------------------------------------
// Stream decoding
// ---------------------------------------------------------------------------

/// How a response stream ended, with all the text it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// A chunk with `done: true` arrived.
    Complete(String),
    /// The stream ended or broke before `done`.
    Incomplete(String),
    /// The fragment callback asked to stop.
    Cancelled(String),
}

impl StreamOutcome {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Complete(text) | Self::Incomplete(text) | Self::Cancelled(text) => text,
        }
    }
}

/// Read newline-delimited chunks from `reader`, passing each non-empty
/// `response` to `on_fragment`. Lines that are not valid chunks are skipped.
/// Returning `false` from `on_fragment` stops reading.
pub fn decode_stream<R: BufRead>(
    mut reader: R,
    mut on_fragment: impl FnMut(&str) -> bool,
) -> StreamOutcome {
    let mut text = String::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return StreamOutcome::Incomplete(text),
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "generation stream broke");
                return StreamOutcome::Incomplete(text);
            }
        }

        let raw = line.trim_ascii();
        if raw.is_empty() {
            continue;
        }
        let chunk: GenerateChunk = match serde_json::from_slice(raw) {
            Ok(chunk) => chunk,
            Err(err) => {
                warn!(
                    error = %err,
                    line = %String::from_utf8_lossy(raw),
                    "skipping malformed stream line"
                );
                continue;
            }
        };

        if !chunk.response.is_empty() {
            text.push_str(&chunk.response);
            if !on_fragment(&chunk.response) {
                return StreamOutcome::Cancelled(text);
            }
        }
        if chunk.done {
            return StreamOutcome::Complete(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What the worker reports. Everything but `Fragment` is the last event.
#[derive(Debug)]
pub enum StreamEvent {
    Fragment(String),
    Finished(Exchange),
    Incomplete { partial: String },
    Failed(SessionError),
}

impl StreamEvent {
    #[must_use]
    pub const fn is_final(&self) -> bool {
        !matches!(self, Self::Fragment(_))
    }
}

/// Handle to one in-flight generation. Drop it to cancel.
#[derive(Debug)]
pub struct Generation {
    rx: Receiver<StreamEvent>,
    settled: bool,
}

impl Generation {
    fn failed(err: SessionError) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(StreamEvent::Failed(err));
        Self { rx, settled: false }
    }

    /// The next event if one is waiting. Yields `None` forever after the
    /// final event.
    pub fn try_next(&mut self) -> Option<StreamEvent> {
        if self.settled {
            return None;
        }
        let event = match self.rx.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => StreamEvent::Failed(SessionError::WorkerLost),
        };
        self.settled = event.is_final();
        Some(event)
    }

    /// True once the final event has been handed out.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled
    }
}

/// Blocking iteration up to and including the final event.
impl Iterator for Generation {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        if self.settled {
            return None;
        }
        let event = self
            .rx
            .recv()
            .unwrap_or_else(|_| StreamEvent::Failed(SessionError::WorkerLost));
        self.settled = event.is_final();
        Some(event)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Client configuration plus the conversation so far.
pub struct Session {
    config: SessionConfig,
    client: Client,
    resolver: Arc<dyn Resolver>,
    history: History,
}

impl Session {
    /// # Errors
    ///
    /// The HTTP client could not be built.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SessionError::Client)?;
        let resolver = Arc::new(HttpResolver::new(client.clone()));
        Ok(Self {
            config,
            client,
            resolver,
            history: History::new(),
        })
    }

    /// Replace where `@file` and `@link` contents come from.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Append a finished exchange so later prompts carry it.
    pub fn record(&mut self, exchange: Exchange) {
        debug!(exchanges = self.history.len() + 1, "recording exchange");
        self.history.push(exchange);
    }

    /// Start generating a response to `prompt` on a worker thread.
    pub fn start(&self, prompt: &str) -> Generation {
        let job = Job {
            client: self.client.clone(),
            resolver: Arc::clone(&self.resolver),
            endpoint: self.config.endpoint.clone(),
            model: self.config.model.clone(),
            history: self.history.clone(),
            prompt: prompt.to_owned(),
        };
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("quill-generate".into())
            .spawn(move || job.run(&tx));
        match spawned {
            Ok(_) => Generation { rx, settled: false },
            Err(err) => Generation::failed(SessionError::Spawn(err)),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct Job {
    client: Client,
    resolver: Arc<dyn Resolver>,
    endpoint: String,
    model: String,
    history: History,
    prompt: String,
}

impl Job {
    fn run(self, tx: &Sender<StreamEvent>) {
        let event = self.generate(tx).unwrap_or_else(StreamEvent::Failed);
        if tx.send(event).is_err() {
            debug!("generation cancelled");
        }
    }

    fn generate(self, tx: &Sender<StreamEvent>) -> Result<StreamEvent, SessionError> {
        let expanded = expand_commands(&self.prompt, self.resolver.as_ref())?;
        let prompt = self.history.build_prompt(&expanded);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: true,
        };
        info!(
            model = %self.model,
            endpoint = %self.endpoint,
            bytes = prompt.len(),
            "sending generation request"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|source| SessionError::Transport {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SessionError::ModelUnavailable { model: self.model });
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SessionError::Status {
                status: status.as_u16(),
                body: body.trim().to_owned(),
            });
        }

        let outcome = decode_stream(BufReader::new(resp), |fragment| {
            tx.send(StreamEvent::Fragment(fragment.to_owned())).is_ok()
        });
        debug!(chars = outcome.text().chars().count(), "generation stream ended");

        Ok(match outcome {
            StreamOutcome::Complete(response) => {
                StreamEvent::Finished(Exchange::new(self.prompt, response))
            }
            StreamOutcome::Incomplete(partial) | StreamOutcome::Cancelled(partial) => {
                StreamEvent::Incomplete { partial }
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Mutex;
    use std::thread::JoinHandle;
    use std::time::Instant;

    // -- decode_stream -------------------------------------------------------

    fn decode(input: &str) -> (Vec<String>, StreamOutcome) {
        let mut fragments = Vec::new();
        let outcome = decode_stream(Cursor::new(input), |f| {
            fragments.push(f.to_owned());
            true
        });
        (fragments, outcome)
    }

    #[test]
    fn decode_forwards_fragments_until_done() {
        let (fragments, outcome) = decode(
            "{\"response\":\"Hel\",\"done\":false}\n\
             {\"response\":\"lo\",\"done\":false}\n\
             {\"response\":\"\",\"done\":true}\n\
             {\"response\":\"ignored\",\"done\":false}\n",
        );
        assert_eq!(fragments, vec!["Hel", "lo"]);
        assert_eq!(outcome, StreamOutcome::Complete("Hello".into()));
    }

    #[test]
    fn decode_keeps_text_on_the_done_chunk() {
        let (fragments, outcome) = decode("{\"response\":\"all at once\",\"done\":true}");
        assert_eq!(fragments, vec!["all at once"]);
        assert_eq!(outcome, StreamOutcome::Complete("all at once".into()));
    }

    #[test]
    fn decode_skips_malformed_and_blank_lines() {
        let (fragments, outcome) = decode(
            "not json\n\n{\"response\":\"a\"}\n{\"model\":\"m\",\"response\":\"b\",\"done\":true,\"eval_count\":3}\n",
        );
        assert_eq!(fragments, vec!["a", "b"]);
        assert_eq!(outcome, StreamOutcome::Complete("ab".into()));
    }

    #[test]
    fn decode_without_done_is_incomplete() {
        let (fragments, outcome) = decode("{\"response\":\"half\",\"done\":false}\n");
        assert_eq!(fragments, vec!["half"]);
        assert_eq!(outcome, StreamOutcome::Incomplete("half".into()));
        assert_eq!(decode("").1, StreamOutcome::Incomplete(String::new()));
    }

    #[test]
    fn decode_stops_when_the_callback_refuses() {
        let mut seen = 0;
        let outcome = decode_stream(
            Cursor::new("{\"response\":\"a\"}\n{\"response\":\"b\"}\n{\"done\":true}\n"),
            |_| {
                seen += 1;
                false
            },
        );
        assert_eq!(seen, 1);
        assert_eq!(outcome, StreamOutcome::Cancelled("a".into()));
        assert_eq!(outcome.text(), "a");
    }

    #[test]
    fn request_serializes_with_stream_flag() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "hi",
            stream: true,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"model":"llama3.2","prompt":"hi","stream":true}"#
        );
    }

    #[test]
    fn default_config_points_at_the_local_server() {
        let config = SessionConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, None);
    }

    // -- Generation handle ---------------------------------------------------

    #[test]
    fn generation_reports_a_vanished_worker_once() {
        let (tx, rx) = mpsc::channel::<StreamEvent>();
        drop(tx);
        let mut generation = Generation { rx, settled: false };
        assert!(matches!(
            generation.try_next(),
            Some(StreamEvent::Failed(SessionError::WorkerLost))
        ));
        assert!(generation.is_settled());
        assert!(generation.try_next().is_none());
    }

    #[test]
    fn generation_stops_after_the_final_event() {
        let (tx, rx) = mpsc::channel();
        tx.send(StreamEvent::Fragment("a".into())).unwrap();
        tx.send(StreamEvent::Incomplete {
            partial: "a".into(),
        })
        .unwrap();
        tx.send(StreamEvent::Fragment("late".into())).unwrap();
        let generation = Generation { rx, settled: false };
        let events: Vec<_> = generation.collect();
        assert_eq!(events.len(), 2);
        assert!(events[1].is_final());
    }

    // -- Mock server ---------------------------------------------------------

    struct MockResponse {
        status: u16,
        body: String,
    }

    impl MockResponse {
        fn ok(body: &str) -> Self {
            Self {
                status: 200,
                body: body.to_owned(),
            }
        }
    }

    struct MockServer {
        endpoint: String,
        requests: Arc<Mutex<Vec<String>>>,
        stop_tx: Option<Sender<()>>,
        handle: Option<JoinHandle<()>>,
    }

    impl MockServer {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn request_json(&self, idx: usize) -> serde_json::Value {
            serde_json::from_str(&self.requests()[idx]).unwrap()
        }
    }

    impl Drop for MockServer {
        fn drop(&mut self) {
            if let Some(tx) = self.stop_tx.take() {
                let _ = tx.send(());
            }
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn start_mock_server(script: Vec<MockResponse>) -> MockServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let (tx, rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let mut script = script.into_iter();
            loop {
                if rx.try_recv().is_ok() {
                    break;
                }
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        let body = consume_http_request(&mut stream).unwrap_or_default();
                        seen.lock().unwrap().push(body);
                        let reply = script.next().unwrap_or(MockResponse {
                            status: 500,
                            body: "script exhausted".into(),
                        });
                        let status_text = match reply.status {
                            200 => "OK",
                            404 => "Not Found",
                            500 => "Internal Server Error",
                            _ => "Error",
                        };
                        let response = format!(
                            "HTTP/1.1 {} {status_text}\r\nContent-Type: application/x-ndjson\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            reply.status,
                            reply.body.len(),
                            reply.body
                        );
                        let _ = stream.write_all(response.as_bytes());
                        let _ = stream.flush();
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(2));
                    }
                    Err(_) => break,
                }
            }
        });

        MockServer {
            endpoint: format!("http://{addr}/api/generate"),
            requests,
            stop_tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Reads one request and returns its body.
    fn consume_http_request(stream: &mut TcpStream) -> std::io::Result<String> {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 1024];
        let mut header_end = None;
        while header_end.is_none() {
            let read = stream.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
            header_end = buffer
                .windows(4)
                .position(|window| window == b"\r\n\r\n")
                .map(|idx| idx + 4);
        }
        let header_len = header_end.unwrap_or(buffer.len());
        let content_length = parse_content_length(&buffer[..header_len]);
        let mut body = buffer[header_len..].to_vec();
        while body.len() < content_length {
            let read = stream.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn parse_content_length(headers: &[u8]) -> usize {
        String::from_utf8_lossy(headers)
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    fn session_for(server: &MockServer) -> Session {
        Session::new(SessionConfig {
            model: "test-model".into(),
            endpoint: server.endpoint.clone(),
            connect_timeout: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(10)),
        })
        .unwrap()
    }

    fn fragments(events: &[StreamEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Fragment(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    const HELLO_STREAM: &str = "{\"response\":\"Hel\",\"done\":false}\n\
                                {\"response\":\"lo\",\"done\":false}\n\
                                {\"response\":\"\",\"done\":true}\n";

    // -- Session -------------------------------------------------------------

    #[test]
    fn streams_fragments_then_finishes() {
        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let session = session_for(&server);

        let events: Vec<_> = session.start("Hey").collect();
        assert_eq!(fragments(&events), vec!["Hel", "lo"]);
        match events.last() {
            Some(StreamEvent::Finished(exchange)) => {
                assert_eq!(exchange, &Exchange::new("Hey", "Hello"));
            }
            other => panic!("expected Finished, got {other:?}"),
        }

        let request = server.request_json(0);
        assert_eq!(request["model"], "test-model");
        assert_eq!(request["prompt"], "<User Prompt>\nHey\n</User Prompt>\n");
        assert_eq!(request["stream"], true);
    }

    #[test]
    fn directives_are_expanded_but_history_keeps_the_typed_prompt() {
        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let session = session_for(&server);

        let events: Vec<_> = session.start("Hello, @text(World!)").collect();
        assert_eq!(
            server.request_json(0)["prompt"],
            "<User Prompt>\nHello, World!\n</User Prompt>\n"
        );
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Finished(exchange)) if exchange.prompt == "Hello, @text(World!)"
        ));
    }

    #[test]
    fn recorded_exchanges_prefix_the_next_prompt() {
        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let mut session = session_for(&server);
        session.record(Exchange::new("Hi", "Hello!"));
        assert_eq!(session.history().len(), 1);

        let _events: Vec<_> = session.start("Again").collect();
        assert_eq!(
            server.request_json(0)["prompt"],
            "<User Message>\nHi\n</User Message>\n\
             <Assistant Response>\nHello!\n</Assistant Response>\n\
             <User Prompt>\nAgain\n</User Prompt>\n"
        );
    }

    #[test]
    fn finishing_does_not_touch_history() {
        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let session = session_for(&server);
        let _events: Vec<_> = session.start("Hey").collect();
        assert!(session.history().is_empty());
    }

    #[test]
    fn missing_model_is_reported_by_name() {
        let server = start_mock_server(vec![MockResponse {
            status: 404,
            body: "{\"error\":\"model not found\"}".into(),
        }]);
        let events: Vec<_> = session_for(&server).start("Hey").collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            StreamEvent::Failed(err @ SessionError::ModelUnavailable { .. }) => assert_eq!(
                err.to_string(),
                "test-model is either not running or is not a valid model"
            ),
            other => panic!("expected ModelUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn other_statuses_carry_the_body() {
        let server = start_mock_server(vec![MockResponse {
            status: 500,
            body: "overloaded\n".into(),
        }]);
        let events: Vec<_> = session_for(&server).start("Hey").collect();
        assert!(matches!(
            &events[0],
            StreamEvent::Failed(SessionError::Status { status: 500, body }) if body == "overloaded"
        ));
    }

    #[test]
    fn stream_without_done_is_incomplete() {
        let server = start_mock_server(vec![MockResponse::ok(
            "{\"response\":\"part\",\"done\":false}\nnot json\n{\"response\":\"ial\",\"done\":false}\n",
        )]);
        let events: Vec<_> = session_for(&server).start("Hey").collect();
        assert_eq!(fragments(&events), vec!["part", "ial"]);
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Incomplete { partial }) if partial == "partial"
        ));
    }

    #[test]
    fn unknown_directive_fails_without_a_request() {
        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let events: Vec<_> = session_for(&server).start("@attach-markdown(x.md)").collect();
        assert!(matches!(
            &events[0],
            StreamEvent::Failed(SessionError::Expand(_))
        ));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let session = Session::new(SessionConfig {
            endpoint: format!("http://127.0.0.1:{port}/api/generate"),
            connect_timeout: Duration::from_secs(2),
            ..SessionConfig::default()
        })
        .unwrap();

        let events: Vec<_> = session.start("Hey").collect();
        assert!(matches!(
            &events[0],
            StreamEvent::Failed(SessionError::Transport { .. })
        ));
    }

    #[test]
    fn try_next_polls_without_blocking() {
        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let session = session_for(&server);
        let mut generation = session.start("Hey");

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while !generation.is_settled() && Instant::now() < deadline {
            match generation.try_next() {
                Some(event) => events.push(event),
                None => thread::sleep(Duration::from_millis(5)),
            }
        }
        assert!(generation.is_settled());
        assert_eq!(fragments(&events), vec!["Hel", "lo"]);
        assert!(matches!(events.last(), Some(StreamEvent::Finished(_))));
    }

    #[test]
    fn custom_resolver_supplies_file_contents() {
        struct Fixed;
        impl Resolver for Fixed {
            fn read_file(&self, _path: &str) -> Result<Vec<u8>, crate::ExpandError> {
                Ok(b"fn main() {}".to_vec())
            }
            fn fetch_link(&self, _url: &str) -> Result<Vec<u8>, crate::ExpandError> {
                Ok(Vec::new())
            }
        }

        let server = start_mock_server(vec![MockResponse::ok(HELLO_STREAM)]);
        let session = session_for(&server).with_resolver(Arc::new(Fixed));
        let _events: Vec<_> = session.start("@file(main.rs)").collect();
        assert_eq!(
            server.request_json(0)["prompt"],
            "<User Prompt>\n<file name=\"main.rs\">\nfn main() {}\n</file>\n\n</User Prompt>\n"
        );
    }
}
