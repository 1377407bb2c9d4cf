//! Diagnostic records for outgoing requests and incoming responses.
//!
//! `GameApi` hands each record to a `LogSink` when logging is enabled. The
//! default sink forwards to `tracing`; tests and embedders inject their own
//! (any `Fn(&LogRecord)` is a sink).

use tracing::{debug, warn};

use crate::http::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    Request {
        method: HttpMethod,
        url: String,
        body: Option<String>,
    },
    Response {
        method: HttpMethod,
        url: String,
        status: u16,
    },
    Failure {
        method: HttpMethod,
        url: String,
        error: String,
    },
}

pub trait LogSink: Send + Sync {
    fn record(&self, record: &LogRecord);
}

impl<F> LogSink for F
where
    F: Fn(&LogRecord) + Send + Sync,
{
    fn record(&self, record: &LogRecord) {
        self(record)
    }
}

/// Writes records as `tracing` events under the `cave_client` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: &LogRecord) {
        match record {
            LogRecord::Request { method, url, body } => {
                debug!(target: "cave_client", %method, %url, body = body.as_deref().unwrap_or(""), "api request");
            }
            LogRecord::Response {
                method,
                url,
                status,
            } => {
                debug!(target: "cave_client", %method, %url, status, "api response");
            }
            LogRecord::Failure { method, url, error } => {
                warn!(target: "cave_client", %method, %url, %error, "api request failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |r: &LogRecord| seen.lock().unwrap().push(r.clone())
        };
        let record = LogRecord::Response {
            method: HttpMethod::Get,
            url: "http://localhost:8000/health".to_string(),
            status: 200,
        };
        sink.record(&record);
        assert_eq!(*seen.lock().unwrap(), vec![record]);
    }

    /// Shared buffer a fmt subscriber writes into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(level: tracing::Level, records: &[LogRecord]) -> String {
        let buf = Captured::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(level)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            for record in records {
                TracingSink.record(record);
            }
        });
        let bytes = buf.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn request_and_failure() -> Vec<LogRecord> {
        vec![
            LogRecord::Request {
                method: HttpMethod::Post,
                url: "http://localhost:8000/start_game".to_string(),
                body: Some(r#"{"player_name":"Ava"}"#.to_string()),
            },
            LogRecord::Failure {
                method: HttpMethod::Get,
                url: "http://localhost:8000/health".to_string(),
                error: "Request timed out".to_string(),
            },
        ]
    }

    #[test]
    fn tracing_sink_writes_structured_events() {
        let out = capture(tracing::Level::DEBUG, &request_and_failure());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{out}");

        assert!(lines[0].contains("DEBUG"), "{out}");
        assert!(lines[0].contains("cave_client"), "{out}");
        assert!(lines[0].contains("api request"), "{out}");
        assert!(lines[0].contains("method=POST"), "{out}");
        assert!(lines[0].contains("url=http://localhost:8000/start_game"), "{out}");

        assert!(lines[1].contains("WARN"), "{out}");
        assert!(lines[1].contains("api request failed"), "{out}");
        assert!(lines[1].contains("error=Request timed out"), "{out}");
    }

    #[test]
    fn tracing_sink_requests_are_debug_only() {
        let out = capture(tracing::Level::INFO, &request_and_failure());
        assert_eq!(out.lines().count(), 1, "{out}");
        assert!(out.contains("api request failed"), "{out}");
    }
}
