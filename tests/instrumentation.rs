//! Integration tests for logs and spans around boundary calls
//!
//! A capturing `log::Log` collects records for the whole test binary, so each
//! test filters by a statement text no other test uses.

#![cfg(feature = "mock")]

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use pgquery::{
    params, MarshallerConfig, MockHost, PgQuery, QueryError, QueryErrorKind, QueryMarshaller,
    ResponseBuffer,
};

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

fn install_logger() {
    // Only the first call in this binary succeeds; later ones keep that logger.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

fn records_mentioning(marker: &str) -> Vec<(Level, String)> {
    RECORDS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .filter(|(_, msg)| msg.contains(marker))
        .cloned()
        .collect()
}

#[test]
fn test_undecodable_reply_logged_at_error() {
    install_logger();
    let db = QueryMarshaller::new(
        MockHost::new().append_raw_response(ResponseBuffer::from_bytes(vec![0x7f])),
    );

    let err = db.query("SELECT 'garbled reply'", &[]).unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::ProtocolFailure);

    let records = records_mentioning("garbled reply");
    assert!(records
        .iter()
        .any(|(level, msg)| *level == Level::Error && msg.contains("could not be decoded")));
    assert!(!records.iter().any(|(level, _)| *level == Level::Warn));
}

#[test]
fn test_host_reported_protocol_failure_logged_at_warn() {
    install_logger();
    let db = QueryMarshaller::new(
        MockHost::new().append_query_errors(vec![QueryError::protocol("host saw a bad buffer")]),
    );

    let err = db.query("SELECT 'host protocol'", &[]).unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::ProtocolFailure);

    let records = records_mentioning("host protocol");
    assert!(records
        .iter()
        .any(|(level, msg)| *level == Level::Warn && msg.contains("host saw a bad buffer")));
    assert!(!records.iter().any(|(level, _)| *level == Level::Error));
    assert!(!records.iter().any(|(_, msg)| msg.contains("could not be decoded")));
}

#[test]
fn test_transport_and_batch_failures_logged_at_warn() {
    install_logger();
    let db = QueryMarshaller::new(
        MockHost::new()
            .append_transport_failure("link down")
            .append_batch_errors(vec![QueryError::statement("syntax error")]),
    );

    db.query("SELECT 'unreachable host'", &[]).unwrap_err();
    db.query_batch("SELECT 'broken batch'").unwrap_err();

    for marker in ["unreachable host", "broken batch"] {
        let records = records_mentioning(marker);
        assert!(
            records.iter().any(|(level, _)| *level == Level::Warn),
            "no warn! for {marker}: {records:?}"
        );
        assert!(!records.iter().any(|(level, _)| *level == Level::Error));
    }
}

#[test]
fn test_param_values_withheld_by_default() {
    install_logger();
    let host = MockHost::new()
        .append_query_results(vec![vec![], vec![]]);
    let db = QueryMarshaller::new(&host);
    db.query("SELECT 'quiet params' WHERE pw = $1", &params!["hunter2"])
        .unwrap();

    let records = records_mentioning("quiet params");
    assert!(records
        .iter()
        .any(|(level, msg)| *level == Level::Debug && msg.contains("[text]")));
    assert!(!records.iter().any(|(_, msg)| msg.contains("hunter2")));

    let verbose = QueryMarshaller::with_config(
        &host,
        MarshallerConfig {
            log_params: true,
            ..MarshallerConfig::default()
        },
    );
    verbose
        .query("SELECT 'loud params' WHERE pw = $1", &params!["hunter3"])
        .unwrap();
    assert!(records_mentioning("loud params")
        .iter()
        .any(|(_, msg)| msg.contains("hunter3")));
}

#[cfg(feature = "tracing")]
mod spans {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use pgquery::{params, MockHost, PgQuery, QueryMarshaller, INTERFACE_ID};
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Debug, Clone)]
    struct SeenSpan {
        name: &'static str,
        fields: Vec<(String, String)>,
    }

    impl SeenSpan {
        fn field(&self, name: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }
    }

    #[derive(Clone, Default)]
    struct SpanRecorder {
        spans: Arc<Mutex<Vec<SeenSpan>>>,
    }

    struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: Subscriber> Layer<S> for SpanRecorder {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            let mut fields = Vec::new();
            attrs.record(&mut FieldVisitor(&mut fields));
            self.spans.lock().unwrap().push(SeenSpan {
                name: attrs.metadata().name(),
                fields,
            });
        }
    }

    #[test]
    fn test_query_and_batch_spans_carry_interface_fields() {
        let recorder = SpanRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let db = QueryMarshaller::new(
                MockHost::new()
                    .append_query_results(vec![vec![]])
                    .append_batch_ok(),
            );
            db.query("SELECT $1, $2", &params![1i32, "x"]).unwrap();
            db.query_batch("CREATE TABLE t(x int)").unwrap();
        });

        let spans = recorder.spans.lock().unwrap().clone();
        let query = spans
            .iter()
            .find(|s| s.name == "pgquery.query")
            .expect("query span");
        assert_eq!(query.field("interface"), Some(INTERFACE_ID));
        assert_eq!(query.field("param_count"), Some("2"));
        assert_eq!(query.field("db.statement"), Some("SELECT $1, $2"));

        let batch = spans
            .iter()
            .find(|s| s.name == "pgquery.query_batch")
            .expect("query_batch span");
        assert_eq!(batch.field("interface"), Some(INTERFACE_ID));
        assert_eq!(batch.field("db.statement"), Some("CREATE TABLE t(x int)"));
        assert_eq!(batch.field("param_count"), None);
    }

    #[test]
    fn test_rejected_empty_query_opens_no_span() {
        let recorder = SpanRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            let db = QueryMarshaller::new(MockHost::new());
            db.query("", &[]).unwrap_err();
        });

        assert!(recorder.spans.lock().unwrap().is_empty());
    }
}
