//! Log and span helpers for boundary calls.
//!
//! The `log` facade is always on. `tracing` spans are added when the
//! `tracing` feature is enabled.

use crate::config::MarshallerConfig;
use crate::value::PgValue;

/// Statement text as it may appear in logs: truncated on a char boundary,
/// or withheld entirely when statement logging is off.
pub fn loggable_statement(config: &MarshallerConfig, query: &str) -> String {
    if !config.log_statements {
        return format!("<{} bytes>", query.len());
    }
    if query.len() <= config.statement_log_limit {
        return query.to_string();
    }
    let mut end = config.statement_log_limit;
    while !query.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &query[..end])
}

/// Parameter list as it may appear in logs. Only type names unless `log_params` is set.
pub fn loggable_params(config: &MarshallerConfig, params: &[PgValue]) -> String {
    let parts: Vec<String> = if config.log_params {
        params.iter().map(|p| p.to_string()).collect()
    } else {
        params.iter().map(|p| p.type_name().to_string()).collect()
    };
    format!("[{}]", parts.join(", "))
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    use crate::wire::INTERFACE_ID;

    /// Span around a single `query` boundary call.
    pub fn query_span(statement: &str, param_count: usize) -> Span {
        tracing::debug_span!(
            "pgquery.query",
            interface = INTERFACE_ID,
            db.statement = statement,
            param_count = param_count
        )
    }

    /// Span around a `query-batch` boundary call.
    pub fn query_batch_span(statement: &str) -> Span {
        tracing::debug_span!(
            "pgquery.query_batch",
            interface = INTERFACE_ID,
            db.statement = statement
        )
    }
}
