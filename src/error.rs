use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the layout engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    #[error("invalid date {input:?}: expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("round {event_id} ends ({end}) before it starts ({start})")]
    InconsistentEventSpan {
        event_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML header: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("failed to parse round on line {line}: {source}")]
    JsonDecode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    TomlDecode(#[from] toml::de::Error),
}
