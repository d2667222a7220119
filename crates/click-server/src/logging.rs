//! Per-request structured logging.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use click_core::RequestId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log level for request logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Output format for request logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// `[LEVEL] message (123us) | key=value`.
    Human,
}

/// A single request log line.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Request ID for correlation.
    pub request_id: String,
    /// Application name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// Resource path of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
    /// Microseconds since the request started.
    pub elapsed_us: u64,
}

impl LogEntry {
    /// Format as a JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format for humans.
    pub fn to_human(&self) -> String {
        let mut line = format!("[{}] {} ({}us)", self.level, self.message, self.elapsed_us);
        if let Some(path) = &self.path {
            line.push_str(&format!(" {}", path));
        }
        if !self.fields.is_empty() {
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => format!("{}={}", k, s),
                    other => format!("{}={}", k, other),
                })
                .collect();
            line.push_str(" | ");
            line.push_str(&fields.join(" "));
        }
        line
    }

    /// Format in the given output format.
    pub fn format(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Json => self.to_json(),
            LogFormat::Human => self.to_human(),
        }
    }
}

/// Logger bound to one request.
///
/// Every entry carries the request id, the application name and the
/// resource path, and is written to stderr.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: RequestId,
    app: Option<String>,
    path: Option<String>,
    start_time: Instant,
    min_level: LogLevel,
    format: LogFormat,
}

impl RequestLogger {
    /// Create a logger for a request.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            app: None,
            path: None,
            start_time: Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
        }
    }

    /// Set the application name.
    pub fn with_app(mut self, app: impl Into<String>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Set the resource path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the minimum level written.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Check whether entries at `level` are written.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message, BTreeMap::new());
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, BTreeMap::new());
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    /// Build an entry, or `None` when `level` is below the minimum.
    pub fn entry(
        &self,
        level: LogLevel,
        message: &str,
        fields: BTreeMap<String, Value>,
    ) -> Option<LogEntry> {
        if !self.enabled(level) {
            return None;
        }
        Some(LogEntry {
            level,
            message: message.to_string(),
            request_id: self.request_id.to_string(),
            app: self.app.clone(),
            path: self.path.clone(),
            fields,
            elapsed_us: self.elapsed_us(),
        })
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, Value>) {
        if let Some(entry) = self.entry(level, message, fields) {
            eprintln!("{}", entry.format(self.format));
        }
    }

    /// The request ID.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Time since the logger was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Microseconds since the logger was created.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }

    pub fn trace_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Trace, message)
    }

    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }

    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }
}

/// Fluent builder for an entry with fields.
pub struct LogBuilder<'a> {
    logger: &'a RequestLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, Value>,
}

impl<'a> LogBuilder<'a> {
    pub fn new(logger: &'a RequestLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), Value::String(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), Value::from(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// Add an arbitrary JSON field.
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Add a duration in milliseconds.
    pub fn duration_ms(mut self, key: &str, duration: Duration) -> Self {
        self.fields
            .insert(key.to_string(), Value::from(duration.as_millis() as u64));
        self
    }

    /// Build the entry without writing it.
    pub fn build(self) -> Option<LogEntry> {
        self.logger.entry(self.level, &self.message, self.fields)
    }

    /// Write the entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> RequestLogger {
        RequestLogger::new(RequestId::from_string("req-1"))
            .with_app("shop")
            .with_path("/home.htm")
    }

    #[test]
    fn test_min_level_filters() {
        let logger = logger().with_min_level(LogLevel::Warn);

        assert!(logger.entry(LogLevel::Info, "skip", BTreeMap::new()).is_none());
        assert!(logger.entry(LogLevel::Error, "keep", BTreeMap::new()).is_some());
        assert!(LogLevel::Trace < LogLevel::Debug);
    }

    #[test]
    fn test_json_entry() {
        let entry = logger()
            .info_builder("request handled")
            .field_i64("status", 200)
            .build()
            .unwrap();
        let json: Value = serde_json::from_str(&entry.to_json()).unwrap();

        assert_eq!(json["level"], "info");
        assert_eq!(json["request_id"], "req-1");
        assert_eq!(json["app"], "shop");
        assert_eq!(json["path"], "/home.htm");
        assert_eq!(json["status"], 200);
    }

    #[test]
    fn test_human_entry() {
        let entry = logger()
            .warn_builder("slow")
            .field("page", "HomePage")
            .field_bool("post", false)
            .build()
            .unwrap();
        let line = entry.to_human();

        assert!(line.starts_with("[WARN] slow ("));
        assert!(line.ends_with("/home.htm | page=HomePage post=false"));
    }

    #[test]
    fn test_config_names() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        let format: LogFormat = serde_json::from_str("\"human\"").unwrap();

        assert_eq!(level, LogLevel::Debug);
        assert_eq!(format, LogFormat::Human);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
