//! Access log format module
//!
//! Supports two log formats:
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::AccessLogFormat;

/// Access log entry for one request/response exchange
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    /// Client IP address
    pub remote_addr: String,
    /// Request timestamp
    pub time: DateTime<Local>,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: u64,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            status: 200,
            body_bytes: 0,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Common => self.format_common(),
            AccessLogFormat::Json => self.format_json(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}{} HTTP/1.1\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.query
                .as_ref()
                .map(|q| format!("?{q}"))
                .unwrap_or_default(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"log_error":"failed to serialize access log entry: {e}"}}"#)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "127.0.0.1".to_string(),
            "GET".to_string(),
            "/greeting".to_string(),
        );
        entry.query = Some("name=Alice&age=25".to_string());
        entry.status = 200;
        entry.body_bytes = 55;
        entry.request_time_us = 120;
        entry
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format(AccessLogFormat::Common);
        assert!(log.starts_with("127.0.0.1 - - ["));
        assert!(log.contains("\"GET /greeting?name=Alice&age=25 HTTP/1.1\""));
        assert!(log.ends_with("200 55"));
    }

    #[test]
    fn test_format_common_without_query() {
        let mut entry = create_test_entry();
        entry.query = None;
        entry.path = "/".to_string();
        entry.status = 404;
        let log = entry.format(AccessLogFormat::Common);
        assert!(log.contains("\"GET / HTTP/1.1\" 404"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format(AccessLogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "127.0.0.1");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["query"], "name=Alice&age=25");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 55);
        assert_eq!(value["request_time_us"], 120);
    }
}
