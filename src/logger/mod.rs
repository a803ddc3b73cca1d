//! Logger module
//!
//! Provides logging utilities for the greeting server including:
//! - Server lifecycle logging
//! - Access logging in common or JSON format
//! - Error and warning logging
//!
//! Info and access lines go to stdout, errors and warnings to stderr.

mod format;

pub use format::AccessLogEntry;

use crate::config::{AccessLogFormat, Config};
use std::net::SocketAddr;

fn write_info(message: &str) {
    println!("{message}");
}

fn write_error(message: &str) {
    eprintln!("{message}");
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(&format!("Server is running on http://{addr}"));
    if config.logging.access_log {
        write_info(&format!(
            "Access log: enabled ({:?} format)",
            config.logging.access_log_format
        ));
    }
}

pub fn log_server_stop(addr: &SocketAddr) {
    write_info(&format!("Server on http://{addr} stopped"));
}

pub fn log_signal(name: &str) {
    write_info(&format!("[SIGNAL] {name} received, shutting down"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    write_info(&entry.format(format));
}
