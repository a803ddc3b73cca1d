// Configuration module entry point
// Loads the optional greeter config file on top of built-in defaults

mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{AccessLogFormat, Config, LoggingConfig};

/// Config file looked up in the working directory (extension inferred)
pub const DEFAULT_CONFIG_NAME: &str = "greeter";

impl Config {
    /// Load configuration from the default config file, if present
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_NAME)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error: every key has a default.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 2005)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.listen_backlog", 128)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/greeter").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 2005);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Common);
        assert!(cfg.performance.keep_alive);
        assert_eq!(cfg.performance.listen_backlog, 128);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("does-not-exist/greeter").unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:2005".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
