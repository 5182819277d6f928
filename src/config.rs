// MIT License - Copyright (c) 2026 Peter Wright
// Reader configuration

use std::time::Duration;

use crate::constants::DEFAULT_PORT;
use crate::reader::LogClass;

/// Configuration for reading the event log of a panel.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Panel (ETHM module) IP address or host name
    pub host: String,
    /// Panel TCP port (default: 7094)
    pub port: u16,
    /// Connection establishment timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Time allowed for each response, in milliseconds
    pub request_timeout_ms: u64,
    /// Pause between sending a request and reading its response, in milliseconds
    pub request_delay_ms: u64,
    /// Stop once this many events have been gathered across all classes
    pub limit: Option<usize>,
    /// Log classes to read, in order
    pub classes: Vec<LogClass>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            host: "192.168.1.100".to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            request_timeout_ms: 5000,
            request_delay_ms: 50,
            limit: None,
            classes: vec![LogClass::Standard],
        }
    }
}

impl ReaderConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder::default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Builder for ReaderConfig.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    /// `0` means no limit, matching the command-line convention.
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn classes(mut self, classes: impl IntoIterator<Item = LogClass>) -> Self {
        self.config.classes = classes.into_iter().collect();
        self
    }

    /// Read the standard log, then the Grade 2 log.
    pub fn both_classes(self) -> Self {
        self.classes([LogClass::Standard, LogClass::Grade2])
    }

    pub fn build(self) -> ReaderConfig {
        self.config
    }
}
