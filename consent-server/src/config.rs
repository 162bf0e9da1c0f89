use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for the consent server
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// The port the server will listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the consent service that stores grants and issues codes
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Total timeout for consent service calls in seconds (0 disables the timeout)
    #[serde(default)]
    pub request_timeout: u64,

    /// Connect timeout for consent service calls in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Accept-Language used when the browser does not send one
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

fn default_port() -> u16 {
    8480
}

fn default_backend_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_accept_language() -> String {
    "en".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            backend_url: default_backend_url(),
            request_timeout: 0,
            connect_timeout: default_connect_timeout(),
            accept_language: default_accept_language(),
        }
    }
}

impl Settings {
    /// Creates a new Settings instance from `CONSENT_*` environment variables
    pub fn new() -> Result<Self, String> {
        Self::load(None)
    }

    /// Loads settings from the given variables instead of the process environment
    fn load(source: Option<HashMap<String, String>>) -> Result<Self, String> {
        Config::builder()
            .add_source(
                Environment::with_prefix("CONSENT")
                    .prefix_separator("_")
                    .separator("__")
                    .source(source),
            )
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }

    #[cfg(test)]
    pub fn for_test_with_mock(backend_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            backend_url: backend_mock.uri(),
            request_timeout: 5,
            ..Default::default()
        }
    }
}
