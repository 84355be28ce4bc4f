//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pot::PotKind;

/// Root configuration for the HTCPCP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Which HTTP front end serves the routes.
    pub frontend: Frontend,

    /// Listener configuration (bind host/port, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Pot registry seeded at start-up.
    pub pots: Vec<PotConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            frontend: Frontend::default(),
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
            pots: default_pots(),
        }
    }
}

/// HTTP front end selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frontend {
    /// Hand-rolled HTTP/1.1 reader over raw TCP.
    #[default]
    Raw,
    /// Axum application adapting into the same dispatcher.
    Framework,
}

impl std::str::FromStr for Frontend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(Frontend::Raw),
            "framework" => Ok(Frontend::Framework),
            other => Err(format!("unknown front end '{}' (expected raw or framework)", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind.
    pub host: String,

    /// TCP port (2324, after the RFC).
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl ListenerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2324,
            max_connections: 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Idle timeout for every socket read, in seconds.
    pub read_secs: u64,

    /// How long shutdown waits for in-flight connections, in seconds.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 5,
            shutdown_grace_secs: 10,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted request head (request line + headers), in bytes.
    pub max_head_bytes: usize,

    /// Largest accepted declared body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_head_bytes: 64 * 1024,
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A pot seeded into the registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PotConfig {
    /// Identifier used in `/coffee/{id}` paths.
    pub id: String,

    /// `coffee` or `teapot`.
    pub kind: PotKind,

    /// Capacity in cups.
    pub capacity: u32,

    /// Initial level in cups.
    pub level: u32,

    /// Varieties on offer.
    #[serde(default)]
    pub varieties: Vec<String>,
}

impl PotConfig {
    pub fn new(id: &str, kind: PotKind, capacity: u32, level: u32, varieties: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            kind,
            capacity,
            level,
            varieties: varieties.iter().map(|v| v.to_string()).collect(),
        }
    }
}

fn default_pots() -> Vec<PotConfig> {
    vec![
        PotConfig::new("pot-1", PotKind::Coffee, 12, 8, &["Espresso", "Lungo", "Americano"]),
        PotConfig::new("pot-2", PotKind::Coffee, 6, 2, &["Espresso"]),
        PotConfig::new(
            "kettle-1",
            PotKind::Teapot,
            8,
            6,
            &["Earl Grey", "Chamomile", "Darjeeling"],
        ),
        PotConfig::new("kettle-2", PotKind::Teapot, 4, 4, &["Oolong"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.bind_address(), "127.0.0.1:2324");
        assert_eq!(config.timeouts.read(), Duration::from_secs(5));
        assert_eq!(config.frontend, Frontend::Raw);
        assert_eq!(config.pots.len(), 4);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.port, 2324);
        assert_eq!(config.pots.len(), 4);
    }

    #[test]
    fn test_partial_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
            frontend = "framework"

            [listener]
            port = 8418

            [observability]
            log_format = "json"

            [[pots]]
            id = "urn"
            kind = "coffee"
            capacity = 40
            level = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.frontend, Frontend::Framework);
        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.listener.port, 8418);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.pots.len(), 1);
        assert_eq!(config.pots[0].kind, PotKind::Coffee);
        assert!(config.pots[0].varieties.is_empty());
    }

    #[test]
    fn test_frontend_from_str() {
        assert_eq!("RAW".parse::<Frontend>(), Ok(Frontend::Raw));
        assert_eq!("framework".parse::<Frontend>(), Ok(Frontend::Framework));
        assert!("fastapi".parse::<Frontend>().is_err());
    }
}
