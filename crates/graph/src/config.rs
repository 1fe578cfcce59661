// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `EmulatorConfig`: the emulator's own environment-driven configuration
//! (spec.md §6, "Environment-driven configuration. Minimal: data
//! directory, ports, log level"). The deployment model itself (resources,
//! wiring) is a separate, externally-parsed input — see [`crate::model`].

use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".lc-data";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SIGNING_KEY: &str = "local-cloud-emulator-dev-key";

/// Bind ports for the per-service HTTP endpoints (spec.md §6,
/// "Transport. Each provider exposes an HTTP endpoint on its own port").
/// Port *selection* and the HTTP listeners themselves are the (out-of-scope)
/// protocol adaptors' job; the core only hands out the configured numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePorts {
    pub object_store: u16,
    pub document_store: u16,
    pub queue: u16,
    pub topic: u16,
    pub event_bus: u16,
    pub workflow: u16,
    pub parameter_store: u16,
    pub secret_store: u16,
    pub identity_pool: u16,
    pub container_service: u16,
}

impl Default for ServicePorts {
    fn default() -> Self {
        ServicePorts {
            object_store: 4566,
            document_store: 4569,
            queue: 4576,
            topic: 4575,
            event_bus: 4587,
            workflow: 4591,
            parameter_store: 4583,
            secret_store: 4584,
            identity_pool: 4593,
            container_service: 4597,
        }
    }
}

/// The emulator's own boot configuration, env-var driven like a daemon's
/// `Config` struct: data directory, per-service bind ports, log level,
/// and the symmetric key presigned object-store URLs are signed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub data_dir: PathBuf,
    pub ports: ServicePorts,
    pub log_level: String,
    pub presign_key: String,
}

impl EmulatorConfig {
    /// Loads from environment variables with defaults, per spec.md §6.
    /// Unset/unparsable port variables fall back to their default rather
    /// than failing boot; an external validator is responsible for
    /// catching a misconfigured deployment before it reaches here.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("LC_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let log_level = std::env::var("LC_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let presign_key = std::env::var("LC_PRESIGN_KEY").unwrap_or_else(|_| DEFAULT_SIGNING_KEY.to_string());
        EmulatorConfig { data_dir: PathBuf::from(data_dir), ports: ServicePorts::default(), log_level, presign_key }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// `<data>/<service>/...` per spec.md §6 "Filesystem layout".
    pub fn service_dir(&self, service: &str) -> PathBuf {
        self.data_dir.join(service)
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            ports: ServicePorts::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            presign_key: DEFAULT_SIGNING_KEY.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
